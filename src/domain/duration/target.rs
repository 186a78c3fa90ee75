use regex::Regex;
use std::sync::LazyLock;

static TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*(?:(?:-|–|to)\s*(\d+(?:\.\d+)?))?\s*([a-z]*)\.?\s*$")
        .expect("target duration pattern")
});

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TargetDurationError {
    #[error("unrecognised target duration: {0:?}")]
    Unparseable(String),
    #[error("unknown duration unit: {0:?}")]
    UnknownUnit(String),
    #[error("target duration must be positive")]
    NotPositive,
}

/// Parse a requested runtime such as `"8-10 minutes"` into seconds.
///
/// Ranges resolve to their midpoint and a bare number is read as minutes.
pub fn parse_target_duration(input: &str) -> Result<f64, TargetDurationError> {
    let caps = TARGET
        .captures(input)
        .ok_or_else(|| TargetDurationError::Unparseable(input.to_string()))?;

    let low: f64 = caps[1]
        .parse()
        .map_err(|_| TargetDurationError::Unparseable(input.to_string()))?;
    let value = match caps.get(2) {
        Some(high) => {
            let high: f64 = high
                .as_str()
                .parse()
                .map_err(|_| TargetDurationError::Unparseable(input.to_string()))?;
            (low + high) / 2.0
        }
        None => low,
    };

    let unit = caps.get(3).map_or("", |m| m.as_str()).to_ascii_lowercase();
    let multiplier = match unit.as_str() {
        "" | "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600.0,
        other => return Err(TargetDurationError::UnknownUnit(other.to_string())),
    };

    let seconds = value * multiplier;
    if seconds <= 0.0 {
        return Err(TargetDurationError::NotPositive);
    }
    Ok(seconds)
}
