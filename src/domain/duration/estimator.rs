use crate::domain::script::ScriptTurn;
use crate::domain::voice::Role;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Pause added per sentence-ending or comma punctuation run
pub const PAUSE_SECONDS: f64 = 0.3;

/// Bounds on how far speaking rates may be stretched to hit a target runtime
pub const MIN_SCALE_FACTOR: f64 = 0.7;
pub const MAX_SCALE_FACTOR: f64 = 1.3;

static PAUSE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?,]+").expect("pause punctuation pattern"));

/// Typical speaking pace per role. Curious voices run faster than explanatory ones.
pub fn words_per_minute(role: Role) -> f64 {
    match role {
        Role::Host => 150.0,
        Role::Expert => 140.0,
        Role::Questioner => 165.0,
        Role::Correspondent => 155.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationEstimate {
    /// Unscaled spoken duration per turn, in turn order
    pub per_turn: Vec<f64>,
    pub total_secs: f64,
    pub target_secs: f64,
    /// Multiplier applied to every profile's base speaking rate for this call
    pub scale_factor: f64,
}

impl DurationEstimate {
    /// Expected duration of one turn once the scale factor is applied
    pub fn scaled_secs(&self, index: usize) -> f64 {
        self.per_turn.get(index).copied().unwrap_or(0.0) / self.scale_factor
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DurationEstimator;

impl DurationEstimator {
    pub fn estimate(&self, turns: &[ScriptTurn], target_secs: f64) -> DurationEstimate {
        let per_turn: Vec<f64> = turns.iter().map(estimate_turn_secs).collect();
        let total_secs: f64 = per_turn.iter().sum();
        let scale_factor = scale_factor(total_secs, target_secs);

        tracing::info!(
            turn_count = turns.len(),
            estimated_secs = format!("{:.1}", total_secs),
            target_secs = format!("{:.1}", target_secs),
            scale_factor = format!("{:.3}", scale_factor),
            "Duration estimated"
        );

        DurationEstimate {
            per_turn,
            total_secs,
            target_secs,
            scale_factor,
        }
    }
}

pub fn estimate_turn_secs(turn: &ScriptTurn) -> f64 {
    let words = turn.word_count() as f64;
    let pauses = PAUSE_PUNCTUATION.find_iter(&turn.text).count() as f64;
    words / words_per_minute(turn.role) * 60.0 + pauses * PAUSE_SECONDS
}

/// `estimated / target`, clamped to `[MIN_SCALE_FACTOR, MAX_SCALE_FACTOR]`
pub fn scale_factor(estimated_secs: f64, target_secs: f64) -> f64 {
    if !(target_secs.is_finite() && target_secs > 0.0) || !estimated_secs.is_finite() {
        return 1.0;
    }
    (estimated_secs / target_secs).clamp(MIN_SCALE_FACTOR, MAX_SCALE_FACTOR)
}
