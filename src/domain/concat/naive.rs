use super::TierOutcome;
use crate::domain::audio::AudioEncoding;
use crate::domain::synthesis::AudioSegment;

/// Append encoded bytes without decoding.
///
/// Only runs when every segment is in an encoding that stays playable after raw
/// append; anything else is refused rather than producing a corrupt file.
pub(super) fn naive_concat(segments: &[AudioSegment]) -> TierOutcome {
    let incompatible = segments
        .iter()
        .filter(|s| !AudioEncoding::sniff(&s.audio).tolerates_raw_concatenation())
        .count();
    if incompatible > 0 {
        return TierOutcome::Retryable(format!(
            "{} of {} segments are not in a raw-concatenable encoding",
            incompatible,
            segments.len()
        ));
    }

    let total: usize = segments.iter().map(|s| s.audio.len()).sum();
    let mut merged = Vec::with_capacity(total);
    for segment in segments {
        merged.extend_from_slice(&segment.audio);
    }
    TierOutcome::Succeeded(merged)
}
