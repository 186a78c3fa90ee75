use crate::domain::bumper::BumperStatus;
use crate::domain::concat::ConcatReport;
use crate::domain::synthesis::SegmentMetadata;
use crate::domain::voice::Role;
use serde::{Deserialize, Serialize};

/// Everything that went less than perfectly but was absorbed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Degradations {
    /// Ordinals of turns dropped after failing to synthesize
    pub dropped_turns: Vec<usize>,
    pub bumpers: BumperStatus,
    pub concat: ConcatReport,
}

impl Degradations {
    pub fn is_clean(&self) -> bool {
        self.dropped_turns.is_empty()
            && !matches!(self.bumpers, BumperStatus::Omitted(_))
            && self.concat.failed_tiers.is_empty()
    }
}

/// Finished audio plus its reporting metadata
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub audio: Vec<u8>,
    pub metadata: ResultMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub total_duration_secs: f64,
    pub target_duration_secs: f64,
    pub scale_factor: f64,
    /// Surviving segments in playback order
    pub segments: Vec<SegmentMetadata>,
    /// Distinct roles in order of first appearance
    pub speakers_used: Vec<Role>,
    /// Sum of estimated segment durations over the sum of actual ones
    pub estimated_vs_actual_ratio: f64,
    pub degradations: Degradations,
}

/// Distinct roles of `segments`, first appearance first
pub fn speakers_used(segments: &[SegmentMetadata]) -> Vec<Role> {
    let mut roles: Vec<Role> = Vec::new();
    for segment in segments {
        if !roles.contains(&segment.role) {
            roles.push(segment.role);
        }
    }
    roles
}

/// `estimated / actual` over all segments. Segments without a measured
/// duration count their estimate on both sides.
pub fn estimated_vs_actual_ratio(segments: &[SegmentMetadata]) -> f64 {
    let estimated: f64 = segments.iter().map(|s| s.estimated_secs).sum();
    let actual: f64 = segments
        .iter()
        .map(|s| s.actual_secs.unwrap_or(s.estimated_secs))
        .sum();
    if actual > 0.0 && estimated.is_finite() {
        estimated / actual
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metadata(role: Role, estimated_secs: f64, actual_secs: Option<f64>) -> SegmentMetadata {
        SegmentMetadata {
            turn_ordinal: 0,
            role,
            voice_id: "v".to_string(),
            speaking_rate: 1.0,
            estimated_secs,
            actual_secs,
            size_bytes: 0,
        }
    }

    #[test]
    fn test_speakers_in_first_appearance_order() {
        let segments = [
            metadata(Role::Expert, 1.0, None),
            metadata(Role::Host, 1.0, None),
            metadata(Role::Expert, 1.0, None),
            metadata(Role::Questioner, 1.0, None),
        ];
        assert_eq!(
            speakers_used(&segments),
            vec![Role::Expert, Role::Host, Role::Questioner]
        );
    }

    #[test]
    fn test_ratio_uses_estimates_for_unmeasured_segments() {
        let segments = [
            metadata(Role::Host, 4.0, Some(2.0)),
            metadata(Role::Expert, 2.0, None),
        ];
        assert!((estimated_vs_actual_ratio(&segments) - 1.5).abs() < 1e-9);
        assert_eq!(estimated_vs_actual_ratio(&[]), 1.0);
    }

    #[test]
    fn test_missing_bumper_config_is_not_a_degradation() {
        let mut degradations = Degradations {
            dropped_turns: Vec::new(),
            bumpers: BumperStatus::NotConfigured,
            concat: ConcatReport::default(),
        };
        assert!(degradations.is_clean());

        degradations.bumpers = BumperStatus::Omitted("intro missing".to_string());
        assert!(!degradations.is_clean());
    }
}
