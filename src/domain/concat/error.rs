use super::{TierFailure, TierKind};
use crate::error::{PipelineError, Stage};

#[derive(Debug, thiserror::Error)]
pub enum ConcatError {
    #[error("no segments to concatenate")]
    NoSegments,
    #[error("all tiers failed: {}", summarize(.failures))]
    Exhausted { failures: Vec<TierFailure> },
    #[error("credentials rejected during {tier} tier: {reason}")]
    AuthRejected { tier: TierKind, reason: String },
    #[error("{tier} tier failed fatally: {reason}")]
    Fatal { tier: TierKind, reason: String },
    #[error("cancelled during {tier} tier")]
    Cancelled { tier: TierKind },
}

fn summarize(failures: &[TierFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.tier, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ConcatError> for PipelineError {
    fn from(err: ConcatError) -> Self {
        match err {
            ConcatError::NoSegments => PipelineError::InsufficientSegments { dropped: 0 },
            ConcatError::Exhausted { ref failures } => PipelineError::ConcatenationFatal {
                stage: Stage::Concatenation(failures.last().map(|f| f.tier)),
                reason: err.to_string(),
            },
            ConcatError::AuthRejected { tier, reason } => PipelineError::ProviderAuthFailure {
                stage: Stage::Concatenation(Some(tier)),
                message: reason,
            },
            ConcatError::Fatal { tier, reason } => PipelineError::ConcatenationFatal {
                stage: Stage::Concatenation(Some(tier)),
                reason,
            },
            ConcatError::Cancelled { tier } => PipelineError::Cancelled(Stage::Concatenation(Some(tier))),
        }
    }
}
