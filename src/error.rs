use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::concat::TierKind;

/// Pipeline stage that was last attempted when a terminal error surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "tier", rename_all = "snake_case")]
pub enum Stage {
    Input,
    Synthesis,
    Concatenation(Option<TierKind>),
    Bumpers,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Input => write!(f, "input"),
            Stage::Synthesis => write!(f, "synthesis"),
            Stage::Concatenation(Some(tier)) => write!(f, "concatenation/{}", tier),
            Stage::Concatenation(None) => write!(f, "concatenation"),
            Stage::Bumpers => write!(f, "bumpers"),
        }
    }
}

/// Kind of terminal failure, one per unrecoverable branch of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineErrorKind {
    InvalidInput,
    ProviderAuthFailure,
    InsufficientSegments,
    ConsecutiveFailures,
    ConcatenationFatal,
    Cancelled,
}

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider rejected credentials during {stage}: {message}")]
    ProviderAuthFailure { stage: Stage, message: String },

    #[error("No segment could be synthesized ({dropped} dropped)")]
    InsufficientSegments { dropped: usize },

    #[error("Aborted after {failures} consecutive synthesis failures")]
    ConsecutiveFailures { failures: usize },

    #[error("All concatenation tiers failed, last attempted {stage}: {reason}")]
    ConcatenationFatal { stage: Stage, reason: String },

    #[error("Cancelled during {0}")]
    Cancelled(Stage),
}

/// Error summary suitable for logs and caller-side reporting
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: PipelineErrorKind,
    pub stage: Stage,
    pub message: String,
}

impl PipelineError {
    pub fn kind(&self) -> PipelineErrorKind {
        match self {
            Self::InvalidInput(_) => PipelineErrorKind::InvalidInput,
            Self::ProviderAuthFailure { .. } => PipelineErrorKind::ProviderAuthFailure,
            Self::InsufficientSegments { .. } => PipelineErrorKind::InsufficientSegments,
            Self::ConsecutiveFailures { .. } => PipelineErrorKind::ConsecutiveFailures,
            Self::ConcatenationFatal { .. } => PipelineErrorKind::ConcatenationFatal,
            Self::Cancelled(_) => PipelineErrorKind::Cancelled,
        }
    }

    /// Last stage the pipeline reached before failing
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidInput(_) => Stage::Input,
            Self::ProviderAuthFailure { stage, .. } => *stage,
            Self::InsufficientSegments { .. } | Self::ConsecutiveFailures { .. } => Stage::Synthesis,
            Self::ConcatenationFatal { stage, .. } => *stage,
            Self::Cancelled(stage) => *stage,
        }
    }

    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            stage: self.stage(),
            message: self.to_string(),
        }
    }
}

/// Custom result type for the pipeline
pub type PipelineResult<T> = Result<T, PipelineError>;
