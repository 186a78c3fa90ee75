pub mod artifact;
pub mod engine;
pub mod error;
mod local;
pub mod monitor;
mod naive;
mod remote;

pub use engine::{ConcatOutput, ConcatSettings, ConcatenationEngine};
pub use error::ConcatError;
pub use monitor::MemoryMonitor;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One candidate strategy in the ordered fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    /// Upload, mux from signed URLs with stream copy, download
    Remote,
    /// Stage to temp files, decode and append one at a time
    Sequential,
    /// Merge fixed-size batches, then merge the batch outputs
    Batched,
    /// Raw byte append for encodings that tolerate it
    Naive,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TierKind::Remote => "remote",
            TierKind::Sequential => "sequential",
            TierKind::Batched => "batched",
            TierKind::Naive => "naive",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown concatenation tier '{0}'")]
pub struct UnknownTier(String);

impl FromStr for TierKind {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" => Ok(TierKind::Remote),
            "sequential" => Ok(TierKind::Sequential),
            "batched" => Ok(TierKind::Batched),
            "naive" => Ok(TierKind::Naive),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}

/// Why a tier stopped the whole chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatalCause {
    Cancelled,
    AuthRejected(String),
}

/// Result of running one tier
#[derive(Debug)]
pub enum TierOutcome {
    Succeeded(Vec<u8>),
    /// The next tier may still succeed
    Retryable(String),
    /// The tier ran past its time budget
    TimedOut(Duration),
    Fatal(FatalCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Failed,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierFailure {
    pub tier: TierKind,
    pub kind: FailureKind,
    pub reason: String,
}

/// How the merged stream was produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcatReport {
    /// Tier that produced the output; `None` when no merge was needed
    pub tier: Option<TierKind>,
    pub failed_tiers: Vec<TierFailure>,
    /// Segment count of each batch merged by the batched tier
    pub batch_sizes: Vec<usize>,
}
