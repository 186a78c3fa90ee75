pub mod error;
pub mod service;

pub use error::BumperError;
pub use service::{inject_bumpers, BumperInjector};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumperKind {
    Intro,
    Outro,
}

impl fmt::Display for BumperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumperKind::Intro => write!(f, "intro"),
            BumperKind::Outro => write!(f, "outro"),
        }
    }
}

/// What happened to the intro/outro clips for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum BumperStatus {
    Applied,
    /// No bumper paths are configured
    NotConfigured,
    /// A configured bumper could not be used; the main audio was kept as is
    Omitted(String),
}

#[derive(Debug, Clone)]
pub struct BumperOutcome {
    pub audio: Vec<u8>,
    pub status: BumperStatus,
}
