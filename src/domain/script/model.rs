use crate::domain::voice::Role;
use serde::{Deserialize, Serialize};

/// One speaker's contiguous utterance, in transcript order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTurn {
    pub role: Role,
    pub text: String,
    pub ordinal: usize,
}

impl ScriptTurn {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
