pub mod names;

pub use names::role_for_name;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed category of speaker, independent of the voice attached to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Expert,
    Questioner,
    Correspondent,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Host, Role::Expert, Role::Questioner, Role::Correspondent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Host => "host",
            Role::Expert => "expert",
            Role::Questioner => "questioner",
            Role::Correspondent => "correspondent",
        }
    }

    /// Parse a role keyword as written in transcript labels (case-insensitive)
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "host" => Some(Role::Host),
            "expert" => Some(Role::Expert),
            "questioner" => Some(Role::Questioner),
            "correspondent" => Some(Role::Correspondent),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            Role::Host => 0,
            Role::Expert => 1,
            Role::Questioner => 2,
            Role::Correspondent => 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synthesis voice for one role. Never mutated after the table is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub role: Role,
    pub voice_id: String,
    pub display_name: String,
    pub stability: f32,
    pub expressiveness: f32,
    pub base_rate: f32,
}

impl VoiceProfile {
    /// Speaking rate for one invocation after duration scaling
    pub fn effective(&self, scale_factor: f64) -> EffectiveVoice<'_> {
        EffectiveVoice {
            profile: self,
            speaking_rate: (f64::from(self.base_rate) * scale_factor) as f32,
        }
    }
}

/// A profile paired with the per-call speaking rate derived from it
#[derive(Debug, Clone, Copy)]
pub struct EffectiveVoice<'a> {
    pub profile: &'a VoiceProfile,
    pub speaking_rate: f32,
}

/// (display name, stability, expressiveness, base rate) per role, in `Role::ALL` order
const PROFILE_DEFAULTS: [(&str, f32, f32, f32); 4] = [
    ("Alex", 0.55, 0.35, 1.0),
    ("Morgan", 0.70, 0.20, 0.95),
    ("Sam", 0.45, 0.50, 1.05),
    ("Jordan", 0.60, 0.30, 1.0),
];

/// Read-only role to profile table shared by every pipeline invocation
#[derive(Debug, Clone)]
pub struct VoiceTable {
    profiles: [VoiceProfile; 4],
}

impl VoiceTable {
    /// Build the table, asking the provider which of its voices serves each role
    pub fn new(voice_for_role: impl Fn(Role) -> String) -> Self {
        let profiles = Role::ALL.map(|role| {
            let (display_name, stability, expressiveness, base_rate) = PROFILE_DEFAULTS[role.index()];
            VoiceProfile {
                role,
                voice_id: voice_for_role(role),
                display_name: display_name.to_string(),
                stability,
                expressiveness,
                base_rate,
            }
        });
        Self { profiles }
    }

    pub fn profile(&self, role: Role) -> &VoiceProfile {
        &self.profiles[role.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoiceProfile> {
        self.profiles.iter()
    }
}
