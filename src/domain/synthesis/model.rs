use crate::domain::voice::{Role, VoiceProfile};
use serde::{Deserialize, Serialize};

/// Synthesized audio for one script turn
#[derive(Debug, Clone)]
pub struct AudioSegment {
    /// WAV-encoded audio as returned by the provider
    pub audio: Vec<u8>,
    pub estimated_secs: f64,
    pub actual_secs: Option<f64>,
    /// Ordinal of the turn this segment was synthesized from
    pub turn_ordinal: usize,
    pub voice: VoiceProfile,
    pub speaking_rate: f32,
}

impl AudioSegment {
    /// Reporting view without the audio payload
    pub fn metadata(&self) -> SegmentMetadata {
        SegmentMetadata {
            turn_ordinal: self.turn_ordinal,
            role: self.voice.role,
            voice_id: self.voice.voice_id.clone(),
            speaking_rate: self.speaking_rate,
            estimated_secs: self.estimated_secs,
            actual_secs: self.actual_secs,
            size_bytes: self.audio.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetadata {
    pub turn_ordinal: usize,
    pub role: Role,
    pub voice_id: String,
    pub speaking_rate: f32,
    pub estimated_secs: f64,
    pub actual_secs: Option<f64>,
    pub size_bytes: usize,
}

/// Segments that survived synthesis, in turn order
#[derive(Debug, Clone, Default)]
pub struct SynthesizedTurns {
    pub segments: Vec<AudioSegment>,
    /// Ordinals of turns dropped after failing to synthesize
    pub dropped: Vec<usize>,
}
