pub mod error;
pub mod model;
pub mod service;
pub mod text;

pub use error::SynthesisError;
pub use model::{AudioSegment, SegmentMetadata, SynthesizedTurns};
pub use service::{SpeechSynthesizer, SynthesisSettings};
