use super::BumperKind;
use crate::domain::audio::AudioError;

#[derive(Debug, thiserror::Error)]
pub enum BumperError {
    #[error("{kind} bumper unavailable: {reason}")]
    AssetMissing { kind: BumperKind, reason: String },
    #[error("{kind} bumper is empty")]
    EmptyAsset { kind: BumperKind },
    #[error("cannot decode {stream} audio: {source}")]
    Codec {
        stream: &'static str,
        #[source]
        source: AudioError,
    },
}
