use super::error::BumperError;
use super::{BumperKind, BumperOutcome, BumperStatus};
use crate::domain::audio::PcmAudio;
use crate::infrastructure::repositories::BumperRepository;
use std::sync::Arc;

/// Wraps the main audio in intro and outro clips
pub struct BumperInjector {
    assets: Arc<BumperRepository>,
}

impl BumperInjector {
    pub fn new(assets: Arc<BumperRepository>) -> Self {
        Self { assets }
    }

    /// Load the configured clips and inject them around `main`.
    ///
    /// Never fails: any problem with a clip leaves `main` untouched and is
    /// reported through the returned status.
    pub async fn apply(&self, main: Vec<u8>) -> BumperOutcome {
        if !self.assets.is_configured() {
            return BumperOutcome {
                audio: main,
                status: BumperStatus::NotConfigured,
            };
        }

        let clips = async {
            let intro = self.assets.load(BumperKind::Intro).await?;
            let outro = self.assets.load(BumperKind::Outro).await?;
            Ok::<_, BumperError>((intro, outro))
        };

        let result = match clips.await {
            Ok((intro, outro)) => inject_bumpers(
                &main,
                intro.as_deref().map(Vec::as_slice),
                outro.as_deref().map(Vec::as_slice),
            ),
            Err(e) => Err(e),
        };

        match result {
            Ok(audio) => {
                tracing::info!(
                    main_size_bytes = main.len(),
                    audio_size_bytes = audio.len(),
                    "Bumpers applied"
                );
                BumperOutcome {
                    audio,
                    status: BumperStatus::Applied,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Bumpers omitted, keeping main audio");
                BumperOutcome {
                    audio: main,
                    status: BumperStatus::Omitted(e.to_string()),
                }
            }
        }
    }
}

/// Decode intro, main and outro, join them in that order in the main stream's
/// format and encode once.
pub fn inject_bumpers(
    main: &[u8],
    intro: Option<&[u8]>,
    outro: Option<&[u8]>,
) -> Result<Vec<u8>, BumperError> {
    let decode = |stream: &'static str, bytes: &[u8]| {
        PcmAudio::decode_wav(bytes).map_err(|source| BumperError::Codec { stream, source })
    };

    let main = decode("main", main)?;
    let target = main.spec();

    let mut combined = match intro {
        Some(bytes) => decode("intro", bytes)?.convert(target),
        None => PcmAudio::new(target, Vec::new()),
    };
    combined.append(main);
    if let Some(bytes) = outro {
        combined.append(decode("outro", bytes)?);
    }

    combined.encode_wav().map_err(|source| BumperError::Codec {
        stream: "combined",
        source,
    })
}
