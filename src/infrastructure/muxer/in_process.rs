use super::{parse_manifest, AudioMuxer, MuxerError};
use crate::domain::audio::PcmAudio;
use async_trait::async_trait;
use std::path::Path;

/// Pure in-process muxer for hosts that cannot spawn subprocesses.
///
/// Fetches each manifest entry (HTTP(S) URL or local path), decodes it as WAV
/// and writes one re-encoded WAV file.
pub struct InProcessMuxer {
    http: reqwest::Client,
}

impl InProcessMuxer {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn fetch(&self, source: &str) -> Result<Vec<u8>, MuxerError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            let fetch_error = |reason: String| MuxerError::Fetch {
                source_url: source.split('?').next().unwrap_or(source).to_string(),
                reason,
            };
            let response = self
                .http
                .get(source)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| fetch_error(e.to_string()))?;
            let bytes = response.bytes().await.map_err(|e| fetch_error(e.to_string()))?;
            Ok(bytes.to_vec())
        } else {
            let path = source.strip_prefix("file:").unwrap_or(source);
            Ok(tokio::fs::read(path).await?)
        }
    }
}

impl Default for InProcessMuxer {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl AudioMuxer for InProcessMuxer {
    fn name(&self) -> &'static str {
        "in_process"
    }

    async fn mux(&self, manifest: &Path, output: &Path) -> Result<(), MuxerError> {
        let manifest = tokio::fs::read_to_string(manifest).await?;
        let sources = parse_manifest(&manifest)?;

        let mut accumulator: Option<PcmAudio> = None;
        for source in &sources {
            let bytes = self.fetch(source).await?;
            let decoded = PcmAudio::decode_wav(&bytes)
                .map_err(|e| MuxerError::Manifest(format!("undecodable entry: {}", e)))?;
            match accumulator.as_mut() {
                Some(acc) => acc.append(decoded),
                None => accumulator = Some(decoded),
            }
        }

        let merged = accumulator
            .ok_or(MuxerError::EmptyOutput)?
            .encode_wav()
            .map_err(|e| MuxerError::Manifest(format!("encode failed: {}", e)))?;
        tokio::fs::write(output, &merged).await?;

        tracing::info!(entries = sources.len(), output_size_bytes = merged.len(), "In-process mux completed");
        Ok(())
    }
}
