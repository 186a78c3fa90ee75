pub mod ffmpeg;
pub mod in_process;

pub use ffmpeg::FfmpegMuxer;
pub use in_process::InProcessMuxer;

use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum MuxerError {
    #[error("failed to start muxer: {0}")]
    Spawn(String),
    #[error("muxer exited with status {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },
    #[error("muxer produced no output")]
    EmptyOutput,
    #[error("manifest error: {0}")]
    Manifest(String),
    #[error("failed to fetch {source_url}: {reason}")]
    Fetch { source_url: String, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Joins the streams listed in a concatenation manifest into one output file
/// without re-encoding where the implementation allows it.
#[async_trait]
pub trait AudioMuxer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Success means the output file exists and is non-empty
    async fn mux(&self, manifest: &Path, output: &Path) -> Result<(), MuxerError>;
}

const MANIFEST_HEADER: &str = "ffconcat version 1.0";

/// Render a concat-demuxer manifest listing `sources` in order
pub fn render_manifest<S: AsRef<str>>(sources: &[S]) -> String {
    let mut manifest = String::from(MANIFEST_HEADER);
    manifest.push('\n');
    for source in sources {
        let escaped = source.as_ref().replace('\'', r"'\''");
        manifest.push_str(&format!("file '{}'\n", escaped));
    }
    manifest
}

/// Read back the sources listed in a manifest produced by [`render_manifest`]
pub fn parse_manifest(manifest: &str) -> Result<Vec<String>, MuxerError> {
    let mut sources = Vec::new();
    for line in manifest.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line == MANIFEST_HEADER {
            continue;
        }
        let quoted = line
            .strip_prefix("file ")
            .ok_or_else(|| MuxerError::Manifest(format!("unexpected line: {}", line)))?
            .trim();
        let inner = quoted
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .ok_or_else(|| MuxerError::Manifest(format!("unquoted entry: {}", quoted)))?;
        sources.push(inner.replace(r"'\''", "'"));
    }
    Ok(sources)
}
