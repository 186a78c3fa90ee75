use super::{AudioMuxer, MuxerError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Bytes of ffmpeg stderr kept in error messages
const STDERR_TAIL: usize = 2000;

/// Concat-demuxer merge through an `ffmpeg` subprocess using stream copy
pub struct FfmpegMuxer {
    ffmpeg_path: PathBuf,
}

impl FfmpegMuxer {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    fn command(&self, manifest: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.ffmpeg_path);
        command
            .args(["-y", "-hide_banner", "-loglevel", "error"])
            .args(["-f", "concat", "-safe", "0"])
            .args(["-protocol_whitelist", "file,http,https,tcp,tls,crypto"])
            .arg("-i")
            .arg(manifest)
            .args(["-c", "copy"])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            // The child dies with the future on timeout or cancellation
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl AudioMuxer for FfmpegMuxer {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn mux(&self, manifest: &Path, output: &Path) -> Result<(), MuxerError> {
        let start_time = std::time::Instant::now();
        tracing::info!(
            ffmpeg = %self.ffmpeg_path.display(),
            manifest = %manifest.display(),
            output = %output.display(),
            "Starting ffmpeg concat"
        );

        let result = self
            .command(manifest, output)
            .output()
            .await
            .map_err(|e| MuxerError::Spawn(format!("{}: {}", self.ffmpeg_path.display(), e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let tail_start = stderr.len().saturating_sub(STDERR_TAIL);
            let tail = stderr
                .char_indices()
                .find(|(i, _)| *i >= tail_start)
                .map_or("", |(i, _)| &stderr[i..]);
            tracing::warn!(code = ?result.status.code(), stderr = %tail, "ffmpeg concat failed");
            return Err(MuxerError::ExitStatus {
                code: result.status.code(),
                stderr: tail.trim().to_string(),
            });
        }

        let size = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(MuxerError::EmptyOutput);
        }

        tracing::info!(
            latency_ms = start_time.elapsed().as_millis(),
            output_size_bytes = size,
            "ffmpeg concat completed"
        );
        Ok(())
    }
}
