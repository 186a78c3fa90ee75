use super::artifact::create_workspace;
use super::monitor::MemoryMonitor;
use crate::domain::audio::{merge_wav, AudioError, PcmAudio};
use crate::domain::synthesis::AudioSegment;
use std::path::Path;

/// Segments appended between memory samples in the sequential tier
const MEMORY_SAMPLE_INTERVAL: usize = 10;

#[derive(Debug, thiserror::Error)]
pub(super) enum LocalMergeError {
    #[error("temp file error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error("codec task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Run decode/encode work off the async workers so tier budgets and
/// cancellation are observed while it runs
async fn codec<T, F>(work: F) -> Result<T, LocalMergeError>
where
    F: FnOnce() -> Result<T, AudioError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await??)
}

/// Move each segment through a temp file in turn: write, read back, delete,
/// decode, append. At most one staged segment is on disk at a time. Encodes
/// once at the end.
pub(super) async fn sequential_merge(
    segments: &[AudioSegment],
    work_dir: Option<&Path>,
    monitor: &MemoryMonitor,
) -> Result<Vec<u8>, LocalMergeError> {
    let workspace = create_workspace(work_dir, "sequential")?;

    let mut accumulator: Option<PcmAudio> = None;
    for (index, segment) in segments.iter().enumerate() {
        let path = workspace.path().join(format!("segment_{:04}.wav", index));
        tokio::fs::write(&path, &segment.audio).await?;
        let bytes = tokio::fs::read(&path).await?;
        tokio::fs::remove_file(&path).await?;

        let decoded = codec(move || PcmAudio::decode_wav(&bytes)).await?;
        match accumulator.as_mut() {
            Some(acc) => acc.append(decoded),
            None => accumulator = Some(decoded),
        }

        if (index + 1) % MEMORY_SAMPLE_INTERVAL == 0 {
            monitor.sample("sequential:appending");
        }
    }

    let accumulator = accumulator.ok_or(AudioError::Empty)?;
    let merged = codec(move || accumulator.encode_wav()).await?;
    monitor.sample("sequential:encoded");
    Ok(merged)
}

/// Merge `batch_size` segments at a time, then merge the batch outputs.
///
/// Each batch's decoded buffer is released before the next batch starts.
/// The size of every merged batch is pushed onto `batch_sizes`.
pub(super) async fn batched_merge(
    segments: &[AudioSegment],
    batch_size: usize,
    monitor: &MemoryMonitor,
    batch_sizes: &mut Vec<usize>,
) -> Result<Vec<u8>, LocalMergeError> {
    let batch_size = batch_size.max(1);
    let mut batch_outputs: Vec<Vec<u8>> = Vec::with_capacity(segments.len().div_ceil(batch_size));

    for (batch_index, batch) in segments.chunks(batch_size).enumerate() {
        let parts: Vec<Vec<u8>> = batch.iter().map(|s| s.audio.clone()).collect();
        let encoded = codec(move || merge_wav(parts.iter().map(Vec::as_slice))).await?;

        batch_sizes.push(batch.len());
        tracing::debug!(
            batch_index = batch_index,
            batch_len = batch.len(),
            encoded_size = encoded.len(),
            "Batch merged"
        );
        batch_outputs.push(encoded);

        monitor.sample("batched:reclaimed");
    }

    if batch_outputs.len() == 1 {
        return Ok(batch_outputs.pop().unwrap_or_default());
    }

    let merged = codec(move || merge_wav(batch_outputs.iter().map(Vec::as_slice))).await?;
    monitor.sample("batched:encoded");
    Ok(merged)
}
