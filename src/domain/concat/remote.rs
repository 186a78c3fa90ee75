use super::artifact::{create_workspace, RemoteArtifacts};
use super::engine::ConcatSettings;
use super::{FatalCause, TierOutcome};
use crate::domain::shared::deadline::{bounded, CallError};
use crate::domain::synthesis::AudioSegment;
use crate::infrastructure::muxer::{render_manifest, AudioMuxer, MuxerError};
use crate::infrastructure::repositories::{ObjectStorage, StorageError};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum RemoteMergeError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Muxer(#[from] MuxerError),
    #[error("local file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} timed out")]
    CallTimeout(&'static str),
    #[error("muxer output was empty")]
    EmptyOutput,
}

/// Upload every segment, mux them from signed URLs, read back the result.
///
/// Uploaded objects and the local scratch directory are released before this
/// returns, on success, failure, timeout and cancellation alike.
pub(super) async fn remote_merge(
    storage: &Arc<dyn ObjectStorage>,
    muxer: &Arc<dyn AudioMuxer>,
    settings: &ConcatSettings,
    segments: &[AudioSegment],
    cancel: &CancellationToken,
) -> TierOutcome {
    let workspace = match create_workspace(settings.work_dir.as_deref(), "remote") {
        Ok(workspace) => workspace,
        Err(e) => return TierOutcome::Retryable(format!("cannot create scratch directory: {}", e)),
    };
    let mut artifacts = RemoteArtifacts::new(storage.clone(), settings.storage_call_timeout);

    let attempt = run(
        storage.as_ref(),
        muxer.as_ref(),
        settings,
        segments,
        workspace.path(),
        &mut artifacts,
    );
    let outcome = match bounded(attempt, settings.remote_timeout, cancel).await {
        Ok(audio) => TierOutcome::Succeeded(audio),
        Err(CallError::Cancelled) => TierOutcome::Fatal(FatalCause::Cancelled),
        Err(CallError::Timeout(limit)) => TierOutcome::TimedOut(limit),
        Err(CallError::Failed(RemoteMergeError::Storage(StorageError::Auth(reason)))) => {
            TierOutcome::Fatal(FatalCause::AuthRejected(reason))
        }
        Err(CallError::Failed(e)) => TierOutcome::Retryable(e.to_string()),
    };

    let uploaded = artifacts.len();
    let failed_deletes = artifacts.release().await;
    drop(workspace);
    tracing::debug!(
        uploaded = uploaded,
        failed_deletes = failed_deletes,
        "Remote merge artifacts cleaned up"
    );

    outcome
}

async fn run(
    storage: &dyn ObjectStorage,
    muxer: &dyn AudioMuxer,
    settings: &ConcatSettings,
    segments: &[AudioSegment],
    scratch: &Path,
    artifacts: &mut RemoteArtifacts,
) -> Result<Vec<u8>, RemoteMergeError> {
    let run_id = Uuid::new_v4();
    let call_limit = settings.storage_call_timeout;
    let mut urls = Vec::with_capacity(segments.len());

    for (index, segment) in segments.iter().enumerate() {
        let key = format!("concat/{}/segment_{:04}.wav", run_id, index);
        let handle = within(call_limit, "upload", storage.upload(segment.audio.clone(), &key)).await??;
        artifacts.track(handle.clone());

        let url = within(
            call_limit,
            "signed url",
            storage.signed_url(&handle, settings.signed_url_ttl),
        )
        .await??;
        urls.push(url);
    }
    tracing::info!(uploaded = urls.len(), run_id = %run_id, "Segments uploaded for remote merge");

    let manifest = scratch.join("manifest.ffconcat");
    tokio::fs::write(&manifest, render_manifest(&urls)).await?;

    let output = scratch.join("merged.wav");
    muxer.mux(&manifest, &output).await?;

    let merged = tokio::fs::read(&output).await?;
    if merged.is_empty() {
        return Err(RemoteMergeError::EmptyOutput);
    }
    Ok(merged)
}

async fn within<F, T>(limit: Duration, call: &'static str, fut: F) -> Result<T, RemoteMergeError>
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| RemoteMergeError::CallTimeout(call))
}
