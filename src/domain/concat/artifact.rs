//! Scoped backing stores for one merge attempt. Every store is released when its
//! tier exits, whichever way it exits.

use crate::infrastructure::repositories::{ObjectHandle, ObjectStorage};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Local scratch directory removed on drop
pub fn create_workspace(parent: Option<&Path>, label: &str) -> std::io::Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    let prefix = format!("podcast-mixer-{}-", label);
    builder.prefix(&prefix);
    match parent {
        Some(parent) => builder.tempdir_in(parent),
        None => builder.tempdir(),
    }
}

/// Objects uploaded during a remote merge.
///
/// Call [`RemoteArtifacts::release`] on every exit path. If the owner is dropped
/// without releasing (for example when the surrounding future is dropped), the
/// deletions are handed to the runtime instead.
pub struct RemoteArtifacts {
    storage: Arc<dyn ObjectStorage>,
    handles: Vec<ObjectHandle>,
    delete_timeout: Duration,
}

impl RemoteArtifacts {
    pub fn new(storage: Arc<dyn ObjectStorage>, delete_timeout: Duration) -> Self {
        Self {
            storage,
            handles: Vec::new(),
            delete_timeout,
        }
    }

    pub fn track(&mut self, handle: ObjectHandle) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Delete every tracked object; returns how many deletions failed
    pub async fn release(mut self) -> usize {
        let handles = std::mem::take(&mut self.handles);
        let total = handles.len();
        let failed = delete_all(self.storage.clone(), handles, self.delete_timeout).await;
        tracing::debug!(released = total - failed, failed = failed, "Remote artifacts released");
        failed
    }
}

async fn delete_all(storage: Arc<dyn ObjectStorage>, handles: Vec<ObjectHandle>, limit: Duration) -> usize {
    let mut failed = 0;
    for handle in handles {
        match tokio::time::timeout(limit, storage.delete(&handle)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                failed += 1;
                tracing::warn!(key = %handle.key, error = %e, "Failed to delete uploaded segment");
            }
            Err(_) => {
                failed += 1;
                tracing::warn!(key = %handle.key, "Timed out deleting uploaded segment");
            }
        }
    }
    failed
}

impl Drop for RemoteArtifacts {
    fn drop(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        let handles = std::mem::take(&mut self.handles);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                tracing::warn!(count = handles.len(), "Remote artifacts dropped unreleased, deleting in background");
                runtime.spawn(delete_all(self.storage.clone(), handles, self.delete_timeout));
            }
            Err(_) => {
                tracing::error!(
                    count = handles.len(),
                    keys = ?handles.iter().map(|h| h.key.as_str()).collect::<Vec<_>>(),
                    "Remote artifacts leaked: no runtime available to delete them"
                );
            }
        }
    }
}
