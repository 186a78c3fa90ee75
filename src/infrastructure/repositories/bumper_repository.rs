use crate::domain::bumper::{BumperError, BumperKind};
use moka::future::Cache;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Reads the fixed intro/outro clips from disk.
///
/// Clips are cached after the first successful read and shared read-only by
/// every pipeline invocation. Failed reads are not cached.
pub struct BumperRepository {
    intro_path: Option<PathBuf>,
    outro_path: Option<PathBuf>,
    cache: Cache<PathBuf, Arc<Vec<u8>>>,
}

impl BumperRepository {
    pub fn new(intro_path: Option<PathBuf>, outro_path: Option<PathBuf>) -> Self {
        let cache = Cache::builder()
            .max_capacity(4)
            .time_to_idle(Duration::from_secs(60 * 60)) // 1 hour, refreshes on access
            .build();

        Self {
            intro_path,
            outro_path,
            cache,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.intro_path.is_some() || self.outro_path.is_some()
    }

    fn path(&self, kind: BumperKind) -> Option<&PathBuf> {
        match kind {
            BumperKind::Intro => self.intro_path.as_ref(),
            BumperKind::Outro => self.outro_path.as_ref(),
        }
    }

    /// Clip bytes for `kind`, or `None` when no path is configured for it
    pub async fn load(&self, kind: BumperKind) -> Result<Option<Arc<Vec<u8>>>, BumperError> {
        let Some(path) = self.path(kind) else {
            return Ok(None);
        };

        let bytes = self
            .cache
            .try_get_with(path.clone(), async {
                let bytes = tokio::fs::read(path).await?;
                tracing::info!(
                    kind = %kind,
                    path = %path.display(),
                    size_bytes = bytes.len(),
                    "Bumper loaded from disk"
                );
                Ok::<_, std::io::Error>(Arc::new(bytes))
            })
            .await
            .map_err(|e| BumperError::AssetMissing {
                kind,
                reason: format!("{}: {}", path.display(), e),
            })?;

        if bytes.is_empty() {
            return Err(BumperError::EmptyAsset { kind });
        }
        Ok(Some(bytes))
    }
}
