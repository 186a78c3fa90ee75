use async_trait::async_trait;
use podcast_mixer::domain::audio::{AudioSpec, PcmAudio};
use podcast_mixer::domain::duration::estimator::estimate_turn_secs;
use podcast_mixer::domain::script::ScriptTurn;
use podcast_mixer::domain::voice::{EffectiveVoice, Role};
use podcast_mixer::infrastructure::muxer::{AudioMuxer, MuxerError};
use podcast_mixer::infrastructure::repositories::{
    ObjectHandle, ObjectStorage, ProviderAudio, ProviderError, SpeechProvider, StorageError,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

pub const FAKE_SPEC: AudioSpec = AudioSpec {
    sample_rate: 8000,
    channels: 1,
};

/// WAV tone of the given length in `spec`
pub fn tone_wav(spec: AudioSpec, secs: f64) -> Vec<u8> {
    let frames = (secs * f64::from(spec.sample_rate)).round() as usize;
    let samples = (0..frames * usize::from(spec.channels))
        .map(|i| ((i % 40) as i16 - 20) * 50)
        .collect();
    PcmAudio::new(spec, samples).encode_wav().unwrap()
}

/// Speech provider whose output length follows the duration model
pub struct FakeSpeechProvider {
    /// Texts containing this marker fail with a transient error
    fail_marker: Option<String>,
    reject_credentials: bool,
    calls: AtomicUsize,
}

impl FakeSpeechProvider {
    pub fn new() -> Self {
        Self {
            fail_marker: None,
            reject_credentials: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::new()
        }
    }

    pub fn rejecting_credentials() -> Self {
        Self {
            reject_credentials: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Length the fake renders for `text` at `speaking_rate`
    pub fn rendered_secs(role: Role, text: &str, speaking_rate: f32) -> f64 {
        let turn = ScriptTurn {
            role,
            text: text.to_string(),
            ordinal: 0,
        };
        estimate_turn_secs(&turn) / f64::from(speaking_rate)
    }
}

#[async_trait]
impl SpeechProvider for FakeSpeechProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn voice_for_role(&self, role: Role) -> String {
        format!("fake-{}", role)
    }

    async fn synthesize(
        &self,
        text: &str,
        voice: &EffectiveVoice<'_>,
    ) -> Result<ProviderAudio, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_credentials {
            return Err(ProviderError::Auth("invalid api key".to_string()));
        }
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(ProviderError::Transient("503 service unavailable".to_string()));
            }
        }

        let secs = Self::rendered_secs(voice.profile.role, text, voice.speaking_rate);
        Ok(ProviderAudio {
            audio: tone_wav(FAKE_SPEC, secs),
            duration_hint: Some(secs),
        })
    }
}

/// Object storage backed by a temp directory; signed URLs are file paths
pub struct DirectoryStorage {
    root: TempDir,
    objects: Mutex<HashMap<String, PathBuf>>,
    uploads: AtomicUsize,
    reject_credentials: bool,
}

impl DirectoryStorage {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
            objects: Mutex::new(HashMap::new()),
            uploads: AtomicUsize::new(0),
            reject_credentials: false,
        }
    }

    pub fn rejecting_credentials() -> Self {
        Self {
            reject_credentials: true,
            ..Self::new()
        }
    }

    /// Objects uploaded and not yet deleted
    pub fn live_objects(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for DirectoryStorage {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<ObjectHandle, StorageError> {
        if self.reject_credentials {
            return Err(StorageError::Auth("AccessDenied".to_string()));
        }
        let path = self.root.path().join(key.replace('/', "_"));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;
        self.objects.lock().unwrap().insert(key.to_string(), path);
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(ObjectHandle {
            key: key.to_string(),
        })
    }

    async fn signed_url(&self, handle: &ObjectHandle, _ttl: Duration) -> Result<String, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .get(&handle.key)
            .map(|path| path.display().to_string())
            .ok_or_else(|| StorageError::Request(format!("no such object {}", handle.key)))
    }

    async fn delete(&self, handle: &ObjectHandle) -> Result<(), StorageError> {
        let path = self.objects.lock().unwrap().remove(&handle.key);
        if let Some(path) = path {
            let _ = tokio::fs::remove_file(path).await;
        }
        Ok(())
    }
}

/// Muxer that behaves like a subprocess exiting with status 1
pub struct FailingMuxer;

#[async_trait]
impl AudioMuxer for FailingMuxer {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn mux(&self, _manifest: &Path, _output: &Path) -> Result<(), MuxerError> {
        Err(MuxerError::ExitStatus {
            code: Some(1),
            stderr: "Invalid data found when processing input".to_string(),
        })
    }
}

/// Muxer that never finishes
pub struct StallingMuxer;

#[async_trait]
impl AudioMuxer for StallingMuxer {
    fn name(&self) -> &'static str {
        "stalling"
    }

    async fn mux(&self, _manifest: &Path, _output: &Path) -> Result<(), MuxerError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}
