pub mod fakes;

use podcast_mixer::domain::concat::ConcatSettings;
use podcast_mixer::domain::pipeline::{PipelineSettings, PodcastPipeline};
use podcast_mixer::domain::synthesis::SynthesisSettings;
use podcast_mixer::infrastructure::muxer::AudioMuxer;
use podcast_mixer::infrastructure::repositories::{BumperRepository, ObjectStorage, SpeechProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const HOST_EXPERT_TRANSCRIPT: &str = "HOST: Hello and welcome.\nEXPERT: Thanks for having me.\n";

/// Pipeline wiring for one test, with a private scratch directory
pub struct TestContext {
    pub work_dir: TempDir,
    provider: Arc<dyn SpeechProvider>,
    storage: Option<Arc<dyn ObjectStorage>>,
    muxer: Option<Arc<dyn AudioMuxer>>,
    intro_path: Option<PathBuf>,
    outro_path: Option<PathBuf>,
    pub settings: PipelineSettings,
}

impl TestContext {
    pub fn new(provider: Arc<dyn SpeechProvider>) -> Self {
        let work_dir = tempfile::tempdir().unwrap();
        let settings = PipelineSettings {
            synthesis: SynthesisSettings {
                call_timeout: Duration::from_secs(5),
                max_retries: 1,
                retry_backoff: Duration::from_millis(1),
                max_consecutive_failures: 3,
            },
            concat: ConcatSettings {
                remote_timeout: Duration::from_secs(10),
                sequential_timeout: Duration::from_secs(10),
                batched_timeout: Duration::from_secs(10),
                naive_timeout: Duration::from_secs(5),
                storage_call_timeout: Duration::from_secs(5),
                signed_url_ttl: Duration::from_secs(60),
                remote_min_segments: 2,
                batched_threshold: 60,
                batch_size: 10,
                work_dir: Some(work_dir.path().to_path_buf()),
                ..ConcatSettings::default()
            },
            fallback_min_chars: 20,
        };

        Self {
            work_dir,
            provider,
            storage: None,
            muxer: None,
            intro_path: None,
            outro_path: None,
            settings,
        }
    }

    pub fn with_remote(mut self, storage: Arc<dyn ObjectStorage>, muxer: Arc<dyn AudioMuxer>) -> Self {
        self.storage = Some(storage);
        self.muxer = Some(muxer);
        self
    }

    pub fn with_bumpers(mut self, intro: Option<PathBuf>, outro: Option<PathBuf>) -> Self {
        self.intro_path = intro;
        self.outro_path = outro;
        self
    }

    pub fn pipeline(&self) -> PodcastPipeline {
        PodcastPipeline::new(
            self.provider.clone(),
            self.storage.clone(),
            self.muxer.clone(),
            Arc::new(BumperRepository::new(
                self.intro_path.clone(),
                self.outro_path.clone(),
            )),
            self.settings.clone(),
        )
    }

    /// Entries left behind in the scratch directory
    pub fn leftover_files(&self) -> usize {
        count_entries(self.work_dir.path())
    }
}

fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

/// Labeled transcript with `count` alternating HOST/EXPERT turns
pub fn alternating_transcript(count: usize) -> String {
    (0..count)
        .map(|i| {
            let label = if i % 2 == 0 { "HOST" } else { "EXPERT" };
            format!("{}: This is spoken turn number {} of the show.\n", label, i)
        })
        .collect()
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} to be within {} of {}",
        actual,
        tolerance,
        expected
    );
}
