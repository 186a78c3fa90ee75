use super::model::{estimated_vs_actual_ratio, speakers_used, Degradations, ResultMetadata, SynthesisResult};
use super::settings::PipelineSettings;
use crate::domain::audio::wav_duration_secs;
use crate::domain::bumper::BumperInjector;
use crate::domain::concat::{ConcatenationEngine, MemoryMonitor};
use crate::domain::duration::{parse_target_duration, DurationEstimator};
use crate::domain::script::SegmentParser;
use crate::domain::synthesis::{SegmentMetadata, SpeechSynthesizer};
use crate::domain::voice::VoiceTable;
use crate::error::{PipelineError, PipelineResult, Stage};
use crate::infrastructure::muxer::AudioMuxer;
use crate::infrastructure::repositories::{BumperRepository, ObjectStorage, SpeechProvider};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

pub struct PodcastPipeline {
    parser: SegmentParser,
    estimator: DurationEstimator,
    voices: Arc<VoiceTable>,
    synthesizer: SpeechSynthesizer,
    concat: ConcatenationEngine,
    bumpers: BumperInjector,
}

impl PodcastPipeline {
    pub fn new(
        provider: Arc<dyn SpeechProvider>,
        storage: Option<Arc<dyn ObjectStorage>>,
        muxer: Option<Arc<dyn AudioMuxer>>,
        bumper_repo: Arc<BumperRepository>,
        settings: PipelineSettings,
    ) -> Self {
        let voices = Arc::new(VoiceTable::new(|role| provider.voice_for_role(role)));
        let monitor = Arc::new(MemoryMonitor::new());

        Self {
            parser: SegmentParser::new(settings.fallback_min_chars),
            estimator: DurationEstimator,
            voices,
            synthesizer: SpeechSynthesizer::new(provider, settings.synthesis),
            concat: ConcatenationEngine::new(storage, muxer, settings.concat, monitor),
            bumpers: BumperInjector::new(bumper_repo),
        }
    }
}

#[async_trait]
pub trait PodcastPipelineApi: Send + Sync {
    /// Turn a transcript into one finished audio stream
    ///
    /// This operation:
    /// - Parses the transcript into ordered speaker turns
    /// - Scales speaking rates towards the target duration
    /// - Synthesizes every turn, dropping the ones that fail
    /// - Concatenates the segments through the tier fallback chain
    /// - Wraps the result in intro/outro bumpers when available
    ///
    /// `target_duration` is free text such as "8-10 minutes"
    async fn produce(
        &self,
        transcript: &str,
        target_duration: &str,
        cancel: &CancellationToken,
    ) -> PipelineResult<SynthesisResult>;

    /// Same as [`PodcastPipelineApi::produce`] with the target already in seconds
    async fn produce_with_target_secs(
        &self,
        transcript: &str,
        target_secs: f64,
        cancel: &CancellationToken,
    ) -> PipelineResult<SynthesisResult>;
}

#[async_trait]
impl PodcastPipelineApi for PodcastPipeline {
    async fn produce(
        &self,
        transcript: &str,
        target_duration: &str,
        cancel: &CancellationToken,
    ) -> PipelineResult<SynthesisResult> {
        let target_secs = parse_target_duration(target_duration)
            .map_err(|e| PipelineError::InvalidInput(e.to_string()))?;
        self.produce_with_target_secs(transcript, target_secs, cancel).await
    }

    async fn produce_with_target_secs(
        &self,
        transcript: &str,
        target_secs: f64,
        cancel: &CancellationToken,
    ) -> PipelineResult<SynthesisResult> {
        let span = tracing::info_span!("pipeline", run_id = %Uuid::new_v4());
        let result = self.run(transcript, target_secs, cancel).instrument(span.clone()).await;
        if let Err(e) = &result {
            span.in_scope(|| {
                tracing::error!(
                    kind = ?e.kind(),
                    stage = %e.stage(),
                    error = %e,
                    "Pipeline failed"
                );
            });
        }
        result
    }
}

impl PodcastPipeline {
    async fn run(
        &self,
        transcript: &str,
        target_secs: f64,
        cancel: &CancellationToken,
    ) -> PipelineResult<SynthesisResult> {
        let start_time = Instant::now();
        if transcript.trim().is_empty() {
            return Err(PipelineError::InvalidInput("transcript is empty".to_string()));
        }
        if !(target_secs.is_finite() && target_secs > 0.0) {
            return Err(PipelineError::InvalidInput(format!(
                "target duration must be positive, got {}",
                target_secs
            )));
        }
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled(Stage::Input));
        }

        // 1. Parse
        let turns = self.parser.parse(transcript);
        if turns.is_empty() {
            return Err(PipelineError::InvalidInput(
                "transcript contains no speakable text".to_string(),
            ));
        }
        tracing::info!(
            transcript_length = transcript.len(),
            turn_count = turns.len(),
            "Transcript parsed"
        );

        // 2. Estimate and scale
        let estimate = self.estimator.estimate(&turns, target_secs);

        // 3. Synthesize
        let synthesized = self
            .synthesizer
            .synthesize_all(&turns, &self.voices, &estimate, cancel)
            .await?;
        let segments: Vec<SegmentMetadata> =
            synthesized.segments.iter().map(|s| s.metadata()).collect();

        // 4. Concatenate
        let merged = self.concat.concatenate(&synthesized.segments, cancel).await?;
        drop(synthesized.segments);

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled(Stage::Bumpers));
        }

        // 5. Bumpers
        let bumpered = self.bumpers.apply(merged.audio).await;

        let total_duration_secs = wav_duration_secs(&bumpered.audio).unwrap_or_else(|| {
            segments
                .iter()
                .map(|s| s.actual_secs.unwrap_or(s.estimated_secs))
                .sum()
        });

        let metadata = ResultMetadata {
            total_duration_secs,
            target_duration_secs: target_secs,
            scale_factor: estimate.scale_factor,
            speakers_used: speakers_used(&segments),
            estimated_vs_actual_ratio: estimated_vs_actual_ratio(&segments),
            segments,
            degradations: Degradations {
                dropped_turns: synthesized.dropped,
                bumpers: bumpered.status,
                concat: merged.report,
            },
        };

        tracing::info!(
            latency_ms = start_time.elapsed().as_millis(),
            total_duration_secs = format!("{:.1}", metadata.total_duration_secs),
            segment_count = metadata.segments.len(),
            dropped_turns = metadata.degradations.dropped_turns.len(),
            concat_tier = ?metadata.degradations.concat.tier,
            degraded = !metadata.degradations.is_clean(),
            audio_size_bytes = bumpered.audio.len(),
            "Pipeline finished"
        );

        Ok(SynthesisResult {
            audio: bumpered.audio,
            metadata,
        })
    }
}
