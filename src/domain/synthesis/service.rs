use super::error::SynthesisError;
use super::model::{AudioSegment, SynthesizedTurns};
use super::text::prepare_text;
use crate::domain::audio::wav_duration_secs;
use crate::domain::duration::DurationEstimate;
use crate::domain::script::ScriptTurn;
use crate::domain::shared::deadline::{bounded, CallError};
use crate::domain::voice::{EffectiveVoice, VoiceTable};
use crate::error::{PipelineError, PipelineResult, Stage};
use crate::infrastructure::repositories::{ProviderAudio, ProviderError, SpeechProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    /// Budget for a single provider call
    pub call_timeout: Duration,
    /// Extra attempts after a transient failure
    pub max_retries: u32,
    /// First retry delay, doubled on each further attempt
    pub retry_backoff: Duration,
    /// The run aborts once consecutive dropped turns exceed this
    pub max_consecutive_failures: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
            max_consecutive_failures: 3,
        }
    }
}

/// Turns script turns into audio segments, one provider call at a time
pub struct SpeechSynthesizer {
    provider: Arc<dyn SpeechProvider>,
    settings: SynthesisSettings,
}

impl SpeechSynthesizer {
    pub fn new(provider: Arc<dyn SpeechProvider>, settings: SynthesisSettings) -> Self {
        Self { provider, settings }
    }

    /// Synthesize a single turn, retrying transient provider errors with backoff.
    ///
    /// Credential rejections are returned immediately as `ProviderAuth`.
    pub async fn synthesize(
        &self,
        turn: &ScriptTurn,
        voice: &EffectiveVoice<'_>,
        estimated_secs: f64,
        cancel: &CancellationToken,
    ) -> Result<AudioSegment, SynthesisError> {
        let text = prepare_text(&turn.text);
        if text.is_empty() {
            return Err(SynthesisError::SegmentFailure {
                ordinal: turn.ordinal,
                reason: "no speakable text after cleanup".to_string(),
            });
        }

        let mut attempt = 0u32;
        let provider_audio = loop {
            let start_time = Instant::now();
            let result = bounded(
                self.call_provider(&text, voice),
                self.settings.call_timeout,
                cancel,
            )
            .await;

            let reason = match result {
                Ok(audio) => {
                    tracing::debug!(
                        segment_index = turn.ordinal,
                        attempt = attempt,
                        latency_ms = start_time.elapsed().as_millis(),
                        audio_size_bytes = audio.audio.len(),
                        "Provider call succeeded"
                    );
                    break audio;
                }
                Err(CallError::Cancelled) => return Err(SynthesisError::Cancelled),
                Err(CallError::Failed(ProviderError::Auth(message))) => {
                    return Err(SynthesisError::ProviderAuth(message));
                }
                Err(e) => e.to_string(),
            };

            if attempt >= self.settings.max_retries {
                return Err(SynthesisError::SegmentFailure {
                    ordinal: turn.ordinal,
                    reason,
                });
            }

            let delay = self.settings.retry_backoff.saturating_mul(2u32.saturating_pow(attempt));
            tracing::warn!(
                segment_index = turn.ordinal,
                attempt = attempt,
                retry_in_ms = delay.as_millis(),
                reason = %reason,
                "Provider call failed, retrying"
            );
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SynthesisError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        };

        let actual_secs = wav_duration_secs(&provider_audio.audio).or(provider_audio.duration_hint);
        Ok(AudioSegment {
            audio: provider_audio.audio,
            estimated_secs,
            actual_secs,
            turn_ordinal: turn.ordinal,
            voice: voice.profile.clone(),
            speaking_rate: voice.speaking_rate,
        })
    }

    async fn call_provider(
        &self,
        text: &str,
        voice: &EffectiveVoice<'_>,
    ) -> Result<ProviderAudio, ProviderError> {
        let audio = self.provider.synthesize(text, voice).await?;
        if audio.audio.is_empty() {
            return Err(ProviderError::EmptyAudio);
        }
        Ok(audio)
    }

    /// Synthesize every turn in order, dropping turns that fail.
    ///
    /// Fails when consecutive drops exceed the configured threshold, when no
    /// turn survives, on rejected credentials and on cancellation.
    pub async fn synthesize_all(
        &self,
        turns: &[ScriptTurn],
        voices: &VoiceTable,
        estimate: &DurationEstimate,
        cancel: &CancellationToken,
    ) -> PipelineResult<SynthesizedTurns> {
        let mut synthesized = SynthesizedTurns {
            segments: Vec::with_capacity(turns.len()),
            dropped: Vec::new(),
        };
        let mut consecutive_failures = 0usize;

        for (index, turn) in turns.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled(Stage::Synthesis));
            }

            let voice = voices.profile(turn.role).effective(estimate.scale_factor);
            let estimated_secs = estimate.scaled_secs(index);

            match self.synthesize(turn, &voice, estimated_secs, cancel).await {
                Ok(segment) => {
                    tracing::info!(
                        segment_index = turn.ordinal,
                        role = %turn.role,
                        voice_id = %segment.voice.voice_id,
                        speaking_rate = segment.speaking_rate,
                        actual_secs = ?segment.actual_secs,
                        "Segment synthesized"
                    );
                    consecutive_failures = 0;
                    synthesized.segments.push(segment);
                }
                Err(SynthesisError::SegmentFailure { ordinal, reason }) => {
                    consecutive_failures += 1;
                    synthesized.dropped.push(ordinal);
                    tracing::warn!(
                        segment_index = ordinal,
                        role = %turn.role,
                        consecutive_failures = consecutive_failures,
                        reason = %reason,
                        "Segment dropped"
                    );
                    if consecutive_failures > self.settings.max_consecutive_failures {
                        tracing::error!(
                            consecutive_failures = consecutive_failures,
                            "Too many consecutive synthesis failures"
                        );
                        return Err(PipelineError::ConsecutiveFailures {
                            failures: consecutive_failures,
                        });
                    }
                }
                Err(SynthesisError::ProviderAuth(message)) => {
                    return Err(PipelineError::ProviderAuthFailure {
                        stage: Stage::Synthesis,
                        message,
                    });
                }
                Err(SynthesisError::Cancelled) => {
                    return Err(PipelineError::Cancelled(Stage::Synthesis));
                }
            }
        }

        if synthesized.segments.is_empty() {
            return Err(PipelineError::InsufficientSegments {
                dropped: synthesized.dropped.len(),
            });
        }

        tracing::info!(
            provider = self.provider.name(),
            synthesized = synthesized.segments.len(),
            dropped = synthesized.dropped.len(),
            "Synthesis finished"
        );
        Ok(synthesized)
    }
}
