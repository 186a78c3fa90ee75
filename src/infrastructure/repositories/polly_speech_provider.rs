use super::speech_provider::{
    is_aws_auth_code, split_into_batches, ProviderAudio, ProviderError, SpeechProvider,
};
use crate::domain::audio::{AudioSpec, PcmAudio};
use crate::domain::voice::{EffectiveVoice, Role};
use async_trait::async_trait;
use aws_sdk_polly::{
    error::ProvideErrorMetadata,
    types::{Engine, OutputFormat, TextType, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly accepts 3000 billable characters per request; SSML tags are extra
const MAX_BATCH_SIZE: usize = 2800;

/// Polly's neural engine emits 16 kHz mono signed 16-bit PCM
const PCM_SPEC: AudioSpec = AudioSpec {
    sample_rate: 16000,
    channels: 1,
};

/// AWS Polly implementation of the speech provider
pub struct PollySpeechProvider {
    polly_client: Arc<PollyClient>,
}

impl PollySpeechProvider {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    /// Wrap text in SSML carrying the per-call speaking rate
    fn to_ssml(text: &str, speaking_rate: f32) -> String {
        let percent = (speaking_rate * 100.0).round().clamp(20.0, 200.0) as i32;
        let escaped = text
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;");
        format!("<speak><prosody rate=\"{}%\">{}</prosody></speak>", percent, escaped)
    }

    /// Call AWS Polly to synthesize a single text batch into raw PCM
    async fn call_polly(&self, text: &str, voice: &EffectiveVoice<'_>) -> Result<Vec<u8>, ProviderError> {
        let voice_id = VoiceId::from(voice.profile.voice_id.as_str());
        let engine = Engine::Neural;

        tracing::info!(
            role = %voice.profile.role,
            voice_id = ?voice_id,
            speaking_rate = voice.speaking_rate,
            engine = ?engine,
            output_format = "Pcm",
            text_length = text.len(),
            text_preview = %text.chars().take(200).collect::<String>(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(Self::to_ssml(text, voice.speaking_rate))
            .text_type(TextType::Ssml)
            .voice_id(voice_id)
            .output_format(OutputFormat::Pcm)
            .sample_rate(PCM_SPEC.sample_rate.to_string())
            .engine(engine)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_code = ?e.code(),
                    role = %voice.profile.role,
                    text_length = text.len(),
                    "AWS Polly synthesize_speech failed"
                );
                if is_aws_auth_code(e.code()) {
                    ProviderError::Auth(format!("AWS Polly: {}", e))
                } else {
                    ProviderError::Transient(format!("AWS Polly error: {:?}", e))
                }
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            ProviderError::Transient(format!("Failed to read audio stream: {}", e))
        })?;

        Ok(audio_stream.into_bytes().to_vec())
    }
}

#[async_trait]
impl SpeechProvider for PollySpeechProvider {
    fn name(&self) -> &'static str {
        "polly"
    }

    fn voice_for_role(&self, role: Role) -> String {
        match role {
            Role::Host => "Joanna",
            Role::Expert => "Matthew",
            Role::Questioner => "Ivy",
            Role::Correspondent => "Brian",
        }
        .to_string()
    }

    async fn synthesize(
        &self,
        text: &str,
        voice: &EffectiveVoice<'_>,
    ) -> Result<ProviderAudio, ProviderError> {
        let start_time = std::time::Instant::now();
        let batches = split_into_batches(text, MAX_BATCH_SIZE);

        // Raw PCM has no container, so batches join by plain byte append
        let mut pcm = Vec::new();
        for (index, batch) in batches.iter().enumerate() {
            tracing::debug!(batch_index = index, batch_size = batch.len(), "Synthesizing batch");
            pcm.extend(self.call_polly(batch, voice).await?);
        }

        if pcm.is_empty() {
            return Err(ProviderError::EmptyAudio);
        }

        let decoded = PcmAudio::from_pcm16_le(&pcm, PCM_SPEC);
        let duration_hint = decoded.duration_secs();
        let audio = decoded
            .encode_wav()
            .map_err(|e| ProviderError::Transient(format!("Failed to wrap Polly PCM: {}", e)))?;

        tracing::info!(
            provider = "polly",
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.len(),
            batch_count = batches.len(),
            audio_size_bytes = audio.len(),
            duration_secs = format!("{:.2}", duration_hint),
            "TTS synthesis completed"
        );

        Ok(ProviderAudio {
            audio,
            duration_hint: Some(duration_hint),
        })
    }
}
