use super::speech_provider::{split_into_batches, ProviderAudio, ProviderError, SpeechProvider};
use crate::domain::audio::{AudioSpec, PcmAudio};
use crate::domain::voice::{EffectiveVoice, Role};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request
const MAX_BATCH_SIZE: usize = 4096;

/// OpenAI `pcm` responses are 24 kHz mono signed 16-bit little-endian
const PCM_SPEC: AudioSpec = AudioSpec {
    sample_rate: 24000,
    channels: 1,
};

/// OpenAI TTS implementation of the speech provider
pub struct OpenAiSpeechProvider {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiSpeechProvider {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    fn parse_voice(voice: &str) -> Voice {
        match voice.to_lowercase().as_str() {
            "alloy" => Voice::Alloy,
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Alloy,
        }
    }

    fn classify_error(err: OpenAIError) -> ProviderError {
        match &err {
            OpenAIError::ApiError(api) => {
                let code = format!("{:?}", api.code);
                if code.contains("invalid_api_key") || api.message.contains("Incorrect API key") {
                    ProviderError::Auth(api.message.clone())
                } else {
                    ProviderError::Transient(format!("OpenAI TTS error: {}", err))
                }
            }
            _ => ProviderError::Transient(format!("OpenAI TTS error: {}", err)),
        }
    }

    /// Call OpenAI TTS API to synthesize a single text batch into raw PCM
    async fn call_openai(&self, text: &str, voice: &EffectiveVoice<'_>) -> Result<Vec<u8>, ProviderError> {
        tracing::info!(
            model = %self.model,
            role = %voice.profile.role,
            voice = %voice.profile.voice_id,
            speaking_rate = voice.speaking_rate,
            text_length = text.len(),
            text_preview = %text.chars().take(200).collect::<String>(),
            "Calling OpenAI TTS API"
        );

        let model = match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        };

        let request = CreateSpeechRequest {
            model,
            input: text.to_string(),
            voice: Self::parse_voice(&voice.profile.voice_id),
            response_format: Some(SpeechResponseFormat::Pcm),
            speed: Some(voice.speaking_rate.clamp(0.25, 4.0)),
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                role = %voice.profile.role,
                text_length = text.len(),
                "OpenAI TTS API call failed"
            );
            Self::classify_error(e)
        })?;

        Ok(response.bytes.to_vec())
    }
}

#[async_trait]
impl SpeechProvider for OpenAiSpeechProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn voice_for_role(&self, role: Role) -> String {
        match role {
            Role::Host => "alloy",
            Role::Expert => "onyx",
            Role::Questioner => "nova",
            Role::Correspondent => "fable",
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

        let mut pcm = Vec::new();
        for (index, batch) in batches.iter().enumerate() {
            tracing::debug!(batch_index = index, batch_size = batch.len(), "Synthesizing batch");
            pcm.extend(self.call_openai(batch, voice).await?);
        }

        if pcm.is_empty() {
            return Err(ProviderError::EmptyAudio);
        }

        let decoded = PcmAudio::from_pcm16_le(&pcm, PCM_SPEC);
        let duration_hint = decoded.duration_secs();
        let audio = decoded
            .encode_wav()
            .map_err(|e| ProviderError::Transient(format!("Failed to wrap OpenAI PCM: {}", e)))?;

        tracing::info!(
            provider = "openai",
            model = %self.model,
            voice = %voice.profile.voice_id,
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.len(),
            batch_count = batches.len(),
            audio_size_bytes = audio.len(),
            "TTS synthesis completed"
        );

        Ok(ProviderAudio {
            audio,
            duration_hint: Some(duration_hint),
        })
    }
}
