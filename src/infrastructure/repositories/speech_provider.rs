use crate::domain::voice::{EffectiveVoice, Role};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+\s+").expect("sentence pattern"));

/// Audio returned by a provider for one request
#[derive(Debug, Clone)]
pub struct ProviderAudio {
    /// WAV-encoded audio
    pub audio: Vec<u8>,
    /// Provider-reported duration, when the provider knows it
    pub duration_hint: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("credentials rejected: {0}")]
    Auth(String),
    #[error("provider returned no audio")]
    EmptyAudio,
    #[error("provider error: {0}")]
    Transient(String),
}

/// Voice-synthesis capability.
/// Abstracts the underlying provider (AWS Polly, OpenAI, ...)
///
/// Implementations are responsible for:
/// - Handling provider-specific text length limitations
/// - Mapping a role to one of the provider's voices
/// - Applying the per-call speaking rate
/// - Returning WAV audio regardless of the provider's native format
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Provider voice identifier used for a role in the shared voice table
    fn voice_for_role(&self, role: Role) -> String;

    /// Synthesize one cleaned utterance with the given voice
    ///
    /// # Errors
    /// `ProviderError::Auth` for rejected credentials (never retried),
    /// `ProviderError::Transient` for anything that may succeed on retry
    async fn synthesize(
        &self,
        text: &str,
        voice: &EffectiveVoice<'_>,
    ) -> Result<ProviderAudio, ProviderError>;
}

/// Error codes AWS services return for invalid or expired credentials
pub(crate) fn is_aws_auth_code(code: Option<&str>) -> bool {
    matches!(
        code,
        Some(
            "UnrecognizedClientException"
                | "InvalidSignatureException"
                | "InvalidClientTokenId"
                | "AccessDenied"
                | "AccessDeniedException"
                | "InvalidAccessKeyId"
                | "SignatureDoesNotMatch"
                | "ExpiredToken"
                | "ExpiredTokenException"
        )
    )
}

/// Split text into batches that respect sentence boundaries.
/// Each batch holds at most `max_chars` characters.
pub(crate) fn split_into_batches(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut batches = Vec::new();
    let mut current_batch = String::new();
    let mut last_end = 0;

    for mat in SENTENCE_END.find_iter(text) {
        let sentence = &text[last_end..mat.end()];
        if !current_batch.is_empty()
            && current_batch.chars().count() + sentence.chars().count() > max_chars
        {
            batches.push(current_batch.trim().to_string());
            current_batch = String::new();
        }
        current_batch.push_str(sentence);
        last_end = mat.end();
    }

    let remaining = &text[last_end..];
    if !remaining.is_empty() {
        if !current_batch.is_empty()
            && current_batch.chars().count() + remaining.chars().count() > max_chars
        {
            batches.push(current_batch.trim().to_string());
            current_batch = String::new();
        }
        current_batch.push_str(remaining);
    }

    // Sentences longer than the limit are cut on character boundaries
    let mut result = Vec::new();
    for batch in batches.into_iter().chain(std::iter::once(current_batch)) {
        let batch = batch.trim();
        if batch.is_empty() {
            continue;
        }
        if batch.chars().count() <= max_chars {
            result.push(batch.to_string());
        } else {
            let chars: Vec<char> = batch.chars().collect();
            for chunk in chars.chunks(max_chars) {
                result.push(chunk.iter().collect());
            }
        }
    }
    result
}
