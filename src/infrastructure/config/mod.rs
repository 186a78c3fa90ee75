use crate::domain::concat::{ConcatSettings, TierKind};
use crate::domain::pipeline::PipelineSettings;
use crate::domain::synthesis::SynthesisSettings;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub speech_provider: SpeechProviderKind,
    pub aws_region: String,
    pub openai_model: String,
    /// Remote merge is only available when a bucket is configured
    pub storage_bucket: Option<String>,
    pub storage_prefix: String,
    pub muxer: MuxerKind,
    pub ffmpeg_path: PathBuf,
    pub intro_path: Option<PathBuf>,
    pub outro_path: Option<PathBuf>,
    pub log_format: LogFormat,
    // Job
    pub transcript_path: Option<PathBuf>,
    pub target_duration: String,
    pub output_path: PathBuf,
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SpeechProviderKind {
    Polly,
    OpenAi,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MuxerKind {
    Ffmpeg,
    InProcess,
    Disabled,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            speech_provider: env::var("SPEECH_PROVIDER")
                .unwrap_or_else(|_| "polly".to_string())
                .parse::<String>()
                .map(|s| match s.to_lowercase().as_str() {
                    "openai" => SpeechProviderKind::OpenAi,
                    _ => SpeechProviderKind::Polly,
                })?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            openai_model: env::var("OPENAI_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            storage_bucket: optional_var("STORAGE_BUCKET"),
            storage_prefix: env::var("STORAGE_PREFIX")
                .unwrap_or_else(|_| "podcast-mixer".to_string()),
            muxer: env::var("MUXER")
                .unwrap_or_else(|_| "ffmpeg".to_string())
                .parse::<String>()
                .map(|s| match s.to_lowercase().as_str() {
                    "in_process" => MuxerKind::InProcess,
                    "disabled" | "none" => MuxerKind::Disabled,
                    _ => MuxerKind::Ffmpeg,
                })?,
            ffmpeg_path: PathBuf::from(
                env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ),
            intro_path: optional_var("INTRO_PATH").map(PathBuf::from),
            outro_path: optional_var("OUTRO_PATH").map(PathBuf::from),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            transcript_path: optional_var("TRANSCRIPT_PATH").map(PathBuf::from),
            target_duration: env::var("TARGET_DURATION")
                .unwrap_or_else(|_| "8-10 minutes".to_string()),
            output_path: PathBuf::from(
                env::var("OUTPUT_PATH").unwrap_or_else(|_| "podcast.wav".to_string()),
            ),
            pipeline: pipeline_settings_from_env()?,
        };

        Ok(config)
    }
}

fn pipeline_settings_from_env() -> Result<PipelineSettings, Box<dyn std::error::Error>> {
    let defaults = PipelineSettings::default();
    let synthesis = SynthesisSettings {
        call_timeout: secs_var("PROVIDER_TIMEOUT_SECS", defaults.synthesis.call_timeout)?,
        max_retries: parsed_var("PROVIDER_MAX_RETRIES", defaults.synthesis.max_retries)?,
        retry_backoff: env::var("PROVIDER_BACKOFF_MS")
            .ok()
            .map(|v| v.parse::<u64>().map(Duration::from_millis))
            .transpose()?
            .unwrap_or(defaults.synthesis.retry_backoff),
        max_consecutive_failures: parsed_var(
            "MAX_CONSECUTIVE_FAILURES",
            defaults.synthesis.max_consecutive_failures,
        )?,
    };

    let concat = ConcatSettings {
        remote_timeout: secs_var("REMOTE_MERGE_TIMEOUT_SECS", defaults.concat.remote_timeout)?,
        sequential_timeout: secs_var(
            "SEQUENTIAL_MERGE_TIMEOUT_SECS",
            defaults.concat.sequential_timeout,
        )?,
        batched_timeout: secs_var("BATCHED_MERGE_TIMEOUT_SECS", defaults.concat.batched_timeout)?,
        naive_timeout: secs_var("NAIVE_MERGE_TIMEOUT_SECS", defaults.concat.naive_timeout)?,
        storage_call_timeout: secs_var(
            "STORAGE_CALL_TIMEOUT_SECS",
            defaults.concat.storage_call_timeout,
        )?,
        signed_url_ttl: secs_var("SIGNED_URL_TTL_SECS", defaults.concat.signed_url_ttl)?,
        remote_min_segments: parsed_var("REMOTE_MIN_SEGMENTS", defaults.concat.remote_min_segments)?,
        batched_threshold: parsed_var("BATCHED_THRESHOLD", defaults.concat.batched_threshold)?,
        batch_size: parsed_var("BATCH_SIZE", defaults.concat.batch_size)?,
        work_dir: optional_var("WORK_DIR").map(PathBuf::from),
        tiers: match optional_var("CONCAT_TIERS") {
            Some(list) => list
                .split(',')
                .filter(|tier| !tier.trim().is_empty())
                .map(str::parse::<TierKind>)
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.concat.tiers,
        },
    };

    Ok(PipelineSettings {
        synthesis,
        concat,
        fallback_min_chars: parsed_var("FALLBACK_MIN_CHARS", defaults.fallback_min_chars)?,
    })
}

/// Unset and blank variables both count as absent
fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::error::Error + 'static,
{
    match optional_var(key) {
        Some(value) => Ok(value.trim().parse()?),
        None => Ok(default),
    }
}

fn secs_var(key: &str, default: Duration) -> Result<Duration, Box<dyn std::error::Error>> {
    parsed_var(key, default.as_secs()).map(Duration::from_secs)
}
