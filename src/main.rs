use anyhow::Context;
use podcast_mixer::domain::pipeline::{PodcastPipeline, PodcastPipelineApi};
use podcast_mixer::infrastructure::config::{Config, LogFormat, MuxerKind, SpeechProviderKind};
use podcast_mixer::infrastructure::muxer::{AudioMuxer, FfmpegMuxer, InProcessMuxer};
use podcast_mixer::infrastructure::repositories::{
    BumperRepository, ObjectStorage, OpenAiSpeechProvider, PollySpeechProvider, S3ObjectStorage,
    SpeechProvider,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    let transcript_path = config
        .transcript_path
        .clone()
        .context("TRANSCRIPT_PATH must point at the transcript to synthesize")?;
    let transcript = tokio::fs::read_to_string(&transcript_path)
        .await
        .with_context(|| format!("cannot read transcript {}", transcript_path.display()))?;

    tracing::info!(
        transcript = %transcript_path.display(),
        target_duration = %config.target_duration,
        provider = ?config.speech_provider,
        muxer = ?config.muxer,
        "Starting podcast-mixer"
    );

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;
    tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Capability adapters
    let provider: Arc<dyn SpeechProvider> = match config.speech_provider {
        SpeechProviderKind::Polly => {
            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
            Arc::new(PollySpeechProvider::new(polly_client))
        }
        SpeechProviderKind::OpenAi => {
            let openai_client = Arc::new(async_openai::Client::new());
            Arc::new(OpenAiSpeechProvider::new(openai_client, config.openai_model.clone()))
        }
    };

    let storage: Option<Arc<dyn ObjectStorage>> = config.storage_bucket.clone().map(|bucket| {
        let s3_client = Arc::new(aws_sdk_s3::Client::new(&aws_config));
        Arc::new(S3ObjectStorage::new(s3_client, bucket, config.storage_prefix.clone()))
            as Arc<dyn ObjectStorage>
    });

    let muxer: Option<Arc<dyn AudioMuxer>> = match config.muxer {
        MuxerKind::Ffmpeg => Some(Arc::new(FfmpegMuxer::new(config.ffmpeg_path.clone()))),
        MuxerKind::InProcess => Some(Arc::new(InProcessMuxer::default())),
        MuxerKind::Disabled => None,
    };

    let bumper_repo = Arc::new(BumperRepository::new(
        config.intro_path.clone(),
        config.outro_path.clone(),
    ));

    // 2. Pipeline
    tracing::info!(
        provider = provider.name(),
        remote_merge = storage.is_some() && muxer.is_some(),
        bumpers = bumper_repo.is_configured(),
        "Instantiating pipeline..."
    );
    let pipeline = PodcastPipeline::new(
        provider,
        storage,
        muxer,
        bumper_repo,
        config.pipeline.clone(),
    );

    // Ctrl-C cancels the run and lets every stage clean up
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            signal_token.cancel();
        }
    });

    let result = match pipeline
        .produce(&transcript, &config.target_duration, &cancel)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            let report = serde_json::to_string_pretty(&e.to_report())?;
            eprintln!("{}", report);
            std::process::exit(1);
        }
    };

    tokio::fs::write(&config.output_path, &result.audio)
        .await
        .with_context(|| format!("cannot write {}", config.output_path.display()))?;

    let metadata_path = config.output_path.with_extension("json");
    tokio::fs::write(&metadata_path, serde_json::to_vec_pretty(&result.metadata)?)
        .await
        .with_context(|| format!("cannot write {}", metadata_path.display()))?;

    tracing::info!(
        output = %config.output_path.display(),
        metadata = %metadata_path.display(),
        total_duration_secs = format!("{:.1}", result.metadata.total_duration_secs),
        "Podcast written"
    );

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "podcast_mixer=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "podcast_mixer=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
