use crate::e2e::helpers;

use helpers::fakes::{DirectoryStorage, FakeSpeechProvider, StallingMuxer, FAKE_SPEC};
use helpers::{alternating_transcript, assert_close, TestContext};
use podcast_mixer::domain::audio::{wav_duration_secs, PcmAudio};
use podcast_mixer::domain::concat::{FailureKind, TierKind};
use podcast_mixer::domain::pipeline::PodcastPipelineApi;
use podcast_mixer::error::{PipelineErrorKind, Stage};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn it_should_merge_large_episodes_in_fixed_batches() {
    let mut ctx = TestContext::new(Arc::new(FakeSpeechProvider::new()));
    ctx.settings.concat.batched_threshold = 20;
    ctx.settings.concat.batch_size = 10;

    let result = ctx
        .pipeline()
        .produce_with_target_secs(&alternating_transcript(25), 120.0, &CancellationToken::new())
        .await
        .unwrap();
    let metadata = &result.metadata;
    let report = &metadata.degradations.concat;

    assert_eq!(metadata.segments.len(), 25);
    assert_eq!(report.tier, Some(TierKind::Batched));
    assert_eq!(report.batch_sizes, vec![10, 10, 5]);
    assert!(report.failed_tiers.is_empty());

    let segments_secs: f64 = metadata.segments.iter().filter_map(|s| s.actual_secs).sum();
    assert_close(wav_duration_secs(&result.audio).unwrap(), segments_secs, 0.01);
}

#[tokio::test]
async fn it_should_pass_a_single_segment_through_unchanged() {
    let storage = Arc::new(DirectoryStorage::new());
    let mut ctx = TestContext::new(Arc::new(FakeSpeechProvider::new())).with_remote(
        storage.clone(),
        Arc::new(podcast_mixer::infrastructure::muxer::InProcessMuxer::default()),
    );
    ctx.settings.concat.remote_min_segments = 1;

    let result = ctx
        .pipeline()
        .produce_with_target_secs(
            "HOST: A monologue with nobody else around.\n",
            10.0,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    let metadata = &result.metadata;

    assert_eq!(metadata.degradations.concat.tier, None);
    assert!(metadata.degradations.concat.failed_tiers.is_empty());
    assert_eq!(storage.uploads(), 0);
    assert_close(
        metadata.total_duration_secs,
        metadata.segments[0].actual_secs.unwrap(),
        1e-9,
    );
    assert_eq!(PcmAudio::decode_wav(&result.audio).unwrap().spec(), FAKE_SPEC);
}

#[tokio::test]
async fn it_should_use_batched_merge_without_trying_sequential_above_threshold() {
    let mut ctx = TestContext::new(Arc::new(FakeSpeechProvider::new()));
    ctx.settings.concat.batched_threshold = 3;
    ctx.settings.concat.batch_size = 2;

    let result = ctx
        .pipeline()
        .produce_with_target_secs(&alternating_transcript(5), 60.0, &CancellationToken::new())
        .await
        .unwrap();
    let report = &result.metadata.degradations.concat;

    assert_eq!(report.tier, Some(TierKind::Batched));
    assert_eq!(report.batch_sizes, vec![2, 2, 1]);
    assert_eq!(ctx.leftover_files(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn it_should_fall_back_when_the_mux_subprocess_exits_non_zero() {
    use podcast_mixer::infrastructure::muxer::FfmpegMuxer;
    use std::path::PathBuf;

    let storage = Arc::new(DirectoryStorage::new());
    let ctx = TestContext::new(Arc::new(FakeSpeechProvider::new()))
        .with_remote(storage.clone(), Arc::new(FfmpegMuxer::new(PathBuf::from("false"))));

    let result = ctx
        .pipeline()
        .produce_with_target_secs(&alternating_transcript(3), 60.0, &CancellationToken::new())
        .await
        .unwrap();
    let report = &result.metadata.degradations.concat;

    assert_eq!(report.failed_tiers[0].tier, TierKind::Remote);
    assert!(report.failed_tiers[0].reason.contains("status"));
    assert_eq!(report.tier, Some(TierKind::Sequential));
    assert_eq!(storage.live_objects(), 0);
    assert_eq!(ctx.leftover_files(), 0);
}

#[tokio::test]
async fn it_should_fall_back_when_remote_merge_times_out() {
    let storage = Arc::new(DirectoryStorage::new());
    let mut ctx = TestContext::new(Arc::new(FakeSpeechProvider::new()))
        .with_remote(storage.clone(), Arc::new(StallingMuxer));
    ctx.settings.concat.remote_timeout = Duration::from_millis(300);

    let result = ctx
        .pipeline()
        .produce_with_target_secs(&alternating_transcript(3), 60.0, &CancellationToken::new())
        .await
        .unwrap();
    let report = &result.metadata.degradations.concat;

    assert_eq!(report.failed_tiers.len(), 1);
    assert_eq!(report.failed_tiers[0].tier, TierKind::Remote);
    assert_eq!(report.failed_tiers[0].kind, FailureKind::TimedOut);
    assert!(report.failed_tiers[0].reason.contains("exceeded"));
    assert_eq!(report.tier, Some(TierKind::Sequential));
    assert_eq!(storage.uploads(), 3);
    assert_eq!(storage.live_objects(), 0);
    assert_eq!(ctx.leftover_files(), 0);
}

#[tokio::test]
async fn it_should_fail_when_the_last_tier_times_out() {
    let storage = Arc::new(DirectoryStorage::new());
    let mut ctx = TestContext::new(Arc::new(FakeSpeechProvider::new()))
        .with_remote(storage.clone(), Arc::new(StallingMuxer));
    ctx.settings.concat.tiers = vec![TierKind::Remote];
    ctx.settings.concat.remote_timeout = Duration::from_millis(300);

    let err = ctx
        .pipeline()
        .produce_with_target_secs(&alternating_transcript(3), 60.0, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), PipelineErrorKind::ConcatenationFatal);
    assert_eq!(err.stage(), Stage::Concatenation(Some(TierKind::Remote)));
    assert!(err.to_string().contains("exceeded"));
    assert_eq!(storage.live_objects(), 0);
    assert_eq!(ctx.leftover_files(), 0);
}
