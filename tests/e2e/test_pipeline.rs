use crate::e2e::helpers;

use helpers::fakes::{DirectoryStorage, FailingMuxer, FakeSpeechProvider, StallingMuxer};
use helpers::{assert_close, TestContext, HOST_EXPERT_TRANSCRIPT};
use podcast_mixer::domain::audio::wav_duration_secs;
use podcast_mixer::domain::concat::TierKind;
use podcast_mixer::domain::duration::estimator::MIN_SCALE_FACTOR;
use podcast_mixer::domain::pipeline::PodcastPipelineApi;
use podcast_mixer::domain::voice::Role;
use podcast_mixer::error::{PipelineError, PipelineErrorKind, Stage};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn it_should_produce_a_two_voice_episode() {
    let provider = Arc::new(FakeSpeechProvider::new());
    let ctx = TestContext::new(provider.clone());

    let result = ctx
        .pipeline()
        .produce_with_target_secs(HOST_EXPERT_TRANSCRIPT, 30.0, &CancellationToken::new())
        .await
        .unwrap();
    let metadata = &result.metadata;

    let roles: Vec<Role> = metadata.segments.iter().map(|s| s.role).collect();
    assert_eq!(roles, vec![Role::Host, Role::Expert]);
    assert_eq!(metadata.speakers_used, vec![Role::Host, Role::Expert]);
    assert_eq!(provider.calls(), 2);
    assert_eq!(metadata.degradations.concat.tier, Some(TierKind::Sequential));
    assert!(metadata.degradations.concat.failed_tiers.is_empty());
    assert!(metadata.degradations.dropped_turns.is_empty());

    // Two short lines are far below 30s, so speech is slowed as far as allowed
    assert_eq!(metadata.scale_factor, MIN_SCALE_FACTOR);
    assert_close(metadata.estimated_vs_actual_ratio, 1.0, 0.1);

    let segments_secs: f64 = metadata.segments.iter().filter_map(|s| s.actual_secs).sum();
    assert_close(metadata.total_duration_secs, segments_secs, 0.01);
    assert_close(wav_duration_secs(&result.audio).unwrap(), segments_secs, 0.01);
}

#[tokio::test]
async fn it_should_parse_target_duration_text() {
    let ctx = TestContext::new(Arc::new(FakeSpeechProvider::new()));

    let result = ctx
        .pipeline()
        .produce(HOST_EXPERT_TRANSCRIPT, "8-10 minutes", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.metadata.target_duration_secs, 540.0);
}

#[tokio::test]
async fn it_should_reject_an_unparseable_target_duration() {
    let ctx = TestContext::new(Arc::new(FakeSpeechProvider::new()));

    let err = ctx
        .pipeline()
        .produce(HOST_EXPERT_TRANSCRIPT, "soon-ish", &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), PipelineErrorKind::InvalidInput);
    assert_eq!(err.stage(), Stage::Input);
}

#[tokio::test]
async fn it_should_fall_back_to_local_merge_when_remote_mux_fails() {
    let storage = Arc::new(DirectoryStorage::new());
    let ctx = TestContext::new(Arc::new(FakeSpeechProvider::new()))
        .with_remote(storage.clone(), Arc::new(FailingMuxer));

    let result = ctx
        .pipeline()
        .produce_with_target_secs(&helpers::alternating_transcript(3), 60.0, &CancellationToken::new())
        .await
        .unwrap();
    let report = &result.metadata.degradations.concat;

    assert_eq!(report.tier, Some(TierKind::Sequential));
    assert_eq!(report.failed_tiers.len(), 1);
    assert_eq!(report.failed_tiers[0].tier, TierKind::Remote);
    assert!(!result.audio.is_empty());

    assert_eq!(storage.uploads(), 3);
    assert_eq!(storage.live_objects(), 0);
    assert_eq!(ctx.leftover_files(), 0);
}

#[tokio::test]
async fn it_should_merge_remotely_and_delete_uploads() {
    let storage = Arc::new(DirectoryStorage::new());
    let ctx = TestContext::new(Arc::new(FakeSpeechProvider::new())).with_remote(
        storage.clone(),
        Arc::new(podcast_mixer::infrastructure::muxer::InProcessMuxer::default()),
    );

    let result = ctx
        .pipeline()
        .produce_with_target_secs(&helpers::alternating_transcript(4), 60.0, &CancellationToken::new())
        .await
        .unwrap();
    let metadata = &result.metadata;

    assert_eq!(metadata.degradations.concat.tier, Some(TierKind::Remote));
    let segments_secs: f64 = metadata.segments.iter().filter_map(|s| s.actual_secs).sum();
    assert_close(metadata.total_duration_secs, segments_secs, 0.01);
    assert_eq!(storage.uploads(), 4);
    assert_eq!(storage.live_objects(), 0);
    assert_eq!(ctx.leftover_files(), 0);
}

#[tokio::test]
async fn it_should_abort_when_storage_rejects_credentials() {
    let storage = Arc::new(DirectoryStorage::rejecting_credentials());
    let ctx = TestContext::new(Arc::new(FakeSpeechProvider::new()))
        .with_remote(storage, Arc::new(FailingMuxer));

    let err = ctx
        .pipeline()
        .produce_with_target_secs(&helpers::alternating_transcript(3), 60.0, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), PipelineErrorKind::ProviderAuthFailure);
    assert_eq!(err.stage(), Stage::Concatenation(Some(TierKind::Remote)));
}

#[tokio::test]
async fn it_should_abort_when_provider_rejects_credentials() {
    let provider = Arc::new(FakeSpeechProvider::rejecting_credentials());
    let ctx = TestContext::new(provider.clone());

    let err = ctx
        .pipeline()
        .produce_with_target_secs(HOST_EXPERT_TRANSCRIPT, 30.0, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::ProviderAuthFailure {
            stage: Stage::Synthesis,
            ..
        }
    ));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn it_should_drop_failed_turns_and_keep_order() {
    let ctx = TestContext::new(Arc::new(FakeSpeechProvider::failing_on("unspeakable")));
    let transcript = "HOST: Welcome to the show everyone.\n\
                      EXPERT: This line is unspeakable for the provider.\n\
                      QUESTIONER: So what happens next then?\n";

    let result = ctx
        .pipeline()
        .produce_with_target_secs(transcript, 30.0, &CancellationToken::new())
        .await
        .unwrap();
    let metadata = &result.metadata;

    let ordinals: Vec<usize> = metadata.segments.iter().map(|s| s.turn_ordinal).collect();
    assert_eq!(ordinals, vec![0, 2]);
    assert_eq!(metadata.degradations.dropped_turns, vec![1]);
    assert_eq!(metadata.speakers_used, vec![Role::Host, Role::Questioner]);
}

#[tokio::test]
async fn it_should_abort_after_too_many_consecutive_failures() {
    let ctx = TestContext::new(Arc::new(FakeSpeechProvider::failing_on("static")));
    let transcript: String = (0..6)
        .map(|i| format!("HOST: Nothing but static on line {}.\n", i))
        .collect();

    let err = ctx
        .pipeline()
        .produce_with_target_secs(&transcript, 30.0, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::ConsecutiveFailures { failures: 4 }));
    assert_eq!(err.stage(), Stage::Synthesis);
}

#[tokio::test]
async fn it_should_fail_when_no_turn_survives() {
    let ctx = TestContext::new(Arc::new(FakeSpeechProvider::failing_on("static")));

    let err = ctx
        .pipeline()
        .produce_with_target_secs("HOST: Only static here.\n", 30.0, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), PipelineErrorKind::InsufficientSegments);
}

#[tokio::test]
async fn it_should_clean_up_remote_artifacts_on_cancellation() {
    let storage = Arc::new(DirectoryStorage::new());
    let ctx = TestContext::new(Arc::new(FakeSpeechProvider::new()))
        .with_remote(storage.clone(), Arc::new(StallingMuxer));
    let pipeline = ctx.pipeline();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let err = pipeline
        .produce_with_target_secs(&helpers::alternating_transcript(4), 60.0, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Cancelled(Stage::Concatenation(Some(TierKind::Remote)))
    ));
    assert_eq!(storage.uploads(), 4);
    assert_eq!(storage.live_objects(), 0);
    assert_eq!(ctx.leftover_files(), 0);
}

#[tokio::test]
async fn it_should_stop_before_synthesis_when_already_cancelled() {
    let provider = Arc::new(FakeSpeechProvider::new());
    let ctx = TestContext::new(provider.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = ctx
        .pipeline()
        .produce_with_target_secs(HOST_EXPERT_TRANSCRIPT, 30.0, &cancel)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), PipelineErrorKind::Cancelled);
    assert_eq!(provider.calls(), 0);
}
