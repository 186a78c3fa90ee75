use crate::e2e::helpers;

use helpers::fakes::{tone_wav, FakeSpeechProvider};
use helpers::{assert_close, TestContext, HOST_EXPERT_TRANSCRIPT};
use podcast_mixer::domain::audio::AudioSpec;
use podcast_mixer::domain::bumper::BumperStatus;
use podcast_mixer::domain::pipeline::{PodcastPipelineApi, SynthesisResult};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const BUMPER_SPEC: AudioSpec = AudioSpec {
    sample_rate: 16000,
    channels: 2,
};

async fn produce(ctx: &TestContext) -> SynthesisResult {
    ctx.pipeline()
        .produce_with_target_secs(HOST_EXPERT_TRANSCRIPT, 30.0, &CancellationToken::new())
        .await
        .unwrap()
}

fn write_clip(dir: &tempfile::TempDir, name: &str, secs: f64) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, tone_wav(BUMPER_SPEC, secs)).unwrap();
    path
}

#[tokio::test]
async fn it_should_add_intro_and_outro_duration() {
    let assets = tempfile::tempdir().unwrap();
    let intro = write_clip(&assets, "intro.wav", 1.0);
    let outro = write_clip(&assets, "outro.wav", 0.5);

    let plain = produce(&TestContext::new(Arc::new(FakeSpeechProvider::new()))).await;
    let bumpered = produce(
        &TestContext::new(Arc::new(FakeSpeechProvider::new())).with_bumpers(Some(intro), Some(outro)),
    )
    .await;

    assert_eq!(plain.metadata.degradations.bumpers, BumperStatus::NotConfigured);
    assert_eq!(bumpered.metadata.degradations.bumpers, BumperStatus::Applied);
    assert_close(
        bumpered.metadata.total_duration_secs,
        plain.metadata.total_duration_secs + 1.5,
        0.01,
    );
}

#[tokio::test]
async fn it_should_keep_main_audio_when_intro_is_missing() {
    let assets = tempfile::tempdir().unwrap();
    let outro = write_clip(&assets, "outro.wav", 0.5);

    let plain = produce(&TestContext::new(Arc::new(FakeSpeechProvider::new()))).await;
    let result = produce(
        &TestContext::new(Arc::new(FakeSpeechProvider::new()))
            .with_bumpers(Some(assets.path().join("missing-intro.wav")), Some(outro)),
    )
    .await;

    assert!(matches!(
        result.metadata.degradations.bumpers,
        BumperStatus::Omitted(_)
    ));
    assert_eq!(result.audio, plain.audio);
    assert_close(
        result.metadata.total_duration_secs,
        plain.metadata.total_duration_secs,
        1e-9,
    );
}

#[tokio::test]
async fn it_should_keep_main_audio_when_a_bumper_is_not_audio() {
    let assets = tempfile::tempdir().unwrap();
    let intro = assets.path().join("intro.wav");
    std::fs::write(&intro, b"definitely not a wav file").unwrap();

    let plain = produce(&TestContext::new(Arc::new(FakeSpeechProvider::new()))).await;
    let result = produce(
        &TestContext::new(Arc::new(FakeSpeechProvider::new())).with_bumpers(Some(intro), None),
    )
    .await;

    assert!(matches!(
        result.metadata.degradations.bumpers,
        BumperStatus::Omitted(_)
    ));
    assert_eq!(result.audio, plain.audio);
}
