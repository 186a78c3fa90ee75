// End-to-end tests for the podcast-mixer pipeline
//
// Every test runs the real parser, estimator, synthesizer, concatenation engine
// and bumper injector. Only the external capabilities are replaced:
// - FakeSpeechProvider renders a silent-ish tone whose length follows the
//   words-per-minute model, divided by the requested speaking rate
// - DirectoryStorage keeps "uploaded" objects as files and hands out their
//   paths as signed URLs, so the in-process muxer can read them back
// - FailingMuxer / StallingMuxer stand in for a broken or hung subprocess

mod helpers;
mod test_bumpers;
mod test_concatenation;
mod test_pipeline;
