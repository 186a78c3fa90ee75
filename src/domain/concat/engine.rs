use super::error::ConcatError;
use super::local::{batched_merge, sequential_merge};
use super::monitor::MemoryMonitor;
use super::naive::naive_concat;
use super::remote::remote_merge;
use super::{ConcatReport, FailureKind, FatalCause, TierFailure, TierKind, TierOutcome};
use crate::domain::shared::deadline::{bounded, CallError};
use crate::domain::synthesis::AudioSegment;
use crate::infrastructure::muxer::AudioMuxer;
use crate::infrastructure::repositories::ObjectStorage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct ConcatSettings {
    pub remote_timeout: Duration,
    pub sequential_timeout: Duration,
    pub batched_timeout: Duration,
    pub naive_timeout: Duration,
    /// Budget for each individual storage call inside the remote tier
    pub storage_call_timeout: Duration,
    pub signed_url_ttl: Duration,
    /// Below this many segments the remote tier is not worth its round-trips
    pub remote_min_segments: usize,
    /// Above this many segments the sequential tier is skipped for the batched one
    pub batched_threshold: usize,
    pub batch_size: usize,
    /// Parent directory for scratch files; the system temp dir when unset
    pub work_dir: Option<PathBuf>,
    /// Tiers allowed to run, tried in the fixed remote, sequential, batched, naive order
    pub tiers: Vec<TierKind>,
}

impl Default for ConcatSettings {
    fn default() -> Self {
        Self {
            remote_timeout: Duration::from_secs(10 * 60),
            sequential_timeout: Duration::from_secs(5 * 60),
            batched_timeout: Duration::from_secs(5 * 60),
            naive_timeout: Duration::from_secs(30),
            storage_call_timeout: Duration::from_secs(60),
            signed_url_ttl: Duration::from_secs(15 * 60),
            remote_min_segments: 20,
            batched_threshold: 60,
            batch_size: 10,
            work_dir: None,
            tiers: vec![
                TierKind::Remote,
                TierKind::Sequential,
                TierKind::Batched,
                TierKind::Naive,
            ],
        }
    }
}

impl ConcatSettings {
    fn allows(&self, tier: TierKind) -> bool {
        self.tiers.contains(&tier)
    }

    fn timeout_for(&self, tier: TierKind) -> Duration {
        match tier {
            TierKind::Remote => self.remote_timeout,
            TierKind::Sequential => self.sequential_timeout,
            TierKind::Batched => self.batched_timeout,
            TierKind::Naive => self.naive_timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConcatOutput {
    pub audio: Vec<u8>,
    pub report: ConcatReport,
}

/// Merges ordered audio segments through a chain of progressively simpler tiers
pub struct ConcatenationEngine {
    storage: Option<Arc<dyn ObjectStorage>>,
    muxer: Option<Arc<dyn AudioMuxer>>,
    settings: ConcatSettings,
    monitor: Arc<MemoryMonitor>,
}

impl ConcatenationEngine {
    pub fn new(
        storage: Option<Arc<dyn ObjectStorage>>,
        muxer: Option<Arc<dyn AudioMuxer>>,
        settings: ConcatSettings,
        monitor: Arc<MemoryMonitor>,
    ) -> Self {
        Self {
            storage,
            muxer,
            settings,
            monitor,
        }
    }

    /// Tiers this engine will try for `segment_count` segments, in order
    pub fn plan(&self, segment_count: usize) -> Vec<TierKind> {
        let mut tiers = Vec::with_capacity(4);
        if self.storage.is_some()
            && self.muxer.is_some()
            && segment_count >= self.settings.remote_min_segments
        {
            tiers.push(TierKind::Remote);
        }
        if segment_count <= self.settings.batched_threshold {
            tiers.push(TierKind::Sequential);
        }
        tiers.push(TierKind::Batched);
        tiers.push(TierKind::Naive);
        tiers.retain(|tier| self.settings.allows(*tier));
        tiers
    }

    /// Merge segments in order. A single segment is returned untouched.
    pub async fn concatenate(
        &self,
        segments: &[AudioSegment],
        cancel: &CancellationToken,
    ) -> Result<ConcatOutput, ConcatError> {
        match segments {
            [] => return Err(ConcatError::NoSegments),
            [only] => {
                tracing::info!("Single segment, concatenation skipped");
                return Ok(ConcatOutput {
                    audio: only.audio.clone(),
                    report: ConcatReport::default(),
                });
            }
            _ => {}
        }

        let plan = self.plan(segments.len());
        tracing::info!(
            segment_count = segments.len(),
            plan = ?plan,
            "Starting concatenation"
        );

        let last_tier = plan.last().copied();
        let mut report = ConcatReport::default();
        for tier in plan {
            let start_time = Instant::now();
            self.monitor.sample(&format!("{}:start", tier));

            let mut batch_sizes = Vec::new();
            let outcome = self.run_tier(tier, segments, &mut batch_sizes, cancel).await;

            match outcome {
                TierOutcome::Succeeded(audio) if !audio.is_empty() => {
                    tracing::info!(
                        tier = %tier,
                        latency_ms = start_time.elapsed().as_millis(),
                        audio_size_bytes = audio.len(),
                        failed_tiers = report.failed_tiers.len(),
                        "Concatenation succeeded"
                    );
                    report.tier = Some(tier);
                    report.batch_sizes = batch_sizes;
                    return Ok(ConcatOutput { audio, report });
                }
                TierOutcome::Succeeded(_) => {
                    Self::record_failure(
                        &mut report,
                        tier,
                        FailureKind::Failed,
                        "tier produced empty output".to_string(),
                    );
                }
                TierOutcome::Retryable(reason) => {
                    Self::record_failure(&mut report, tier, FailureKind::Failed, reason);
                }
                TierOutcome::TimedOut(limit) if Some(tier) == last_tier => {
                    let reason = format!("{} merge exceeded {:?}", tier, limit);
                    tracing::error!(tier = %tier, reason = %reason, "Final concatenation tier timed out");
                    return Err(ConcatError::Fatal { tier, reason });
                }
                TierOutcome::TimedOut(limit) => {
                    let reason = format!("{} merge exceeded {:?}", tier, limit);
                    Self::record_failure(&mut report, tier, FailureKind::TimedOut, reason);
                }
                TierOutcome::Fatal(FatalCause::Cancelled) => {
                    tracing::warn!(tier = %tier, "Concatenation cancelled");
                    return Err(ConcatError::Cancelled { tier });
                }
                TierOutcome::Fatal(FatalCause::AuthRejected(reason)) => {
                    tracing::error!(tier = %tier, reason = %reason, "Storage credentials rejected");
                    return Err(ConcatError::AuthRejected { tier, reason });
                }
            }
        }

        tracing::error!(failures = ?report.failed_tiers, "All concatenation tiers failed");
        Err(ConcatError::Exhausted {
            failures: report.failed_tiers,
        })
    }

    fn record_failure(report: &mut ConcatReport, tier: TierKind, kind: FailureKind, reason: String) {
        tracing::warn!(
            tier = %tier,
            kind = ?kind,
            reason = %reason,
            "Concatenation tier failed, falling back"
        );
        report.failed_tiers.push(TierFailure { tier, kind, reason });
    }

    async fn run_tier(
        &self,
        tier: TierKind,
        segments: &[AudioSegment],
        batch_sizes: &mut Vec<usize>,
        cancel: &CancellationToken,
    ) -> TierOutcome {
        let limit = self.settings.timeout_for(tier);
        let work_dir = self.settings.work_dir.as_deref();

        let result = match tier {
            TierKind::Remote => {
                return match (&self.storage, &self.muxer) {
                    (Some(storage), Some(muxer)) => {
                        remote_merge(storage, muxer, &self.settings, segments, cancel).await
                    }
                    _ => TierOutcome::Retryable("remote merge is not configured".to_string()),
                };
            }
            TierKind::Sequential => {
                bounded(sequential_merge(segments, work_dir, &self.monitor), limit, cancel).await
            }
            TierKind::Batched => {
                bounded(
                    batched_merge(segments, self.settings.batch_size, &self.monitor, batch_sizes),
                    limit,
                    cancel,
                )
                .await
            }
            TierKind::Naive => {
                let naive = async { Ok::<_, std::convert::Infallible>(naive_concat(segments)) };
                return match bounded(naive, limit, cancel).await {
                    Ok(outcome) => outcome,
                    Err(CallError::Cancelled) => TierOutcome::Fatal(FatalCause::Cancelled),
                    Err(CallError::Timeout(limit)) => TierOutcome::TimedOut(limit),
                    Err(CallError::Failed(never)) => match never {},
                };
            }
        };

        match result {
            Ok(audio) => TierOutcome::Succeeded(audio),
            Err(CallError::Cancelled) => TierOutcome::Fatal(FatalCause::Cancelled),
            Err(CallError::Timeout(limit)) => TierOutcome::TimedOut(limit),
            Err(CallError::Failed(e)) => TierOutcome::Retryable(e.to_string()),
        }
    }
}
