#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("turn {ordinal} failed to synthesize: {reason}")]
    SegmentFailure { ordinal: usize, reason: String },
    #[error("provider credentials rejected: {0}")]
    ProviderAuth(String),
    #[error("synthesis cancelled")]
    Cancelled,
}
