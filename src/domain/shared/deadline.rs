use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Outcome of an external call that did not produce a value
#[derive(Debug)]
pub enum CallError<E> {
    Timeout(Duration),
    Cancelled,
    Failed(E),
}

impl<E: std::fmt::Display> std::fmt::Display for CallError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallError::Timeout(limit) => write!(f, "timed out after {:?}", limit),
            CallError::Cancelled => write!(f, "cancelled"),
            CallError::Failed(e) => write!(f, "{}", e),
        }
    }
}

/// Run a suspension point under a time budget and the pipeline's cancellation signal.
///
/// Cancellation wins over completion when both are ready, so a raised token never
/// lets new work through.
pub async fn bounded<F, T, E>(
    fut: F,
    limit: Duration,
    cancel: &CancellationToken,
) -> Result<T, CallError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CallError::Cancelled),
        result = tokio::time::timeout(limit, fut) => match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CallError::Failed(e)),
            Err(_) => Err(CallError::Timeout(limit)),
        },
    }
}
