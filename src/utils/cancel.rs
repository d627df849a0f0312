//! Cancellation helpers.
//!
//! Every network call and every politeness sleep in the pipeline is a
//! suspension point that must give way to the run-wide cancellation token.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Run `fut` until it completes or `cancel` fires.
///
/// Returns `None` when cancelled; the future is dropped in that case.
pub async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Sleep for `delay`, returning `false` if cancelled first.
pub async fn sleep_or_cancel(cancel: &CancellationToken, delay: Duration) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    until_cancelled(cancel, tokio::time::sleep(delay)).await.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_until_cancelled_completes() {
        let cancel = CancellationToken::new();
        let out = until_cancelled(&cancel, async { 7 }).await;
        assert_eq!(out, Some(7));
    }

    #[tokio::test]
    async fn test_until_cancelled_drops_pending_future() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let out = until_cancelled(&cancel, std::future::pending::<()>()).await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_sleep_interrupted() {
        let cancel = CancellationToken::new();
        let child = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            child.cancel();
        });
        let started = std::time::Instant::now();
        assert!(!sleep_or_cancel(&cancel, Duration::from_secs(30)).await);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
