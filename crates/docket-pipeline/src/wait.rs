use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Resolves when the token fires; never resolves without one.
pub(crate) async fn cancelled(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Sleep for `delay` unless the token fires first. Returns `true` when cancelled.
pub(crate) async fn pause(delay: Duration, cancel: Option<&CancellationToken>) -> bool {
    if cancel.is_some_and(CancellationToken::is_cancelled) {
        return true;
    }
    tokio::select! {
        () = cancelled(cancel) => true,
        () = tokio::time::sleep(delay) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pause_without_token() {
        assert!(!pause(Duration::ZERO, None).await);
    }

    #[tokio::test]
    async fn test_pause_cancelled_token() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(pause(Duration::from_secs(3600), Some(&token)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_elapses_before_cancel() {
        let token = CancellationToken::new();
        assert!(!pause(Duration::from_secs(2), Some(&token)).await);
    }
}
