// SPDX-License-Identifier: MIT
//! Conflict retry with exponential backoff.
//!
//! A mutation is a fetch-modify-write closure; when `save` reports a version
//! conflict the whole closure re-runs, which re-fetches the document and
//! reapplies the change against the new revision. Only
//! [`ForumError::Conflict`] is retried — transport faults, validation errors,
//! and missing targets propagate immediately.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ForumError, Result};

/// Configuration for [`retry_on_conflict`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first try).
    ///
    /// Default: 3
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled (capped) on each retry.
    ///
    /// Default: 200 ms
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    ///
    /// Default: 5 s
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Config suitable for quick unit tests (no real waiting).
    pub fn instant() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    /// No retries at all: surface the first conflict to the caller.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::instant()
        }
    }
}

/// Run `op`, re-running it with backoff while it fails with a version
/// conflict. Returns the last conflict once attempts are exhausted.
pub async fn retry_on_conflict<T, F, Fut>(cfg: &RetryConfig, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut delay = cfg.initial_delay;
    let max_attempts = cfg.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(ForumError::Conflict) if attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    "version conflict — reloading and reapplying in {delay:?}"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(cfg.max_delay);
            }
            Err(e) => {
                if matches!(e, ForumError::Conflict) {
                    debug!(attempts = max_attempts, "conflict retries exhausted");
                }
                return Err(e);
            }
        }
    }

    // max_attempts >= 1, so the loop always returns.
    unreachable!("retry loop exited without a result")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let cfg = RetryConfig::instant();
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let result = retry_on_conflict(&cfg, || {
            let c = calls2.clone();
            async move {
                c.fetch_add(1, Ordering::Relaxed);
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn retries_conflicts_until_success() {
        let cfg = RetryConfig::instant();
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let result = retry_on_conflict(&cfg, || {
            let c = calls2.clone();
            async move {
                if c.fetch_add(1, Ordering::Relaxed) < 2 {
                    Err(ForumError::Conflict)
                } else {
                    Ok("written")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "written");
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn surfaces_conflict_after_exhaustion() {
        let cfg = RetryConfig::instant();
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let result: Result<()> = retry_on_conflict(&cfg, || {
            let c = calls2.clone();
            async move {
                c.fetch_add(1, Ordering::Relaxed);
                Err(ForumError::Conflict)
            }
        })
        .await;

        assert!(matches!(result.unwrap_err(), ForumError::Conflict));
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let cfg = RetryConfig::instant();
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let result: Result<()> = retry_on_conflict(&cfg, || {
            let c = calls2.clone();
            async move {
                c.fetch_add(1, Ordering::Relaxed);
                Err(ForumError::NotFound { id: "X".into() })
            }
        })
        .await;

        assert!(matches!(result.unwrap_err(), ForumError::NotFound { .. }));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }
}
