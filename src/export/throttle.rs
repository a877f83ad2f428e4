use std::{future::Future, num::NonZeroU32, time::Duration};

use governor::{
    Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::direct::NotKeyed,
};
use tracing::warn;

use crate::error::{Error, Result};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Paces calls to a rate-limited API.
///
/// Every call waits for a permit from a token bucket. A call that still comes
/// back with [`Error::RateLimited`] is retried after the advertised delay
/// (capped at `max_backoff`), at most `max_retries` times.
pub struct Throttle {
    limiter: DirectRateLimiter,
    max_retries: u32,
    max_backoff: Duration,
}

impl Throttle {
    pub fn new(requests_per_second: NonZeroU32, max_retries: u32, max_backoff: Duration) -> Self {
        Throttle {
            limiter: RateLimiter::direct(Quota::per_second(requests_per_second)),
            max_retries,
            max_backoff,
        }
    }

    pub async fn call<T, F, Fut>(&self, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            self.limiter.until_ready().await;

            match call().await {
                Err(Error::RateLimited { retry_after_secs }) if attempt < self.max_retries => {
                    attempt += 1;
                    let wait = Duration::from_secs(retry_after_secs).min(self.max_backoff);
                    warn!(
                        attempt,
                        wait_secs = wait.as_secs(),
                        "Rate limited by upstream, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn throttle(max_retries: u32) -> Throttle {
        Throttle::new(
            NonZeroU32::new(1000).unwrap(),
            max_retries,
            Duration::from_secs(60),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_after_rate_limit() {
        let calls = AtomicU32::new(0);
        let result = throttle(2)
            .call(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Error::RateLimited {
                        retry_after_secs: 5,
                    })
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = throttle(1)
            .call(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::RateLimited {
                    retry_after_secs: 1,
                })
            })
            .await;

        assert!(matches!(result, Err(Error::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = throttle(3)
            .call(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Upstream {
                    status: 500,
                    body: "boom".into(),
                })
            })
            .await;

        assert!(matches!(result, Err(Error::Upstream { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
