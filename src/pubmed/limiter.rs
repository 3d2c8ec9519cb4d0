use std::num::NonZeroU32;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// Spaces successive calls to [`RateLimiter::wait`] at least `1/rate` apart.
///
/// Owned by a single client and driven by one sequential caller; there is no
/// waiter queue.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_wait: Option<Instant>,
}

impl RateLimiter {
    pub fn per_second(rate: NonZeroU32) -> Self {
        Self {
            min_interval: Duration::from_secs(1) / rate.get(),
            last_wait: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Sleeps until `min_interval` has passed since the previous call.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_wait {
            let ready_at = last + self.min_interval;
            if Instant::now() < ready_at {
                debug!(
                    delay_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "rate limit sleep"
                );
                sleep_until(ready_at).await;
            }
        }
        self.last_wait = Some(Instant::now());
    }
}
