use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::ratelimit::RateLimiter;

/// Background task that purges expired rate limit windows
pub struct RateLimitCleanupTask {
    rate_limiter: Arc<RateLimiter>,
    shutdown: broadcast::Receiver<()>,
}

impl RateLimitCleanupTask {
    pub fn new(rate_limiter: Arc<RateLimiter>, shutdown: broadcast::Receiver<()>) -> Self {
        Self {
            rate_limiter,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let interval_secs = self.rate_limiter.config().cleanup_interval_seconds.max(1);
        let mut cleanup_timer = tokio::time::interval(Duration::from_secs(interval_secs));

        // Skip immediate first tick
        cleanup_timer.tick().await;

        tracing::info!(cleanup_interval_secs = interval_secs, "Rate limit cleanup task started");

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Rate limit cleanup task received shutdown signal");
                    break;
                }
                _ = cleanup_timer.tick() => {
                    self.rate_limiter.cleanup_stale();
                }
            }
        }

        tracing::info!("Rate limit cleanup task stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::RateLimitConfig;

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()));
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(RateLimitCleanupTask::new(limiter, rx).run());
        tx.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("task should stop")
            .unwrap();
    }
}
