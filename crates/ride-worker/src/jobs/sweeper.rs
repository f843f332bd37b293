//! Periodic ride deactivation

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ride_service::{disable_finished_rides, ServiceContext};
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::Shutdown;

/// Marks arrived rides inactive on a fixed interval
pub struct RideSweeper {
    ctx: Arc<ServiceContext>,
    interval: Duration,
}

impl RideSweeper {
    pub fn new(ctx: Arc<ServiceContext>, interval: Duration) -> Self {
        Self { ctx, interval }
    }

    /// Sweep immediately, then once per interval until shutdown
    pub async fn run(self, mut shutdown: Shutdown) {
        info!(interval_secs = self.interval.as_secs(), "Ride sweeper started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep().await,
                changed = shutdown.changed() => {
                    // Sender dropped counts as shutdown too
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Ride sweeper stopped");
    }

    async fn sweep(&self) {
        match disable_finished_rides(&self.ctx, Utc::now()).await {
            Ok(disabled) => info!(disabled, "Ride sweep finished"),
            Err(e) => error!(error = %e, "Ride sweep failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use ride_service::services::testing::TestContext;
    use tokio::sync::watch;

    use super::*;

    #[tokio::test]
    async fn test_sweeps_until_shutdown() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        t.circle("devs", &ana);
        let arrived = t.ride("devs", ana.id, Utc::now() - ChronoDuration::hours(3), 2);
        let upcoming = t.ride("devs", ana.id, Utc::now() + ChronoDuration::hours(3), 2);

        let (tx, rx) = watch::channel(false);
        let sweeper = RideSweeper::new(t.ctx.clone(), Duration::from_millis(10));
        let handle = tokio::spawn(sweeper.run(rx));

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        assert!(!t.ride_by_id(arrived).is_active);
        assert!(t.ride_by_id(upcoming).is_active);
    }
}
