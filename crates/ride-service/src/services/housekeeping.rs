//! Periodic maintenance

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Deactivate every active ride that has already arrived
#[instrument(skip(ctx))]
pub async fn disable_finished_rides(ctx: &ServiceContext, now: DateTime<Utc>) -> ServiceResult<u64> {
    let disabled = ctx.ride_repo().disable_finished(now).await?;
    if disabled > 0 {
        info!(disabled, "Finished rides disabled");
    } else {
        debug!("No finished rides to disable");
    }
    Ok(disabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::services::testing::TestContext;

    #[tokio::test]
    async fn test_disables_only_arrived_rides() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        t.circle("devs", &ana);

        let now = Utc::now();
        let arrived = t.ride("devs", ana.id, now - Duration::hours(3), 2);
        let en_route = t.ride("devs", ana.id, now - Duration::minutes(30), 2);
        let upcoming = t.ride("devs", ana.id, now + Duration::hours(1), 2);

        assert_eq!(disable_finished_rides(&t.ctx, now).await.unwrap(), 1);
        assert!(!t.ride_by_id(arrived).is_active);
        assert!(t.ride_by_id(en_route).is_active);
        assert!(t.ride_by_id(upcoming).is_active);

        assert_eq!(disable_finished_rides(&t.ctx, now).await.unwrap(), 0);
    }
}
