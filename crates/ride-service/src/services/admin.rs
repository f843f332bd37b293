//! Staff-only reporting

use std::collections::HashMap;

use chrono::{Days, NaiveDate, NaiveTime};
use ride_core::Snowflake;
use tracing::{info, instrument};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub const RIDES_CSV_HEADER: [&str; 10] = [
    "id",
    "offered_by",
    "offered_in",
    "departure_location",
    "departure_date",
    "arrival_location",
    "arrival_date",
    "available_seats",
    "rating",
    "is_active",
];

pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Rides departing on `date` (UTC) as CSV, offerer and circle by name
    #[instrument(skip(self))]
    pub async fn export_rides_csv(&self, actor: Snowflake, date: NaiveDate) -> ServiceResult<String> {
        AccessService::new(self.ctx).require_staff(actor).await?;

        let from = date.and_time(NaiveTime::MIN).and_utc();
        let to = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ServiceError::validation("Date is out of range"))?
            .and_time(NaiveTime::MIN)
            .and_utc();
        let rides = self.ctx.ride_repo().list_departing_between(from, to).await?;

        let mut usernames: HashMap<Snowflake, String> = HashMap::new();
        let mut slugs: HashMap<Snowflake, String> = HashMap::new();

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(RIDES_CSV_HEADER).map_err(csv_error)?;

        for ride in &rides {
            if !usernames.contains_key(&ride.offered_by) {
                let name = self
                    .ctx
                    .user_repo()
                    .find_by_id(ride.offered_by)
                    .await?
                    .map_or_else(|| ride.offered_by.to_string(), |u| u.username);
                usernames.insert(ride.offered_by, name);
            }
            if !slugs.contains_key(&ride.offered_in) {
                let slug = self
                    .ctx
                    .circle_repo()
                    .find_by_id(ride.offered_in)
                    .await?
                    .map_or_else(|| ride.offered_in.to_string(), |c| c.slug_name);
                slugs.insert(ride.offered_in, slug);
            }

            writer
                .write_record([
                    ride.id.to_string(),
                    usernames[&ride.offered_by].clone(),
                    slugs[&ride.offered_in].clone(),
                    ride.departure_location.clone(),
                    ride.departure_date.to_rfc3339(),
                    ride.arrival_location.clone(),
                    ride.arrival_date.to_rfc3339(),
                    ride.available_seats.to_string(),
                    ride.rating.map(|r| format!("{r:.2}")).unwrap_or_default(),
                    ride.is_active.to_string(),
                ])
                .map_err(csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ServiceError::internal(format!("CSV flush failed: {e}")))?;

        info!(actor = %actor, %date, rows = rides.len(), "Rides exported");
        String::from_utf8(bytes).map_err(|e| ServiceError::internal(e.to_string()))
    }
}

fn csv_error(err: csv::Error) -> ServiceError {
    ServiceError::internal(format!("CSV write failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    use crate::services::testing::TestContext;

    #[tokio::test]
    async fn test_export_is_staff_only() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        let err = AdminService::new(&t.ctx)
            .export_rides_csv(ana.id, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_export_rides_for_day() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        let staff = t.staff("admin_1");
        t.circle("devs", &ana);

        let day = Utc.with_ymd_and_hms(2030, 3, 14, 8, 30, 0).unwrap();
        t.ride("devs", ana.id, day, 3);
        t.ride("devs", ana.id, day + Duration::hours(14), 2);
        t.ride("devs", ana.id, day + Duration::days(1), 4);

        let csv = AdminService::new(&t.ctx)
            .export_rides_csv(staff.id, NaiveDate::from_ymd_opt(2030, 3, 14).unwrap())
            .await
            .unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers: Vec<_> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, RIDES_CSV_HEADER);

        let rows: Vec<_> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "ana_p");
        assert_eq!(&rows[0][2], "devs");
        assert_eq!(&rows[0][7], "3");
        assert_eq!(&rows[0][8], "");
        assert_eq!(&rows[0][9], "true");
    }
}
