//! Ride service
//!
//! Offering, listing, joining, finishing and rating rides inside a circle.

use chrono::Utc;
use ride_core::entities::{NewRide, Rating, Ride};
use ride_core::rules::{
    check_rating_value, check_ride_editable, check_ride_finishable, check_ride_joinable,
    check_ride_ratable, departure_window, validate_new_ride,
};
use ride_core::{Circle, DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{
    CreateRideRequest, RateRideRequest, RatingResponse, RideDetailResponse, RideResponse,
    UpdateRideRequest,
};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct RideService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RideService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Rides still open for booking, soonest first
    #[instrument(skip(self))]
    pub async fn list(&self, actor: Snowflake, slug_name: &str) -> ServiceResult<Vec<RideResponse>> {
        let (circle, _) = AccessService::new(self.ctx).member_of(slug_name, actor).await?;
        let departs_after = Utc::now() + departure_window();
        let rides = self
            .ctx
            .ride_repo()
            .list_available(circle.id, departs_after)
            .await?;
        Ok(rides.into_iter().map(RideResponse::from).collect())
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        actor: Snowflake,
        slug_name: &str,
        request: CreateRideRequest,
    ) -> ServiceResult<RideResponse> {
        if request.offered_by.is_some_and(|id| id != actor) {
            return Err(ServiceError::validation(
                "Rides offered on behalf of others are not allowed.",
            ));
        }

        let (circle, membership) = AccessService::new(self.ctx).member_of(slug_name, actor).await?;
        validate_new_ride(
            request.departure_date,
            request.arrival_date,
            request.available_seats,
            Utc::now(),
        )?;

        let ride = Ride::offer(
            self.ctx.generate_id(),
            actor,
            circle.id,
            NewRide {
                available_seats: request.available_seats,
                comments: request.comments,
                departure_location: request.departure_location,
                departure_date: request.departure_date,
                arrival_location: request.arrival_location,
                arrival_date: request.arrival_date,
            },
        );
        self.ctx.ride_repo().create_offer(&ride, membership.id).await?;

        info!(ride_id = %ride.id, circle_id = %circle.id, offered_by = %actor, "Ride offered");
        Ok(RideResponse::from(ride))
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        actor: Snowflake,
        slug_name: &str,
        ride_id: Snowflake,
    ) -> ServiceResult<RideDetailResponse> {
        let (circle, _) = AccessService::new(self.ctx).member_of(slug_name, actor).await?;
        let ride = self.find_in(&circle, ride_id).await?;
        let passengers = self.ctx.ride_repo().list_passengers(ride.id).await?;
        Ok(RideDetailResponse::new(&ride, &passengers))
    }

    /// Edit a ride that has not departed yet. Offerer only.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor: Snowflake,
        slug_name: &str,
        ride_id: Snowflake,
        request: UpdateRideRequest,
    ) -> ServiceResult<RideResponse> {
        let (circle, _) = AccessService::new(self.ctx).member_of(slug_name, actor).await?;
        let mut ride = self.find_in(&circle, ride_id).await?;
        require_offerer(&ride, actor)?;

        let now = Utc::now();
        check_ride_editable(&ride, now)?;

        let reschedule = request.departure_date.is_some() || request.arrival_date.is_some();
        if let Some(seats) = request.available_seats {
            ride.available_seats = seats;
        }
        if let Some(comments) = request.comments {
            ride.comments = comments;
        }
        if let Some(location) = request.departure_location {
            ride.departure_location = location;
        }
        if let Some(location) = request.arrival_location {
            ride.arrival_location = location;
        }
        if let Some(date) = request.departure_date {
            ride.departure_date = date;
        }
        if let Some(date) = request.arrival_date {
            ride.arrival_date = date;
        }
        if reschedule {
            validate_new_ride(ride.departure_date, ride.arrival_date, ride.available_seats, now)?;
        }
        ride.updated_at = now;

        self.ctx.ride_repo().update(&ride).await?;

        info!(ride_id = %ride.id, "Ride updated");
        Ok(RideResponse::from(ride))
    }

    /// Take a seat on a ride
    #[instrument(skip(self))]
    pub async fn join(
        &self,
        actor: Snowflake,
        slug_name: &str,
        ride_id: Snowflake,
    ) -> ServiceResult<RideResponse> {
        let (circle, membership) = AccessService::new(self.ctx).member_of(slug_name, actor).await?;
        let ride = self.find_in(&circle, ride_id).await?;

        let rides = self.ctx.ride_repo();
        let already_passenger = rides.is_passenger(ride.id, actor).await?;
        check_ride_joinable(&ride, already_passenger, Utc::now())?;

        rides.add_passenger(&ride, actor, membership.id).await?;

        info!(ride_id = %ride.id, passenger = %actor, "Passenger joined ride");
        let ride = self.find_in(&circle, ride_id).await?;
        Ok(RideResponse::from(ride))
    }

    /// Close a ride after departure. Offerer only.
    #[instrument(skip(self))]
    pub async fn finish(
        &self,
        actor: Snowflake,
        slug_name: &str,
        ride_id: Snowflake,
    ) -> ServiceResult<RideResponse> {
        let (circle, _) = AccessService::new(self.ctx).member_of(slug_name, actor).await?;
        let mut ride = self.find_in(&circle, ride_id).await?;
        require_offerer(&ride, actor)?;
        check_ride_finishable(&ride, Utc::now())?;

        self.ctx.ride_repo().finish(ride.id).await?;
        ride.is_active = false;

        info!(ride_id = %ride.id, "Ride finished");
        Ok(RideResponse::from(ride))
    }

    /// Rate a finished ride as one of its passengers
    #[instrument(skip(self, request))]
    pub async fn rate(
        &self,
        actor: Snowflake,
        slug_name: &str,
        ride_id: Snowflake,
        request: RateRideRequest,
    ) -> ServiceResult<RatingResponse> {
        let (circle, _) = AccessService::new(self.ctx).member_of(slug_name, actor).await?;
        let ride = self.find_in(&circle, ride_id).await?;

        let is_passenger = self.ctx.ride_repo().is_passenger(ride.id, actor).await?;
        let already_rated = self.ctx.rating_repo().exists(ride.id, actor).await?;
        check_ride_ratable(&ride, is_passenger, already_rated)?;
        check_rating_value(request.rating)?;

        let rating = Rating::new(
            self.ctx.generate_id(),
            &ride,
            actor,
            request.rating,
            request.comments,
        );
        self.ctx.rating_repo().create_and_refresh(&rating).await?;

        info!(ride_id = %ride.id, rating = rating.rating, "Ride rated");
        Ok(RatingResponse::from(&rating))
    }

    /// The ride, provided it was offered in `circle`
    async fn find_in(&self, circle: &Circle, ride_id: Snowflake) -> ServiceResult<Ride> {
        self.ctx
            .ride_repo()
            .find_by_id(ride_id)
            .await?
            .filter(|ride| ride.offered_in == circle.id)
            .ok_or_else(|| DomainError::RideNotFound(ride_id).into())
    }
}

fn require_offerer(ride: &Ride, actor: Snowflake) -> ServiceResult<()> {
    if ride.offered_by == actor {
        Ok(())
    } else {
        Err(DomainError::Forbidden(
            "You do not have permission to perform this action.".to_string(),
        )
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};

    use crate::services::testing::TestContext;

    fn request(departure: DateTime<Utc>, seats: i32) -> CreateRideRequest {
        CreateRideRequest {
            offered_by: None,
            available_seats: seats,
            comments: String::new(),
            departure_location: "Ciudad Universitaria".to_string(),
            departure_date: departure,
            arrival_location: "Polanco".to_string(),
            arrival_date: departure + Duration::hours(1),
        }
    }

    fn ride_id(response: &RideResponse) -> Snowflake {
        response.id.parse().unwrap()
    }

    #[tokio::test]
    async fn test_create_rules() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        let bob = t.user("bob_q");
        let outsider = t.user("out_1");
        t.circle("devs", &ana);
        t.join("devs", bob.id);
        let rides = RideService::new(&t.ctx);
        let departure = Utc::now() + Duration::hours(2);

        let on_behalf = CreateRideRequest {
            offered_by: Some(bob.id),
            ..request(departure, 3)
        };
        let err = rides.create(ana.id, "devs", on_behalf).await.unwrap_err();
        assert_eq!(err.to_string(), "Rides offered on behalf of others are not allowed.");

        let err = rides
            .create(outsider.id, "devs", request(departure, 3))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User is not an active member of the circle.");

        let err = rides
            .create(ana.id, "devs", request(Utc::now() + Duration::minutes(5), 3))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let created = rides
            .create(ana.id, "devs", request(departure, 3))
            .await
            .unwrap();
        assert_eq!(created.offered_by, ana.id.to_string());
        assert_eq!(t.membership_of("devs", ana.id).unwrap().rides_offered, 1);
        assert_eq!(t.profile_of(ana.id).rides_offered, 1);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        t.circle("devs", &ana);
        let rides = RideService::new(&t.ctx);
        let now = Utc::now();

        let later = rides
            .create(ana.id, "devs", request(now + Duration::hours(5), 2))
            .await
            .unwrap();
        let sooner = rides
            .create(ana.id, "devs", request(now + Duration::hours(1), 2))
            .await
            .unwrap();
        let full = rides
            .create(ana.id, "devs", request(now + Duration::hours(3), 1))
            .await
            .unwrap();
        t.set_seats(ride_id(&full), 0);

        let listed: Vec<_> = rides
            .list(ana.id, "devs")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, vec![sooner.id, later.id]);
    }

    #[tokio::test]
    async fn test_join_ride() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        let bob = t.user("bob_q");
        let carol = t.user("carol_r");
        t.circle("devs", &ana);
        t.join("devs", bob.id);
        t.join("devs", carol.id);
        let rides = RideService::new(&t.ctx);

        let offered = rides
            .create(ana.id, "devs", request(Utc::now() + Duration::hours(2), 1))
            .await
            .unwrap();
        let id = ride_id(&offered);

        let joined = rides.join(bob.id, "devs", id).await.unwrap();
        assert_eq!(joined.available_seats, 0);
        assert_eq!(t.membership_of("devs", bob.id).unwrap().rides_taken, 1);
        assert_eq!(t.profile_of(bob.id).rides_taken, 1);

        let err = rides.join(carol.id, "devs", id).await.unwrap_err();
        assert_eq!(err.to_string(), "Ride is already full!");

        let detail = rides.get(ana.id, "devs", id).await.unwrap();
        assert_eq!(detail.passengers.len(), 1);
        assert_eq!(detail.passengers[0].username, "bob_q");
    }

    #[tokio::test]
    async fn test_ride_from_other_circle_is_not_found() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        t.circle("devs", &ana);
        t.circle("ops", &ana);
        let rides = RideService::new(&t.ctx);

        let offered = rides
            .create(ana.id, "devs", request(Utc::now() + Duration::hours(2), 2))
            .await
            .unwrap();
        let err = rides.get(ana.id, "ops", ride_id(&offered)).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_update_only_offerer_before_departure() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        let bob = t.user("bob_q");
        t.circle("devs", &ana);
        t.join("devs", bob.id);
        let rides = RideService::new(&t.ctx);

        let offered = rides
            .create(ana.id, "devs", request(Utc::now() + Duration::hours(2), 2))
            .await
            .unwrap();
        let id = ride_id(&offered);
        let change = UpdateRideRequest {
            comments: Some("Leaving from gate 3".to_string()),
            ..Default::default()
        };

        let err = rides.update(bob.id, "devs", id, change.clone()).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let updated = rides.update(ana.id, "devs", id, change.clone()).await.unwrap();
        assert_eq!(updated.comments, "Leaving from gate 3");

        t.shift_ride(id, -Duration::hours(3));
        let err = rides.update(ana.id, "devs", id, change).await.unwrap_err();
        assert_eq!(err.to_string(), "Ongoing rides cannot be modified.");
    }

    #[tokio::test]
    async fn test_finish_and_rate() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        let bob = t.user("bob_q");
        let carol = t.user("carol_r");
        t.circle("devs", &ana);
        t.join("devs", bob.id);
        t.join("devs", carol.id);
        let rides = RideService::new(&t.ctx);

        let offered = rides
            .create(ana.id, "devs", request(Utc::now() + Duration::hours(2), 3))
            .await
            .unwrap();
        let id = ride_id(&offered);
        rides.join(bob.id, "devs", id).await.unwrap();
        rides.join(carol.id, "devs", id).await.unwrap();

        let rate = |rating| RateRideRequest {
            rating,
            comments: String::new(),
        };

        let err = rides.finish(ana.id, "devs", id).await.unwrap_err();
        assert_eq!(err.to_string(), "Ride has not started yet");

        let err = rides.rate(bob.id, "devs", id, rate(5)).await.unwrap_err();
        assert_eq!(err.to_string(), "Trip is still in progress");

        t.shift_ride(id, -Duration::hours(3));
        assert_eq!(
            rides.finish(bob.id, "devs", id).await.unwrap_err().status_code(),
            403
        );
        let finished = rides.finish(ana.id, "devs", id).await.unwrap();
        assert!(!finished.is_active);

        let err = rides.rate(ana.id, "devs", id, rate(5)).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let rating = rides.rate(bob.id, "devs", id, rate(5)).await.unwrap();
        assert_eq!(rating.rated_user, ana.id.to_string());
        rides.rate(carol.id, "devs", id, rate(2)).await.unwrap();

        let err = rides.rate(bob.id, "devs", id, rate(4)).await.unwrap_err();
        assert_eq!(err.to_string(), "Rating have already been emitted!");

        let detail = rides.get(ana.id, "devs", id).await.unwrap();
        assert!((detail.ride.rating.unwrap() - 3.5).abs() < 1e-9);
        assert!((t.profile_of(ana.id).reputation - 3.5).abs() < 1e-9);
    }
}
