//! PostgreSQL implementations of RideRepository and RatingRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use ride_core::entities::{Rating, Ride, User};
use ride_core::error::DomainError;
use ride_core::traits::{RatingRepository, RepoResult, RideRepository};
use ride_core::value_objects::Snowflake;

use crate::models::{RideModel, UserModel};

use super::error::{map_db_error, map_unique_violation};

const RIDE_COLUMNS: &str = "id, offered_by, offered_in, available_seats, comments, \
                            departure_location, departure_date, arrival_location, arrival_date, \
                            rating, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct PgRideRepository {
    pool: PgPool,
}

impl PgRideRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RideRepository for PgRideRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Ride>> {
        let sql = format!("SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1");
        let result = sqlx::query_as::<_, RideModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Ride::from))
    }

    #[instrument(skip(self))]
    async fn list_available(
        &self,
        circle_id: Snowflake,
        departs_after: DateTime<Utc>,
    ) -> RepoResult<Vec<Ride>> {
        let sql = format!(
            r"
            SELECT {RIDE_COLUMNS}
            FROM rides
            WHERE offered_in = $1 AND is_active AND available_seats >= 1 AND departure_date >= $2
            ORDER BY departure_date, id
            "
        );
        let rows = sqlx::query_as::<_, RideModel>(&sql)
            .bind(circle_id.into_inner())
            .bind(departs_after)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Ride::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_passengers(&self, ride_id: Snowflake) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserModel>(
            r"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.phone_number,
                   u.is_client, u.is_verified, u.is_staff, u.created_at, u.updated_at
            FROM ride_passengers rp
            INNER JOIN users u ON u.id = rp.user_id
            WHERE rp.ride_id = $1
            ORDER BY rp.joined_at
            ",
        )
        .bind(ride_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    async fn is_passenger(&self, ride_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM ride_passengers WHERE ride_id = $1 AND user_id = $2)",
        )
        .bind(ride_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, ride), fields(ride_id = %ride.id, circle_id = %ride.offered_in))]
    async fn create_offer(&self, ride: &Ride, membership_id: Snowflake) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO rides (id, offered_by, offered_in, available_seats, comments,
                               departure_location, departure_date, arrival_location, arrival_date,
                               rating, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(ride.id.into_inner())
        .bind(ride.offered_by.into_inner())
        .bind(ride.offered_in.into_inner())
        .bind(ride.available_seats)
        .bind(&ride.comments)
        .bind(&ride.departure_location)
        .bind(ride.departure_date)
        .bind(&ride.arrival_location)
        .bind(ride.arrival_date)
        .bind(ride.rating)
        .bind(ride.is_active)
        .bind(ride.created_at)
        .bind(ride.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query("UPDATE circles SET rides_offered = rides_offered + 1 WHERE id = $1")
            .bind(ride.offered_in.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query("UPDATE memberships SET rides_offered = rides_offered + 1 WHERE id = $1")
            .bind(membership_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query("UPDATE profiles SET rides_offered = rides_offered + 1 WHERE user_id = $1")
            .bind(ride.offered_by.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, ride), fields(ride_id = %ride.id))]
    async fn update(&self, ride: &Ride) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE rides
            SET available_seats = $2, comments = $3, departure_location = $4, departure_date = $5,
                arrival_location = $6, arrival_date = $7, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(ride.id.into_inner())
        .bind(ride.available_seats)
        .bind(&ride.comments)
        .bind(&ride.departure_location)
        .bind(ride.departure_date)
        .bind(&ride.arrival_location)
        .bind(ride.arrival_date)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::RideNotFound(ride.id));
        }
        Ok(())
    }

    #[instrument(skip(self, ride), fields(ride_id = %ride.id))]
    async fn add_passenger(
        &self,
        ride: &Ride,
        user_id: Snowflake,
        membership_id: Snowflake,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let seat = sqlx::query(
            r"
            UPDATE rides
            SET available_seats = available_seats - 1, updated_at = NOW()
            WHERE id = $1 AND is_active AND available_seats > 0
            ",
        )
        .bind(ride.id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if seat.rows_affected() == 0 {
            return Err(DomainError::RideFull);
        }

        sqlx::query("INSERT INTO ride_passengers (ride_id, user_id) VALUES ($1, $2)")
            .bind(ride.id.into_inner())
            .bind(user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, |_| DomainError::AlreadyPassenger))?;

        sqlx::query("UPDATE profiles SET rides_taken = rides_taken + 1 WHERE user_id = $1")
            .bind(user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query("UPDATE memberships SET rides_taken = rides_taken + 1 WHERE id = $1")
            .bind(membership_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query("UPDATE circles SET rides_taken = rides_taken + 1 WHERE id = $1")
            .bind(ride.offered_in.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn finish(&self, ride_id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("UPDATE rides SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(ride_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::RideNotFound(ride_id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn disable_finished(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE rides SET is_active = FALSE, updated_at = NOW() WHERE is_active AND arrival_date <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn list_departing_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Ride>> {
        let sql = format!(
            r"
            SELECT {RIDE_COLUMNS}
            FROM rides
            WHERE departure_date >= $1 AND departure_date < $2
            ORDER BY departure_date, id
            "
        );
        let rows = sqlx::query_as::<_, RideModel>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Ride::from).collect())
    }
}

#[derive(Clone)]
pub struct PgRatingRepository {
    pool: PgPool,
}

impl PgRatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for PgRatingRepository {
    #[instrument(skip(self))]
    async fn exists(&self, ride_id: Snowflake, rating_user: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM ratings WHERE ride_id = $1 AND rating_user = $2)",
        )
        .bind(ride_id.into_inner())
        .bind(rating_user.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, rating), fields(ride_id = %rating.ride_id))]
    async fn create_and_refresh(&self, rating: &Rating) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO ratings (id, ride_id, circle_id, rating_user, rated_user, comments, rating, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(rating.id.into_inner())
        .bind(rating.ride_id.into_inner())
        .bind(rating.circle_id.into_inner())
        .bind(rating.rating_user.into_inner())
        .bind(rating.rated_user.into_inner())
        .bind(&rating.comments)
        .bind(rating.rating)
        .bind(rating.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, |_| DomainError::AlreadyRated))?;

        sqlx::query(
            r"
            UPDATE rides
            SET rating = (SELECT AVG(rating)::DOUBLE PRECISION FROM ratings WHERE ride_id = $1)
            WHERE id = $1
            ",
        )
        .bind(rating.ride_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            UPDATE profiles
            SET reputation = (SELECT AVG(rating)::DOUBLE PRECISION FROM ratings WHERE rated_user = $1),
                updated_at = NOW()
            WHERE user_id = $1
            ",
        )
        .bind(rating.rated_user.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repos_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgRideRepository>();
        assert_send_sync::<PgRatingRepository>();
    }
}
