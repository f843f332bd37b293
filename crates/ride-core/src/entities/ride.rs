//! Ride and Rating entities

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// A trip offered inside a circle
#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
    pub id: Snowflake,
    pub offered_by: Snowflake,
    pub offered_in: Snowflake,
    /// Seats still free; decremented as passengers join
    pub available_seats: i32,
    pub comments: String,
    pub departure_location: String,
    pub departure_date: DateTime<Utc>,
    pub arrival_location: String,
    pub arrival_date: DateTime<Utc>,
    /// Average of the ratings passengers emitted
    pub rating: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to offer a ride
#[derive(Debug, Clone)]
pub struct NewRide {
    pub available_seats: i32,
    pub comments: String,
    pub departure_location: String,
    pub departure_date: DateTime<Utc>,
    pub arrival_location: String,
    pub arrival_date: DateTime<Utc>,
}

impl Ride {
    pub fn offer(id: Snowflake, offered_by: Snowflake, offered_in: Snowflake, new: NewRide) -> Self {
        let now = Utc::now();
        Self {
            id,
            offered_by,
            offered_in,
            available_seats: new.available_seats,
            comments: new.comments,
            departure_location: new.departure_location,
            departure_date: new.departure_date,
            arrival_location: new.arrival_location,
            arrival_date: new.arrival_date,
            rating: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        self.departure_date <= now
    }

    #[inline]
    pub fn has_arrived(&self, now: DateTime<Utc>) -> bool {
        self.arrival_date <= now
    }

    pub fn route(&self) -> String {
        format!("{} to {}", self.departure_location, self.arrival_location)
    }
}

/// A passenger's rating of a finished ride
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    pub id: Snowflake,
    pub ride_id: Snowflake,
    pub circle_id: Snowflake,
    pub rating_user: Snowflake,
    pub rated_user: Snowflake,
    pub comments: String,
    /// 1 to 5
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(id: Snowflake, ride: &Ride, rating_user: Snowflake, rating: i32, comments: String) -> Self {
        Self {
            id,
            ride_id: ride.id,
            circle_id: ride.offered_in,
            rating_user,
            rated_user: ride.offered_by,
            comments,
            rating,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ride(departure: DateTime<Utc>) -> Ride {
        Ride::offer(
            Snowflake::new(1),
            Snowflake::new(2),
            Snowflake::new(3),
            NewRide {
                available_seats: 3,
                comments: String::new(),
                departure_location: "Coyoacan".to_string(),
                departure_date: departure,
                arrival_location: "Polanco".to_string(),
                arrival_date: departure + Duration::hours(1),
            },
        )
    }

    #[test]
    fn test_offer_defaults() {
        let r = ride(Utc::now());
        assert!(r.is_active);
        assert!(r.rating.is_none());
        assert_eq!(r.route(), "Coyoacan to Polanco");
    }

    #[test]
    fn test_departure_and_arrival() {
        let now = Utc::now();
        let r = ride(now - Duration::minutes(30));
        assert!(r.has_departed(now));
        assert!(!r.has_arrived(now));
        assert!(r.has_arrived(now + Duration::hours(1)));
    }

    #[test]
    fn test_rating_targets_offerer() {
        let r = ride(Utc::now());
        let rating = Rating::new(Snowflake::new(10), &r, Snowflake::new(5), 4, "ok".to_string());
        assert_eq!(rating.rated_user, r.offered_by);
        assert_eq!(rating.circle_id, r.offered_in);
        assert_eq!(rating.ride_id, r.id);
    }
}
