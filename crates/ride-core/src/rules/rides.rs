//! Ride lifecycle checks

use chrono::{DateTime, Duration, Utc};

use crate::entities::Ride;
use crate::error::DomainError;

pub const MIN_SEATS: i32 = 1;
pub const MAX_SEATS: i32 = 15;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// How far ahead a new ride must depart
pub fn departure_window() -> Duration {
    Duration::minutes(10)
}

/// Checks for a ride about to be offered
pub fn validate_new_ride(
    departure_date: DateTime<Utc>,
    arrival_date: DateTime<Utc>,
    available_seats: i32,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    if !(MIN_SEATS..=MAX_SEATS).contains(&available_seats) {
        return Err(DomainError::Validation(format!(
            "Available seats must be between {MIN_SEATS} and {MAX_SEATS}."
        )));
    }
    if departure_date < now + departure_window() {
        return Err(DomainError::Validation(
            "Departure time must be at least past the next 10 minutes window.".to_string(),
        ));
    }
    if arrival_date <= departure_date {
        return Err(DomainError::Validation(
            "Departure date must happen after arrival date.".to_string(),
        ));
    }
    Ok(())
}

/// Rides are frozen once they depart
pub fn check_ride_editable(ride: &Ride, now: DateTime<Utc>) -> Result<(), DomainError> {
    if ride.has_departed(now) {
        return Err(DomainError::RideNotEditable);
    }
    Ok(())
}

pub fn check_ride_joinable(
    ride: &Ride,
    already_passenger: bool,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    if !ride.is_active || ride.has_departed(now) {
        return Err(DomainError::RideDeparted);
    }
    if ride.available_seats < 1 {
        return Err(DomainError::RideFull);
    }
    if already_passenger {
        return Err(DomainError::AlreadyPassenger);
    }
    Ok(())
}

pub fn check_ride_finishable(ride: &Ride, now: DateTime<Utc>) -> Result<(), DomainError> {
    if !ride.has_departed(now) {
        return Err(DomainError::RideNotStarted);
    }
    Ok(())
}

pub fn check_ride_ratable(
    ride: &Ride,
    is_passenger: bool,
    already_rated: bool,
) -> Result<(), DomainError> {
    if !is_passenger {
        return Err(DomainError::Forbidden("Not allowed to rate this ride".to_string()));
    }
    if ride.is_active {
        return Err(DomainError::RideInProgress);
    }
    if already_rated {
        return Err(DomainError::AlreadyRated);
    }
    Ok(())
}

pub fn check_rating_value(rating: i32) -> Result<(), DomainError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}."
        )))
    }
}
