//! Business rules shared by the services.
//!
//! Everything here is pure: callers pass the current time and the rows
//! they loaded, and get back a [`DomainError`](crate::DomainError) carrying
//! the message shown to the user.

mod circles;
mod rides;

pub use circles::{
    check_can_join, check_can_remove, check_circle_capacity, invitations_to_issue, require_active,
};
pub use rides::{
    check_rating_value, check_ride_editable, check_ride_finishable, check_ride_joinable,
    check_ride_ratable, departure_window, validate_new_ride, MAX_RATING, MAX_SEATS, MIN_RATING,
    MIN_SEATS,
};
