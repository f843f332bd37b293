//! Ride <- model mapper

use ride_core::entities::Ride;
use ride_core::value_objects::Snowflake;

use crate::models::RideModel;

impl From<RideModel> for Ride {
    fn from(model: RideModel) -> Self {
        Ride {
            id: Snowflake::new(model.id),
            offered_by: Snowflake::new(model.offered_by),
            offered_in: Snowflake::new(model.offered_in),
            available_seats: model.available_seats,
            comments: model.comments,
            departure_location: model.departure_location,
            departure_date: model.departure_date,
            arrival_location: model.arrival_location,
            arrival_date: model.arrival_date,
            rating: model.rating,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
