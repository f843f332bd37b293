//! Model -> entity conversions

mod circle;
mod membership;
mod ride;
mod user;
