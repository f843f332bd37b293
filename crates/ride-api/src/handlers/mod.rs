//! Route handlers, one module per resource

pub mod admin;
pub mod circles;
pub mod health;
pub mod members;
pub mod rides;
pub mod users;
