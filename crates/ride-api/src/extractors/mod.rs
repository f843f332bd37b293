//! Axum extractors for request handling

mod auth;
mod path;
mod validated;

pub use auth::AuthUser;
pub use path::{ApiPath, CirclePath, CircleRidePath, MemberPath, UsernamePath};
pub use validated::{ValidatedJson, ValidatedQuery};
