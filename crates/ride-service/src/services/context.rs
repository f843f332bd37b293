//! Service context - dependency container for services
//!
//! Holds the repositories, token signer, id generator and task dispatcher
//! every service borrows from.

use std::sync::Arc;

use ride_common::auth::JwtService;
use ride_core::traits::{
    CircleRepository, InvitationRepository, MembershipRepository, RatingRepository,
    RideRepository, UserRepository,
};
use ride_core::{Snowflake, SnowflakeGenerator};
use ride_queue::TaskDispatcher;

use super::error::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    circle_repo: Arc<dyn CircleRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
    invitation_repo: Arc<dyn InvitationRepository>,
    ride_repo: Arc<dyn RideRepository>,
    rating_repo: Arc<dyn RatingRepository>,

    // Background work
    dispatcher: Arc<dyn TaskDispatcher>,

    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn circle_repo(&self) -> &dyn CircleRepository {
        self.circle_repo.as_ref()
    }

    pub fn membership_repo(&self) -> &dyn MembershipRepository {
        self.membership_repo.as_ref()
    }

    pub fn invitation_repo(&self) -> &dyn InvitationRepository {
        self.invitation_repo.as_ref()
    }

    pub fn ride_repo(&self) -> &dyn RideRepository {
        self.ride_repo.as_ref()
    }

    pub fn rating_repo(&self) -> &dyn RatingRepository {
        self.rating_repo.as_ref()
    }

    // === Services ===

    pub fn dispatcher(&self) -> &dyn TaskDispatcher {
        self.dispatcher.as_ref()
    }

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    circle_repo: Option<Arc<dyn CircleRepository>>,
    membership_repo: Option<Arc<dyn MembershipRepository>>,
    invitation_repo: Option<Arc<dyn InvitationRepository>>,
    ride_repo: Option<Arc<dyn RideRepository>>,
    rating_repo: Option<Arc<dyn RatingRepository>>,
    dispatcher: Option<Arc<dyn TaskDispatcher>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn circle_repo(mut self, repo: Arc<dyn CircleRepository>) -> Self {
        self.circle_repo = Some(repo);
        self
    }

    pub fn membership_repo(mut self, repo: Arc<dyn MembershipRepository>) -> Self {
        self.membership_repo = Some(repo);
        self
    }

    pub fn invitation_repo(mut self, repo: Arc<dyn InvitationRepository>) -> Self {
        self.invitation_repo = Some(repo);
        self
    }

    pub fn ride_repo(mut self, repo: Arc<dyn RideRepository>) -> Self {
        self.ride_repo = Some(repo);
        self
    }

    pub fn rating_repo(mut self, repo: Arc<dyn RatingRepository>) -> Self {
        self.rating_repo = Some(repo);
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<dyn TaskDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// # Errors
    /// Returns `ServiceError::Internal` naming the first missing dependency
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn require<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::internal(format!("{name} is required")))
        }

        Ok(ServiceContext {
            user_repo: require(self.user_repo, "user_repo")?,
            circle_repo: require(self.circle_repo, "circle_repo")?,
            membership_repo: require(self.membership_repo, "membership_repo")?,
            invitation_repo: require(self.invitation_repo, "invitation_repo")?,
            ride_repo: require(self.ride_repo, "ride_repo")?,
            rating_repo: require(self.rating_repo, "rating_repo")?,
            dispatcher: require(self.dispatcher, "dispatcher")?,
            jwt_service: require(self.jwt_service, "jwt_service")?,
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_reports_missing_dependency() {
        let err = ServiceContext::builder().build().unwrap_err();
        assert_eq!(err.to_string(), "Internal error: user_repo is required");
    }
}
