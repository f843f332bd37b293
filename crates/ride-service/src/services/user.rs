//! User service
//!
//! Signup, login, email verification and account/profile management.

use ride_common::auth::{hash_password, validate_password_strength, verify_password};
use ride_common::AppError;
use ride_core::entities::{Profile, User};
use ride_core::{DomainError, Snowflake};
use ride_queue::Task;
use tracing::{info, instrument, warn};

use crate::dto::{
    CircleResponse, LoginRequest, LoginResponse, MessageResponse, SignupRequest,
    UpdateProfileRequest, UpdateUserRequest, UserDetailResponse, UserResponse,
    UserWithProfileResponse, VerifyAccountRequest,
};

use super::access::require_self;
use super::context::ServiceContext;
use super::email::{confirmation_email, OutgoingEmail};
use super::error::{ServiceError, ServiceResult};

pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an unverified account and queue the confirmation email
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<UserResponse> {
        if request.password != request.password_confirmation {
            return Err(ServiceError::validation("Passwords dont match."));
        }
        validate_password_strength(&request.password, &request.username)?;

        let repo = self.ctx.user_repo();
        if repo.email_exists(&request.email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }
        if repo.username_exists(&request.username).await? {
            return Err(DomainError::UsernameAlreadyExists.into());
        }

        let password_hash = hash_password(&request.password)?;

        let user_id = self.ctx.generate_id();
        let user = User::new(
            user_id,
            request.email,
            request.username,
            request.first_name,
            request.last_name,
        )
        .with_phone_number(Some(request.phone_number));

        repo.create(&user, &Profile::new(user_id), &password_hash)
            .await?;

        info!(user_id = %user_id, "User signed up");

        // Enqueue failures do not fail the signup
        if let Err(e) = self
            .ctx
            .dispatcher()
            .dispatch(Task::SendConfirmationEmail { user_id })
            .await
        {
            warn!(user_id = %user_id, error = %e, "Failed to enqueue confirmation email");
        }

        Ok(UserResponse::from(user))
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let repo = self.ctx.user_repo();

        let user = repo.find_by_email(&request.email).await?.ok_or_else(|| {
            warn!("Login failed: unknown email");
            ServiceError::App(AppError::InvalidCredentials)
        })?;

        let password_hash = repo
            .get_password_hash(user.id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidCredentials))?;

        if !verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(ServiceError::App(AppError::InvalidCredentials));
        }

        if !user.is_verified {
            return Err(ServiceError::App(AppError::AccountNotVerified));
        }

        let token = self
            .ctx
            .jwt_service()
            .generate_access_token(user.id, &user.username)?;

        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            user: UserResponse::from(user),
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
        })
    }

    /// Verifying twice is harmless
    #[instrument(skip(self, request))]
    pub async fn verify(&self, request: VerifyAccountRequest) -> ServiceResult<MessageResponse> {
        let username = self
            .ctx
            .jwt_service()
            .validate_verification_token(&request.token)?;

        // Tokens for deleted accounts are invalid
        if self.ctx.user_repo().find_by_username(&username).await?.is_none() {
            return Err(ServiceError::validation("Invalid token."));
        }
        self.ctx.user_repo().set_verified(&username).await?;

        info!(username = %username, "Account verified");
        Ok(MessageResponse::new(
            "Congratulations, now go comparte some rides!",
        ))
    }

    /// Public account detail with profile and active circles
    #[instrument(skip(self))]
    pub async fn get_user(&self, username: &str) -> ServiceResult<UserDetailResponse> {
        let user = self.find_by_username(username).await?;
        let profile = self.profile(&user).await?;
        let circles = self.ctx.circle_repo().list_for_user(user.id).await?;

        Ok(UserDetailResponse {
            user: UserWithProfileResponse::new(&user, &profile),
            circles: circles.into_iter().map(CircleResponse::from).collect(),
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update_user(
        &self,
        actor: Snowflake,
        username: &str,
        request: UpdateUserRequest,
    ) -> ServiceResult<UserWithProfileResponse> {
        let mut user = self.find_by_username(username).await?;
        require_self(actor, &user)?;

        user.apply_update(request.first_name, request.last_name, request.phone_number);
        self.ctx.user_repo().update(&user).await?;

        info!(user_id = %user.id, "User updated");
        let profile = self.profile(&user).await?;
        Ok(UserWithProfileResponse::new(&user, &profile))
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        actor: Snowflake,
        username: &str,
        request: UpdateProfileRequest,
    ) -> ServiceResult<UserWithProfileResponse> {
        let user = self.find_by_username(username).await?;
        require_self(actor, &user)?;

        let mut profile = self.profile(&user).await?;
        if request.picture.is_some() {
            profile.picture = request.picture;
        }
        if let Some(biography) = request.biography {
            profile.biography = biography;
        }
        profile.updated_at = chrono::Utc::now();
        self.ctx.user_repo().update_profile(&profile).await?;

        info!(user_id = %user.id, "Profile updated");
        Ok(UserWithProfileResponse::new(&user, &profile))
    }

    /// Render the confirmation email for a pending account.
    ///
    /// Returns `None` when the user no longer exists or is already verified.
    #[instrument(skip(self, verify_base_url))]
    pub async fn build_confirmation_email(
        &self,
        user_id: Snowflake,
        verify_base_url: &str,
    ) -> ServiceResult<Option<OutgoingEmail>> {
        let Some(user) = self.ctx.user_repo().find_by_id(user_id).await? else {
            return Ok(None);
        };
        if user.is_verified {
            return Ok(None);
        }

        let token = self
            .ctx
            .jwt_service()
            .generate_verification_token(&user.username)?;
        Ok(Some(confirmation_email(&user, &token, verify_base_url)))
    }

    async fn find_by_username(&self, username: &str) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()).into())
    }

    async fn profile(&self, user: &User) -> ServiceResult<Profile> {
        self.ctx
            .user_repo()
            .find_profile(user.id)
            .await?
            .ok_or_else(|| ServiceError::internal(format!("profile missing for user {}", user.id)))
    }
}
