//! Access checks shared by the circle-scoped services

use ride_core::entities::{Circle, Membership, User};
use ride_core::rules::require_active;
use ride_core::{DomainError, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct AccessService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccessService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn circle(&self, slug_name: &str) -> ServiceResult<Circle> {
        self.ctx
            .circle_repo()
            .find_by_slug(slug_name)
            .await?
            .ok_or_else(|| DomainError::CircleNotFound(slug_name.to_string()).into())
    }

    pub async fn user(&self, user_id: Snowflake) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()).into())
    }

    /// The user's membership in `circle`, which must be active
    pub async fn active_membership(
        &self,
        circle: &Circle,
        user_id: Snowflake,
    ) -> ServiceResult<Membership> {
        let membership = self.ctx.membership_repo().find(circle.id, user_id).await?;
        Ok(require_active(membership)?)
    }

    /// Resolve `slug_name` and require `user_id` to be an active member of it
    pub async fn member_of(
        &self,
        slug_name: &str,
        user_id: Snowflake,
    ) -> ServiceResult<(Circle, Membership)> {
        let circle = self.circle(slug_name).await?;
        let membership = self.active_membership(&circle, user_id).await?;
        Ok((circle, membership))
    }

    pub async fn circle_admin(
        &self,
        slug_name: &str,
        user_id: Snowflake,
    ) -> ServiceResult<(Circle, Membership)> {
        let (circle, membership) = self.member_of(slug_name, user_id).await?;
        if !membership.is_active_admin() {
            return Err(DomainError::NotCircleAdmin.into());
        }
        Ok((circle, membership))
    }

    /// Admin bulk actions are restricted to staff accounts
    pub async fn require_staff(&self, user_id: Snowflake) -> ServiceResult<User> {
        let user = self.user(user_id).await?;
        if !user.is_staff {
            return Err(ServiceError::permission_denied(
                "You do not have permission to perform this action.",
            ));
        }
        Ok(user)
    }
}

/// Acting on another user's account is not allowed
pub(crate) fn require_self(actor: Snowflake, owner: &User) -> ServiceResult<()> {
    if actor == owner.id {
        Ok(())
    } else {
        Err(DomainError::Forbidden(
            "You do not have permission to perform this action.".to_string(),
        )
        .into())
    }
}
