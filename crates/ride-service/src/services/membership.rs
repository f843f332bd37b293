//! Membership service
//!
//! Members of a circle, invitation codes and joining/leaving.

use ride_core::entities::{Invitation, Membership};
use ride_core::rules::{check_can_join, check_can_remove, invitations_to_issue};
use ride_core::traits::{CircleMember, InvitationRedemption};
use ride_core::{Circle, DomainError, InvitationCode, Snowflake};
use tracing::{info, instrument};

use crate::dto::{InvitationsResponse, JoinCircleRequest, MembershipResponse};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct MembershipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Active members, visible to active members only
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        actor: Snowflake,
        slug_name: &str,
    ) -> ServiceResult<Vec<MembershipResponse>> {
        let (circle, _) = AccessService::new(self.ctx).member_of(slug_name, actor).await?;
        let members = self.ctx.membership_repo().list_active_members(circle.id).await?;
        Ok(members.into_iter().map(MembershipResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        actor: Snowflake,
        slug_name: &str,
        username: &str,
    ) -> ServiceResult<MembershipResponse> {
        let (circle, _) = AccessService::new(self.ctx).member_of(slug_name, actor).await?;
        let member = self.find_member(&circle, username).await?;
        Ok(MembershipResponse::from(member))
    }

    /// The caller's unused codes, topped up to their remaining quota, and the
    /// members who joined with their codes
    #[instrument(skip(self))]
    pub async fn invitations(
        &self,
        actor: Snowflake,
        slug_name: &str,
        username: &str,
    ) -> ServiceResult<InvitationsResponse> {
        let (circle, membership) = AccessService::new(self.ctx).member_of(slug_name, actor).await?;
        let owner = self.find_member(&circle, username).await?;
        if owner.user.id != actor {
            return Err(DomainError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            )
            .into());
        }

        let repo = self.ctx.invitation_repo();
        let mut unused = repo.list_unused(circle.id, actor).await?;

        let missing = invitations_to_issue(membership.remaining_invitations, unused.len());
        if missing > 0 {
            let fresh: Vec<Invitation> = (0..missing)
                .map(|_| Invitation::issue(self.ctx.generate_id(), actor, circle.id))
                .collect();
            repo.create_many(&fresh).await?;
            info!(circle_id = %circle.id, user_id = %actor, count = missing, "Invitations issued");
            unused.extend(fresh);
        }

        let used = self
            .ctx
            .membership_repo()
            .list_invited_by(circle.id, actor)
            .await?;

        Ok(InvitationsResponse {
            used_invitations: used.into_iter().map(MembershipResponse::from).collect(),
            invitations: unused.into_iter().map(|i| i.code).collect(),
        })
    }

    /// Join a circle by redeeming an invitation code
    #[instrument(skip(self, request))]
    pub async fn join(
        &self,
        actor: Snowflake,
        slug_name: &str,
        request: JoinCircleRequest,
    ) -> ServiceResult<MembershipResponse> {
        let access = AccessService::new(self.ctx);
        let circle = access.circle(slug_name).await?;
        let user = access.user(actor).await?;

        let code = InvitationCode::parse(&request.invitation_code)
            .ok_or(DomainError::InvalidInvitation)?;
        let invitation = self.ctx.invitation_repo().find_by_code(code.as_str()).await?;

        let members = self.ctx.membership_repo();
        let existing = members.find(circle.id, actor).await?;
        let active_members = members.count_active(circle.id).await?;
        check_can_join(&circle, invitation.as_ref(), existing.as_ref(), active_members)?;

        let invitation = invitation.ok_or(DomainError::InvalidInvitation)?;
        // Codes outlive their issuer's membership; an inactive issuer row still
        // records the use.
        let issuer = members
            .find(circle.id, invitation.issued_by)
            .await?
            .ok_or(DomainError::InvalidInvitation)?;

        // Returning members keep their row
        let membership_id = existing.map_or_else(|| self.ctx.generate_id(), |m| m.id);
        let redemption = InvitationRedemption {
            membership: Membership::invited(membership_id, actor, circle.id, invitation.issued_by),
            invitation_id: invitation.id,
            issuer_membership_id: issuer.id,
        };
        members.redeem_invitation(&redemption).await?;

        info!(circle_id = %circle.id, user_id = %actor, "Member joined");

        let member = self.find_member(&circle, &user.username).await?;
        Ok(MembershipResponse::from(member))
    }

    /// Deactivate a membership; members may leave, admins may remove anyone
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        actor: Snowflake,
        slug_name: &str,
        username: &str,
    ) -> ServiceResult<()> {
        let (circle, membership) = AccessService::new(self.ctx).member_of(slug_name, actor).await?;
        let target = self.find_member(&circle, username).await?;
        check_can_remove(&membership, target.user.id)?;

        self.ctx
            .membership_repo()
            .deactivate(target.membership.id)
            .await?;

        info!(circle_id = %circle.id, user_id = %target.user.id, removed_by = %actor, "Member removed");
        Ok(())
    }

    async fn find_member(&self, circle: &Circle, username: &str) -> ServiceResult<CircleMember> {
        self.ctx
            .membership_repo()
            .find_active_member(circle.id, username)
            .await?
            .ok_or_else(|| DomainError::MembershipNotFound.into())
    }
}
