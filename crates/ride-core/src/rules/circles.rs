//! Membership and invitation checks

use crate::entities::{Circle, Invitation, Membership};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Number of fresh codes needed so a member holds `remaining` unused ones
pub fn invitations_to_issue(remaining_invitations: i32, unused: usize) -> usize {
    usize::try_from(remaining_invitations)
        .unwrap_or(0)
        .saturating_sub(unused)
}

pub fn check_circle_capacity(circle: &Circle, active_members: i64) -> Result<(), DomainError> {
    if circle.is_full(active_members) {
        return Err(DomainError::CircleFull);
    }
    Ok(())
}

/// Validate a join attempt against the presented invitation and any existing membership
pub fn check_can_join(
    circle: &Circle,
    invitation: Option<&Invitation>,
    existing: Option<&Membership>,
    active_members: i64,
) -> Result<(), DomainError> {
    match invitation {
        Some(inv) if inv.is_redeemable_in(circle.id) => {}
        _ => return Err(DomainError::InvalidInvitation),
    }
    if existing.is_some_and(|m| m.is_active) {
        return Err(DomainError::AlreadyMember);
    }
    check_circle_capacity(circle, active_members)
}

/// The actor must hold an active membership
pub fn require_active(membership: Option<Membership>) -> Result<Membership, DomainError> {
    membership
        .filter(|m| m.is_active)
        .ok_or(DomainError::NotActiveMember)
}

/// Members may remove themselves; admins may remove anyone
pub fn check_can_remove(actor: &Membership, target_user: Snowflake) -> Result<(), DomainError> {
    if actor.user_id == target_user || actor.is_active_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden(
            "You do not have permission to perform this action.".to_string(),
        ))
    }
}
