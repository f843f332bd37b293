//! PostgreSQL implementation of MembershipRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use ride_core::entities::Membership;
use ride_core::error::DomainError;
use ride_core::traits::{CircleMember, InvitationRedemption, MembershipRepository, RepoResult};
use ride_core::value_objects::Snowflake;

use crate::models::{CircleMemberModel, MembershipModel};

use super::error::map_db_error;

const MEMBERSHIP_COLUMNS: &str = "m.id, m.user_id, m.circle_id, m.is_admin, m.used_invitations, \
                                  m.remaining_invitations, m.invited_by, m.rides_taken, \
                                  m.rides_offered, m.is_active, m.created_at, m.updated_at";

const MEMBER_SELECT: &str = r"
    SELECT m.id, m.user_id, m.circle_id, m.is_admin, m.used_invitations,
           m.remaining_invitations, m.invited_by, m.rides_taken, m.rides_offered,
           m.is_active, m.created_at, m.updated_at,
           u.email AS u_email, u.username AS u_username, u.first_name AS u_first_name,
           u.last_name AS u_last_name, u.phone_number AS u_phone_number,
           u.is_client AS u_is_client, u.is_verified AS u_is_verified,
           u.is_staff AS u_is_staff, u.created_at AS u_created_at, u.updated_at AS u_updated_at,
           p.picture AS p_picture, p.biography AS p_biography, p.rides_taken AS p_rides_taken,
           p.rides_offered AS p_rides_offered, p.reputation AS p_reputation,
           p.updated_at AS p_updated_at
    FROM memberships m
    INNER JOIN users u ON u.id = m.user_id
    INNER JOIN profiles p ON p.user_id = m.user_id
";

#[derive(Clone)]
pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    #[instrument(skip(self))]
    async fn find(&self, circle_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<Membership>> {
        let sql = format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships m WHERE m.circle_id = $1 AND m.user_id = $2"
        );
        let result = sqlx::query_as::<_, MembershipModel>(&sql)
            .bind(circle_id.into_inner())
            .bind(user_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Membership::from))
    }

    #[instrument(skip(self))]
    async fn find_active_member(
        &self,
        circle_id: Snowflake,
        username: &str,
    ) -> RepoResult<Option<CircleMember>> {
        let sql = format!("{MEMBER_SELECT} WHERE m.circle_id = $1 AND u.username = $2 AND m.is_active");
        let result = sqlx::query_as::<_, CircleMemberModel>(&sql)
            .bind(circle_id.into_inner())
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(CircleMember::from))
    }

    #[instrument(skip(self))]
    async fn list_active_members(&self, circle_id: Snowflake) -> RepoResult<Vec<CircleMember>> {
        let sql = format!("{MEMBER_SELECT} WHERE m.circle_id = $1 AND m.is_active ORDER BY m.created_at");
        let rows = sqlx::query_as::<_, CircleMemberModel>(&sql)
            .bind(circle_id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(CircleMember::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_invited_by(
        &self,
        circle_id: Snowflake,
        inviter: Snowflake,
    ) -> RepoResult<Vec<CircleMember>> {
        let sql = format!(
            "{MEMBER_SELECT} WHERE m.circle_id = $1 AND m.invited_by = $2 AND m.is_active \
             ORDER BY m.created_at"
        );
        let rows = sqlx::query_as::<_, CircleMemberModel>(&sql)
            .bind(circle_id.into_inner())
            .bind(inviter.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(CircleMember::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_active(&self, circle_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM memberships WHERE circle_id = $1 AND is_active",
        )
        .bind(circle_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, redemption), fields(
        circle_id = %redemption.membership.circle_id,
        user_id = %redemption.membership.user_id,
    ))]
    async fn redeem_invitation(&self, redemption: &InvitationRedemption) -> RepoResult<()> {
        let membership = &redemption.membership;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let consumed = sqlx::query(
            r"
            UPDATE invitations
            SET used = TRUE, used_by = $2, used_at = NOW()
            WHERE id = $1 AND NOT used
            ",
        )
        .bind(redemption.invitation_id.into_inner())
        .bind(membership.user_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if consumed.rows_affected() == 0 {
            return Err(DomainError::InvalidInvitation);
        }

        // Only inactive rows are revived, with the columns `Membership::rejoin` resets.
        let stored = sqlx::query(
            r"
            INSERT INTO memberships (id, user_id, circle_id, is_admin, used_invitations,
                                     remaining_invitations, invited_by, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $9)
            ON CONFLICT (user_id, circle_id) DO UPDATE
            SET is_active = TRUE,
                is_admin = EXCLUDED.is_admin,
                remaining_invitations = EXCLUDED.remaining_invitations,
                invited_by = EXCLUDED.invited_by,
                updated_at = NOW()
            WHERE NOT memberships.is_active
            ",
        )
        .bind(membership.id.into_inner())
        .bind(membership.user_id.into_inner())
        .bind(membership.circle_id.into_inner())
        .bind(membership.is_admin)
        .bind(membership.used_invitations)
        .bind(membership.remaining_invitations)
        .bind(membership.invited_by.map(Snowflake::into_inner))
        .bind(membership.created_at)
        .bind(membership.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if stored.rows_affected() == 0 {
            return Err(DomainError::AlreadyMember);
        }

        sqlx::query(
            r"
            UPDATE memberships
            SET used_invitations = used_invitations + 1,
                remaining_invitations = GREATEST(remaining_invitations - 1, 0),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(redemption.issuer_membership_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, membership_id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE memberships SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active",
        )
        .bind(membership_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MembershipNotFound);
        }
        Ok(())
    }
}
