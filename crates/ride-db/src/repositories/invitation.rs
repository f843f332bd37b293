//! PostgreSQL implementation of InvitationRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use ride_core::entities::Invitation;
use ride_core::traits::{InvitationRepository, RepoResult};
use ride_core::value_objects::Snowflake;

use crate::models::InvitationModel;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgInvitationRepository {
    pool: PgPool,
}

impl PgInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    #[instrument(skip(self, code))]
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Invitation>> {
        let result = sqlx::query_as::<_, InvitationModel>(
            r"
            SELECT id, code, issued_by, used_by, circle_id, used, used_at, created_at
            FROM invitations
            WHERE code = $1
            ",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Invitation::from))
    }

    #[instrument(skip(self))]
    async fn list_unused(
        &self,
        circle_id: Snowflake,
        issued_by: Snowflake,
    ) -> RepoResult<Vec<Invitation>> {
        let rows = sqlx::query_as::<_, InvitationModel>(
            r"
            SELECT id, code, issued_by, used_by, circle_id, used, used_at, created_at
            FROM invitations
            WHERE circle_id = $1 AND issued_by = $2 AND NOT used
            ORDER BY created_at, id
            ",
        )
        .bind(circle_id.into_inner())
        .bind(issued_by.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Invitation::from).collect())
    }

    #[instrument(skip(self, invitations), fields(count = invitations.len()))]
    async fn create_many(&self, invitations: &[Invitation]) -> RepoResult<()> {
        if invitations.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO invitations (id, code, issued_by, circle_id, used, created_at) ",
        );
        qb.push_values(invitations, |mut row, inv| {
            row.push_bind(inv.id.into_inner())
                .push_bind(&inv.code)
                .push_bind(inv.issued_by.into_inner())
                .push_bind(inv.circle_id.into_inner())
                .push_bind(inv.used)
                .push_bind(inv.created_at);
        });

        qb.build().execute(&self.pool).await.map_err(map_db_error)?;
        Ok(())
    }
}
