//! PostgreSQL implementation of CircleRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use ride_core::entities::{Circle, Membership};
use ride_core::error::DomainError;
use ride_core::traits::{CircleOrdering, CircleQuery, CircleRepository, CircleSortField, RepoResult};
use ride_core::value_objects::Snowflake;

use crate::models::CircleModel;

use super::error::{map_db_error, map_unique_violation};

const CIRCLE_COLUMNS: &str = "c.id, c.name, c.slug_name, c.about, c.picture, c.rides_offered, \
                              c.rides_taken, c.is_verified, c.is_public, c.is_limited, \
                              c.members_limit, c.created_at, c.updated_at";

#[derive(Clone)]
pub struct PgCircleRepository {
    pool: PgPool,
}

impl PgCircleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn order_clause(ordering: CircleOrdering) -> String {
    match ordering {
        CircleOrdering::Popularity => {
            "(SELECT COUNT(*) FROM memberships m WHERE m.circle_id = c.id AND m.is_active) DESC, \
             c.rides_offered DESC, c.rides_taken DESC, c.id"
                .to_string()
        }
        CircleOrdering::By { field, descending } => {
            let column = match field {
                CircleSortField::RidesOffered => "c.rides_offered",
                CircleSortField::RidesTaken => "c.rides_taken",
                CircleSortField::Name => "c.name",
                CircleSortField::Created => "c.created_at",
                CircleSortField::MembersLimit => "c.members_limit",
            };
            let direction = if descending { "DESC" } else { "ASC" };
            format!("{column} {direction}, c.id")
        }
    }
}

#[async_trait]
impl CircleRepository for PgCircleRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Circle>> {
        let sql = format!("SELECT {CIRCLE_COLUMNS} FROM circles c WHERE c.id = $1");
        let result = sqlx::query_as::<_, CircleModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Circle::from))
    }

    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug_name: &str) -> RepoResult<Option<Circle>> {
        let sql = format!("SELECT {CIRCLE_COLUMNS} FROM circles c WHERE c.slug_name = $1");
        let result = sqlx::query_as::<_, CircleModel>(&sql)
            .bind(slug_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Circle::from))
    }

    #[instrument(skip(self))]
    async fn slug_exists(&self, slug_name: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM circles WHERE slug_name = $1)")
            .bind(slug_name)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list_public(&self, query: &CircleQuery) -> RepoResult<Vec<Circle>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {CIRCLE_COLUMNS} FROM circles c WHERE c.is_public"
        ));

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.replace('%', "\\%").replace('_', "\\_"));
            qb.push(" AND (c.slug_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR c.name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(is_verified) = query.is_verified {
            qb.push(" AND c.is_verified = ").push_bind(is_verified);
        }
        if let Some(is_limited) = query.is_limited {
            qb.push(" AND c.is_limited = ").push_bind(is_limited);
        }

        qb.push(" ORDER BY ").push(order_clause(query.ordering));
        qb.push(" LIMIT ").push_bind(query.limit);
        qb.push(" OFFSET ").push_bind(query.offset);

        let rows = qb
            .build_query_as::<CircleModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Circle::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Circle>> {
        let sql = format!(
            r"
            SELECT {CIRCLE_COLUMNS}
            FROM circles c
            INNER JOIN memberships m ON m.circle_id = c.id
            WHERE m.user_id = $1 AND m.is_active
            ORDER BY c.name
            "
        );
        let rows = sqlx::query_as::<_, CircleModel>(&sql)
            .bind(user_id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Circle::from).collect())
    }

    #[instrument(skip(self, circle, founder), fields(circle_id = %circle.id))]
    async fn create_with_founder(&self, circle: &Circle, founder: &Membership) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO circles (id, name, slug_name, about, picture, rides_offered, rides_taken,
                                 is_verified, is_public, is_limited, members_limit, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(circle.id.into_inner())
        .bind(&circle.name)
        .bind(&circle.slug_name)
        .bind(&circle.about)
        .bind(&circle.picture)
        .bind(circle.rides_offered)
        .bind(circle.rides_taken)
        .bind(circle.is_verified)
        .bind(circle.is_public)
        .bind(circle.is_limited)
        .bind(circle.members_limit)
        .bind(circle.created_at)
        .bind(circle.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, |_| DomainError::SlugAlreadyExists))?;

        sqlx::query(
            r"
            INSERT INTO memberships (id, user_id, circle_id, is_admin, used_invitations,
                                     remaining_invitations, invited_by, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(founder.id.into_inner())
        .bind(founder.user_id.into_inner())
        .bind(founder.circle_id.into_inner())
        .bind(founder.is_admin)
        .bind(founder.used_invitations)
        .bind(founder.remaining_invitations)
        .bind(founder.invited_by.map(Snowflake::into_inner))
        .bind(founder.is_active)
        .bind(founder.created_at)
        .bind(founder.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, circle), fields(circle_id = %circle.id))]
    async fn update(&self, circle: &Circle) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE circles
            SET name = $2, about = $3, picture = $4, is_public = $5, is_limited = $6,
                members_limit = $7, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(circle.id.into_inner())
        .bind(&circle.name)
        .bind(&circle.about)
        .bind(&circle.picture)
        .bind(circle.is_public)
        .bind(circle.is_limited)
        .bind(circle.members_limit)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::CircleNotFound(circle.slug_name.clone()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_verified(&self, slug_names: &[String], verified: bool) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE circles
            SET is_verified = $2, updated_at = NOW()
            WHERE slug_name = ANY($1) AND is_verified <> $2
            ",
        )
        .bind(slug_names)
        .bind(verified)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
