//! Circle service
//!
//! Listing, creation and admin updates of circles.

use ride_core::entities::{Circle, Membership};
use ride_core::traits::CircleQuery;
use ride_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{
    CircleResponse, CreateCircleRequest, PageResponse, UpdateCircleRequest,
    VerifiedCirclesResponse,
};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct CircleService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CircleService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Public circles matching the query
    #[instrument(skip(self))]
    pub async fn list(&self, query: CircleQuery) -> ServiceResult<PageResponse<CircleResponse>> {
        let circles = self.ctx.circle_repo().list_public(&query).await?;
        Ok(PageResponse {
            results: circles.into_iter().map(CircleResponse::from).collect(),
            limit: query.limit,
            offset: query.offset,
        })
    }

    /// Create a circle with the caller as its founding admin
    #[instrument(skip(self, request), fields(slug = %request.slug_name))]
    pub async fn create(
        &self,
        actor: Snowflake,
        request: CreateCircleRequest,
    ) -> ServiceResult<CircleResponse> {
        let mut circle = Circle::new(self.ctx.generate_id(), request.name, request.slug_name)
            .with_about(request.about)
            .with_limit(request.is_limited, request.members_limit);
        circle.picture = request.picture;
        circle.is_public = request.is_public;
        circle.validate()?;

        if self.ctx.circle_repo().slug_exists(&circle.slug_name).await? {
            return Err(DomainError::SlugAlreadyExists.into());
        }

        let founder = Membership::founder(self.ctx.generate_id(), actor, circle.id);
        self.ctx
            .circle_repo()
            .create_with_founder(&circle, &founder)
            .await?;

        info!(circle_id = %circle.id, founder = %actor, "Circle created");
        Ok(CircleResponse::from(circle))
    }

    pub async fn get(&self, slug_name: &str) -> ServiceResult<CircleResponse> {
        let circle = AccessService::new(self.ctx).circle(slug_name).await?;
        Ok(CircleResponse::from(circle))
    }

    /// Partial update, circle admins only
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor: Snowflake,
        slug_name: &str,
        request: UpdateCircleRequest,
    ) -> ServiceResult<CircleResponse> {
        let (mut circle, _) = AccessService::new(self.ctx)
            .circle_admin(slug_name, actor)
            .await?;

        if let Some(name) = request.name {
            circle.name = name;
        }
        if let Some(about) = request.about {
            circle.about = about;
        }
        if request.picture.is_some() {
            circle.picture = request.picture;
        }
        if let Some(is_public) = request.is_public {
            circle.is_public = is_public;
        }
        if let Some(is_limited) = request.is_limited {
            circle.is_limited = is_limited;
            if !is_limited && request.members_limit.is_none() {
                circle.members_limit = 0;
            }
        }
        if let Some(members_limit) = request.members_limit {
            circle.members_limit = members_limit;
        }
        circle.validate()?;
        circle.touch();

        self.ctx.circle_repo().update(&circle).await?;

        info!(circle_id = %circle.id, "Circle updated");
        Ok(CircleResponse::from(circle))
    }

    /// Bulk verify or unverify circles by slug. Staff only.
    #[instrument(skip(self, slug_names))]
    pub async fn set_verified(
        &self,
        actor: Snowflake,
        slug_names: &[String],
        is_verified: bool,
    ) -> ServiceResult<VerifiedCirclesResponse> {
        AccessService::new(self.ctx).require_staff(actor).await?;

        let updated = self
            .ctx
            .circle_repo()
            .set_verified(slug_names, is_verified)
            .await?;

        info!(actor = %actor, updated, is_verified, "Circle verification changed");
        Ok(VerifiedCirclesResponse {
            updated,
            is_verified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::TestContext;

    fn create_request(slug: &str) -> CreateCircleRequest {
        CreateCircleRequest {
            name: "Facultad de Ingenieria".to_string(),
            slug_name: slug.to_string(),
            about: String::new(),
            picture: None,
            is_public: true,
            is_limited: false,
            members_limit: 0,
        }
    }

    #[tokio::test]
    async fn test_create_makes_founder_admin() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        let circles = CircleService::new(&t.ctx);

        let circle = circles.create(ana.id, create_request("unam-fi")).await.unwrap();
        assert_eq!(circle.slug_name, "unam-fi");
        assert!(!circle.verified);

        let membership = t.membership_of("unam-fi", ana.id).unwrap();
        assert!(membership.is_admin);
        assert_eq!(membership.remaining_invitations, 10);

        let err = circles
            .create(ana.id, create_request("unam-fi"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_create_checks_limit_pair() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        let circles = CircleService::new(&t.ctx);

        let request = CreateCircleRequest {
            is_limited: true,
            ..create_request("limited")
        };
        let err = circles.create(ana.id, request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "If circle is limited, a member limit must be provided"
        );

        let request = CreateCircleRequest {
            is_limited: true,
            members_limit: 50,
            ..create_request("limited")
        };
        assert!(circles.create(ana.id, request).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_hides_private_circles() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        let circles = CircleService::new(&t.ctx);

        circles.create(ana.id, create_request("open")).await.unwrap();
        let private = CreateCircleRequest {
            is_public: false,
            ..create_request("hidden")
        };
        circles.create(ana.id, private).await.unwrap();

        let page = circles
            .list(CircleQuery {
                limit: 20,
                ..CircleQuery::default()
            })
            .await
            .unwrap();
        let slugs: Vec<_> = page.results.iter().map(|c| c.slug_name.as_str()).collect();
        assert_eq!(slugs, vec!["open"]);

        assert!(circles.get("hidden").await.is_ok());
        assert_eq!(circles.get("missing").await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_update_requires_admin() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        let bob = t.user("bob_q");
        let circles = CircleService::new(&t.ctx);
        circles.create(ana.id, create_request("devs")).await.unwrap();
        t.join("devs", bob.id);

        let request = UpdateCircleRequest {
            about: Some("Rides for developers".to_string()),
            ..Default::default()
        };
        let err = circles
            .update(bob.id, "devs", request.clone())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let updated = circles.update(ana.id, "devs", request).await.unwrap();
        assert_eq!(updated.about, "Rides for developers");

        let bad_limit = UpdateCircleRequest {
            members_limit: Some(5),
            is_limited: Some(true),
            ..Default::default()
        };
        assert_eq!(
            circles
                .update(ana.id, "devs", bad_limit)
                .await
                .unwrap_err()
                .status_code(),
            400
        );
    }

    #[tokio::test]
    async fn test_set_verified_is_staff_only() {
        let t = TestContext::new();
        let ana = t.user("ana_p");
        let staff = t.staff("admin_1");
        let circles = CircleService::new(&t.ctx);
        circles.create(ana.id, create_request("devs")).await.unwrap();
        circles.create(ana.id, create_request("ops")).await.unwrap();
        let slugs = vec!["devs".to_string(), "ops".to_string(), "missing".to_string()];

        let err = circles.set_verified(ana.id, &slugs, true).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let response = circles.set_verified(staff.id, &slugs, true).await.unwrap();
        assert_eq!(response.updated, 2);
        assert!(circles.get("devs").await.unwrap().verified);

        let response = circles
            .set_verified(staff.id, &slugs[..1], false)
            .await
            .unwrap();
        assert_eq!(response.updated, 1);
        assert!(!circles.get("devs").await.unwrap().verified);
        assert!(circles.get("ops").await.unwrap().verified);
    }
}
