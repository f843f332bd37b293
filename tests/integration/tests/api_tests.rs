//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test api_tests

use chrono::{Duration, Utc};
use integration_tests::{
    assert_error, assert_json, assert_status, check_test_env, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/health/live").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["database"], true);
    assert_eq!(body["checks"]["redis"], true);
}

// ============================================================================
// User Tests
// ============================================================================

#[tokio::test]
async fn test_signup_requires_verification_before_login() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let signup = SignupRequest::unique();

    let response = server.post("/users/signup", &signup).await.unwrap();
    let user: UserResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(user.username, signup.username);
    assert!(!user.is_verified);

    let response = server.post("/users/login", &signup.login()).await.unwrap();
    let message = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(message, "Account is not active yet :(");

    let token = server.verification_token(&signup.username).unwrap();
    let response = server
        .post("/users/verify", &json!({ "token": token }))
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["message"], "Congratulations, now go comparte some rides!");

    let response = server.post("/users/login", &signup.login()).await.unwrap();
    let login: LoginResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(!login.access_token.is_empty());
    assert!(login.user.is_verified);
}

#[tokio::test]
async fn test_signup_rejects_duplicates_and_mismatched_passwords() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let signup = SignupRequest::unique();

    let response = server.post("/users/signup", &signup).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = server.post("/users/signup", &signup).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    let mismatched = SignupRequest {
        password_confirmation: "Another-Pass-2024".to_string(),
        ..SignupRequest::unique()
    };
    let response = server.post("/users/signup", &mismatched).await.unwrap();
    let message = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(message, "Passwords dont match.");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let login = LoginRequest {
        email: "nobody@example.com".to_string(),
        password: "wrong-password".to_string(),
    };

    let response = server.post("/users/login", &login).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_verify_rejects_garbage_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post("/users/verify", &json!({ "token": "not-a-jwt" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_profile_update_is_self_only() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();
    let bob = register_rider(&server).await.unwrap();
    let path = format!("/users/{}/profile", ana.username);
    let body = json!({ "biography": "Driving to campus every morning" });

    let response = server.patch_auth(&path, &bob.token, &body).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.patch_auth(&path, &ana.token, &body).await.unwrap();
    let updated: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(
        updated["profile"]["biography"],
        "Driving to campus every morning"
    );
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/circles").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server.get_auth("/circles", "garbage").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Circle Tests
// ============================================================================

#[tokio::test]
async fn test_create_circle_makes_caller_admin() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();
    let slug = create_circle(&server, &ana).await.unwrap();

    let response = server
        .get_auth(&format!("/circles/{slug}/members/{}", ana.username), &ana.token)
        .await
        .unwrap();
    let member: MembershipResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(member.is_admin);
    assert_eq!(member.remaining_invitations, 10);

    let response = server
        .post_auth("/circles", &ana.token, &circle_request(&slug))
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_list_circles_searches_public_circles() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();
    let slug = create_circle(&server, &ana).await.unwrap();

    let response = server
        .get_auth(&format!("/circles?search={slug}&limit=5"), &ana.token)
        .await
        .unwrap();
    let page: CirclePage = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].slug_name, slug);
    assert!(!page.results[0].verified);

    let response = server
        .get_auth("/circles?ordering=popularity", &ana.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_update_circle_requires_admin() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();
    let bob = register_rider(&server).await.unwrap();
    let slug = create_circle(&server, &ana).await.unwrap();
    invite_into(&server, &slug, &ana, &bob).await.unwrap();
    let body = json!({ "about": "Only for night owls" });

    let response = server
        .patch_auth(&format!("/circles/{slug}"), &bob.token, &body)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .patch_auth(&format!("/circles/{slug}"), &ana.token, &body)
        .await
        .unwrap();
    let circle: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(circle["about"], "Only for night owls");
}

#[tokio::test]
async fn test_unknown_circle_is_not_found() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();

    let response = server
        .get_auth("/circles/no-such-circle-anywhere", &ana.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Membership Tests
// ============================================================================

#[tokio::test]
async fn test_join_with_invitation() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();
    let bob = register_rider(&server).await.unwrap();
    let slug = create_circle(&server, &ana).await.unwrap();

    let joined = invite_into(&server, &slug, &ana, &bob).await.unwrap();
    assert_eq!(joined.user.username, bob.username);
    assert!(!joined.is_admin);
    assert_eq!(joined.remaining_invitations, 0);
    assert_eq!(joined.invited_by.as_deref(), Some(ana.id.as_str()));

    let response = server
        .get_auth(
            &format!("/circles/{slug}/members/{}/invitations", ana.username),
            &ana.token,
        )
        .await
        .unwrap();
    let invitations: InvitationsResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(invitations.invitations.len(), 9);
    assert_eq!(invitations.used_invitations.len(), 1);

    let response = server
        .get_auth(&format!("/circles/{slug}/members"), &bob.token)
        .await
        .unwrap();
    let members: Vec<MembershipResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_join_rejects_bad_code_and_existing_member() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();
    let bob = register_rider(&server).await.unwrap();
    let slug = create_circle(&server, &ana).await.unwrap();
    let path = format!("/circles/{slug}/members");

    let response = server
        .post_auth(&path, &bob.token, &json!({ "invitation_code": "ZZZZZZZZZZ" }))
        .await
        .unwrap();
    let message = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(message, "Invalid invitation code.");

    invite_into(&server, &slug, &ana, &bob).await.unwrap();
    let err = invite_into(&server, &slug, &ana, &bob).await.unwrap_err();
    assert!(err.to_string().contains("400"));
}

#[tokio::test]
async fn test_members_hidden_from_outsiders() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();
    let outsider = register_rider(&server).await.unwrap();
    let slug = create_circle(&server, &ana).await.unwrap();

    let response = server
        .get_auth(&format!("/circles/{slug}/members"), &outsider.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_leave_circle() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();
    let bob = register_rider(&server).await.unwrap();
    let slug = create_circle(&server, &ana).await.unwrap();
    invite_into(&server, &slug, &ana, &bob).await.unwrap();

    let response = server
        .delete_auth(&format!("/circles/{slug}/members/{}", bob.username), &bob.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .get_auth(&format!("/circles/{slug}/rides"), &bob.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Ride Tests
// ============================================================================

#[tokio::test]
async fn test_offer_and_join_ride() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();
    let bob = register_rider(&server).await.unwrap();
    let slug = create_circle(&server, &ana).await.unwrap();
    invite_into(&server, &slug, &ana, &bob).await.unwrap();

    let departure = Utc::now() + Duration::hours(2);
    let response = server
        .post_auth(
            &format!("/circles/{slug}/rides"),
            &ana.token,
            &ride_request(departure, 1),
        )
        .await
        .unwrap();
    let ride: RideResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(ride.offered_by, ana.id);
    assert!(ride.is_active);

    let response = server
        .get_auth(&format!("/circles/{slug}/rides"), &bob.token)
        .await
        .unwrap();
    let rides: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(rides.iter().any(|r| r.id == ride.id));

    let ride_path = format!("/circles/{slug}/rides/{}", ride.id);
    let response = server
        .post_auth(&format!("{ride_path}/join"), &bob.token, &json!({}))
        .await
        .unwrap();
    let joined: RideResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(joined.available_seats, 0);

    let response = server.get_auth(&ride_path, &ana.token).await.unwrap();
    let detail: RideDetailResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(detail.passengers.len(), 1);
    assert_eq!(detail.passengers[0].username, bob.username);

    // Full rides drop out of the listing
    let response = server
        .get_auth(&format!("/circles/{slug}/rides"), &bob.token)
        .await
        .unwrap();
    let rides: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(rides.iter().all(|r| r.id != ride.id));
}

#[tokio::test]
async fn test_ride_rules() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();
    let bob = register_rider(&server).await.unwrap();
    let slug = create_circle(&server, &ana).await.unwrap();
    invite_into(&server, &slug, &ana, &bob).await.unwrap();
    let rides_path = format!("/circles/{slug}/rides");

    // Departing too soon
    let response = server
        .post_auth(
            &rides_path,
            &ana.token,
            &ride_request(Utc::now() + Duration::minutes(2), 2),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .post_auth(
            &rides_path,
            &ana.token,
            &ride_request(Utc::now() + Duration::hours(3), 2),
        )
        .await
        .unwrap();
    let ride: RideResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    let ride_path = format!("{rides_path}/{}", ride.id);

    // Only the offerer edits or finishes
    let response = server
        .patch_auth(&ride_path, &bob.token, &json!({ "available_seats": 4 }))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post_auth(&format!("{ride_path}/finish"), &ana.token, &json!({}))
        .await
        .unwrap();
    let message = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(message, "Ride has not started yet");

    // Rating needs a finished ride
    let response = server
        .post_auth(&format!("{ride_path}/rate"), &bob.token, &json!({ "rating": 5 }))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .get_auth(&format!("{rides_path}/not-a-number"), &ana.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Admin Tests
// ============================================================================

#[tokio::test]
async fn test_admin_endpoints_require_staff() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ana = register_rider(&server).await.unwrap();
    let slug = create_circle(&server, &ana).await.unwrap();

    let response = server
        .post_auth(
            "/admin/circles/verify",
            &ana.token,
            &json!({ "slugs": [slug] }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let today = Utc::now().date_naive();
    let response = server
        .get_auth(&format!("/admin/rides/export?date={today}"), &ana.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .get_auth("/admin/rides/export?date=yesterday", &ana.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}
