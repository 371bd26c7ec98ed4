//! End-to-end gate and policy scenarios against the real router.
//!
//! Requests are driven with `tower::ServiceExt::oneshot`; state is built
//! with in-memory repos and a fixed signing secret so tokens can be
//! crafted (expired, tampered, unknown subject) from the tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use blog_api::{
    app,
    middleware::auth::AllowList,
    repos::{
        comment_repo::InMemoryCommentRepo, post_repo::InMemoryPostRepo,
        user_repo::InMemoryUserRepo,
    },
    services::auth::{Identity, JwtService, Role, TokenClaims},
    state::AppState,
};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";

fn test_router() -> Router {
    let jwt = Arc::new(JwtService::new(SECRET, 600));
    let allow_list = Arc::new(
        AllowList::new(&[
            "/api/auth/register".to_string(),
            "/api/auth/login".to_string(),
        ])
        .unwrap(),
    );
    let state = AppState::new(
        Arc::new(InMemoryUserRepo::new()),
        Arc::new(InMemoryPostRepo::new()),
        Arc::new(InMemoryCommentRepo::new()),
        jwt,
        allow_list,
    );
    app::build_router(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn authed_json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers an account through the public endpoint and returns its token.
/// Account ids are handed out sequentially starting at 1.
async fn register(router: &Router, email: &str, role: &str) -> String {
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "first_name": "Test",
                "last_name": "Account",
                "email": email,
                "password": "pass123",
                "about": "integration test account",
                "role": role,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

fn sign_claims(sub: &str, exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = TokenClaims {
        sub: sub.to_string(),
        role: Role::User,
        iat: now as u64,
        exp: (now + exp_offset_secs) as u64,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

// --- gate: allow-list and header handling ---

#[tokio::test]
async fn allow_listed_route_reaches_handler_without_credentials() {
    let router = test_router();

    // No Authorization header at all; the login handler itself must run
    // (404 from the handler, not 400 from the gate).
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "nobody@x.com", "password": "pass123"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(
        body["errorMessage"],
        "User not found with email : nobody@x.com"
    );
}

#[tokio::test]
async fn missing_header_on_protected_route_is_rejected() {
    let router = test_router();

    let response = router
        .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(
        body["errorMessage"]
            .as_str()
            .unwrap()
            .starts_with("Missing or Invalid Auth Header")
    );
}

#[tokio::test]
async fn non_bearer_header_is_rejected() {
    let router = test_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["errorMessage"],
        "Missing or Invalid Auth Header: Basic dXNlcjpwYXNz"
    );
}

// --- gate: token verification ---

#[tokio::test]
async fn expired_token_is_rejected_regardless_of_signature() {
    let router = test_router();
    register(&router, "a@x.com", "ROLE_USER").await;

    // Correctly signed, expiry in the past.
    let token = sign_claims("a@x.com", -60);
    let response = router
        .oneshot(authed_request("GET", "/api/users/1", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(
        body["errorMessage"]
            .as_str()
            .unwrap()
            .starts_with("Expired JWT signature:")
    );
}

#[tokio::test]
async fn tampered_signature_is_rejected() {
    let router = test_router();
    let token = register(&router, "a@x.com", "ROLE_USER").await;

    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let response = router
        .oneshot(authed_request("GET", "/api/users/1", &tampered))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(
        body["errorMessage"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JWT signature:")
    );
}

#[tokio::test]
async fn garbage_token_is_rejected_as_malformed() {
    let router = test_router();

    let response = router
        .oneshot(authed_request("GET", "/api/users/1", "not-a-jwt"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(
        body["errorMessage"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JWT token:")
    );
}

#[tokio::test]
async fn valid_token_for_unknown_subject_is_an_authentication_failure() {
    let router = test_router();

    let token = sign_claims("ghost@x.com", 600);
    let response = router
        .oneshot(authed_request("GET", "/api/users/1", &token))
        .await
        .unwrap();

    // 401, never a 404 of the account resource.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(
        body["errorMessage"],
        "No account found for subject: ghost@x.com"
    );
}

// --- policy enforcement through the full stack ---

#[tokio::test]
async fn user_can_update_own_profile() {
    let router = test_router();
    let token = register(&router, "a@x.com", "ROLE_USER").await;

    let response = router
        .oneshot(authed_json_request(
            "PUT",
            "/api/users/1",
            &token,
            json!({
                "first_name": "Updated",
                "last_name": "Account",
                "email": "a@x.com",
                "password": "pass123",
                "about": "still me",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["first_name"], "Updated");
    assert_eq!(body["email"], "a@x.com");
}

#[tokio::test]
async fn user_cannot_delete_another_users_post() {
    let router = test_router();
    let token_a = register(&router, "a@x.com", "ROLE_USER").await;
    let token_b = register(&router, "b@x.com", "ROLE_USER").await;

    // b (account id 2) creates a post.
    let response = router
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/posts",
            &token_b,
            json!({"title": "b's post", "content": "hello", "user_id": 2}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // a is neither owner nor admin.
    let response = router
        .oneshot(authed_request("DELETE", "/api/posts/1", &token_a))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({"errorMessage": "The user is not authorized to perform this action"})
    );
}

#[tokio::test]
async fn admin_can_delete_another_users_post() {
    let router = test_router();
    let token_admin = register(&router, "admin@x.com", "ROLE_ADMIN").await;
    let token_b = register(&router, "b@x.com", "ROLE_USER").await;

    let response = router
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/posts",
            &token_b,
            json!({"title": "b's post", "content": "hello", "user_id": 2}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(authed_request("DELETE", "/api/posts/1", &token_admin))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "b's post");
}

#[tokio::test]
async fn listing_accounts_requires_admin() {
    let router = test_router();
    let token_user = register(&router, "a@x.com", "ROLE_USER").await;
    let token_admin = register(&router, "admin@x.com", "ROLE_ADMIN").await;

    let response = router
        .clone()
        .oneshot(authed_request("GET", "/api/users", &token_user))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .oneshot(authed_request("GET", "/api/users", &token_admin))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_cannot_update_someone_elses_profile() {
    let router = test_router();
    register(&router, "a@x.com", "ROLE_USER").await;
    let token_admin = register(&router, "admin@x.com", "ROLE_ADMIN").await;

    // Profile updates are same-subject only; admin role does not help.
    let response = router
        .oneshot(authed_json_request(
            "PUT",
            "/api/users/1",
            &token_admin,
            json!({
                "first_name": "Hijacked",
                "last_name": "Account",
                "email": "a@x.com",
                "password": "pass123",
                "about": "nope",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// --- registration input surface ---

#[tokio::test]
async fn validation_failures_return_a_field_message_map() {
    let router = test_router();

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "first_name": "Al",
                "last_name": "Account",
                "email": "not-an-email",
                "password": "pass123",
                "about": "hi",
                "role": "ROLE_USER",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["first_name"],
        "first name must be minimum of 4 characters"
    );
    assert_eq!(body["email"], "Email address is not valid");
    assert!(body.get("errorMessage").is_none());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let router = test_router();
    register(&router, "a@x.com", "ROLE_USER").await;

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "first_name": "Test",
                "last_name": "Account",
                "email": "a@x.com",
                "password": "pass123",
                "about": "duplicate",
                "role": "ROLE_USER",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(
        body["errorMessage"],
        "User already exists with the username: a@x.com"
    );
}

#[tokio::test]
async fn login_with_wrong_password_is_forbidden() {
    let router = test_router();
    register(&router, "a@x.com", "ROLE_USER").await;

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "wrong12"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// --- identity context lifecycle ---

#[tokio::test]
async fn identity_does_not_leak_into_a_later_request() {
    let router = test_router();
    let token = register(&router, "a@x.com", "ROLE_USER").await;

    let response = router
        .clone()
        .oneshot(authed_request("GET", "/api/users/1", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Same protected path, no credentials: the gate must start from a
    // clean slate, not from the previous request's identity.
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/users/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gate_does_not_overwrite_an_already_installed_identity() {
    let router = test_router();
    let token_a = register(&router, "a@x.com", "ROLE_USER").await;
    register(&router, "b@x.com", "ROLE_USER").await;

    // An identity for b is already present when the gate runs; the valid
    // token for a must not replace it.
    let preinstalled = Identity {
        subject: "b@x.com".to_string(),
        role: Role::User,
    };
    let request = Request::builder()
        .uri("/api/users/2")
        .header(header::AUTHORIZATION, format!("Bearer {token_a}"))
        .extension(preinstalled)
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    // Handler saw b's identity (owner of account 2); a's identity would
    // have been rejected with 403.
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], "b@x.com");
}
