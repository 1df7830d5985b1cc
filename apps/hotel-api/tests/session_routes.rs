use axum::http::HeaderValue;
use axum_test::TestServer;
use hotel_api::{AppState, create_app, seed_demo};
use hotel_core::{
    Cache, DocumentStore,
    adapters::{InMemoryCache, InMemoryDocumentStore},
    demo::DEMO_PASSWORD,
};
use http::{StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;

// Helper function to set up the test application with in-memory dependencies
async fn setup_test_app() -> TestServer {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::default());
    let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::default());
    let state = AppState::new(store, cache);
    seed_demo(&state).await.expect("seed demo data");

    TestServer::new(create_app(state)).expect("Failed to create TestServer")
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

async fn login_token(server: &TestServer, email: &str) -> String {
    let res = server
        .post("/api/sessions")
        .json(&json!({ "email": email, "password": DEMO_PASSWORD }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED, "login {email}");
    res.json::<Value>()["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn login_issues_a_session_and_stamps_last_login() {
    let server = setup_test_app().await;

    let res = server
        .post("/api/sessions")
        .json(&json!({ "email": "admin@hotel.com", "password": DEMO_PASSWORD }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    let body: Value = res.json();
    assert_eq!(body["userId"], "admin@hotel.com");
    assert_eq!(body["role"], "admin");
    assert_eq!(body["branchId"], "branch-1");
    assert_eq!(body["expiresIn"], 3600);
    let token = body["token"].as_str().unwrap().to_string();

    let res = server
        .get("/api/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let me: Value = res.json();
    assert_eq!(me["email"], "admin@hotel.com");
    assert_eq!(me["role"], "admin");

    let user: Value = server.get("/api/users/admin@hotel.com").await.json();
    assert_ne!(user["lastLogin"], "2024-08-03");
    assert!(user.get("passwordHash").is_none());
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_inactive_accounts() {
    let server = setup_test_app().await;

    let res = server
        .post("/api/sessions")
        .json(&json!({ "email": "stranger@example.com", "password": DEMO_PASSWORD }))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);

    let res = server
        .post("/api/sessions")
        .json(&json!({ "email": "director@hotel.com", "password": "not-the-password" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);

    let res = server
        .post("/api/sessions")
        .json(&json!({ "email": "   ", "password": DEMO_PASSWORD }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

    let director = login_token(&server, "director@hotel.com").await;
    let res = server
        .patch("/api/users/client@hotel.com")
        .add_header(header::AUTHORIZATION, bearer(&director))
        .json(&json!({ "status": "inactive" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);

    let res = server
        .post("/api/sessions")
        .json(&json!({ "email": "client@hotel.com", "password": DEMO_PASSWORD }))
        .await;
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn accounts_created_through_the_api_need_a_password() {
    let server = setup_test_app().await;
    let director = login_token(&server, "director@hotel.com").await;

    let res = server
        .post("/api/users")
        .add_header(header::AUTHORIZATION, bearer(&director))
        .json(&json!({
            "name": "Maria Garcia",
            "role": "admin",
            "email": "maria@hotel.com",
            "branchId": "branch-2",
            "status": "active",
            "lastLogin": "Never"
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    let id = res.json::<Value>()["id"].as_str().unwrap().to_string();

    let credentials = json!({ "email": "maria@hotel.com", "password": "maria-secret" });
    let res = server.post("/api/sessions").json(&credentials).await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);

    let res = server
        .put(&format!("/api/users/{id}/password"))
        .add_header(header::AUTHORIZATION, bearer(&director))
        .json(&json!({ "password": "short" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

    let res = server
        .put(&format!("/api/users/{id}/password"))
        .add_header(header::AUTHORIZATION, bearer(&director))
        .json(&json!({ "password": "maria-secret" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);

    let res = server.post("/api/sessions").json(&credentials).await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    assert_eq!(res.json::<Value>()["role"], "admin");
}

#[tokio::test]
async fn only_the_account_or_the_director_sets_a_password() {
    let server = setup_test_app().await;
    let admin = login_token(&server, "admin@hotel.com").await;

    let res = server
        .put("/api/users/director@hotel.com/password")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!({ "password": "taken-over" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);

    let res = server
        .put("/api/users/admin@hotel.com/password")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!({ "password": "a-new-password" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);

    let res = server
        .post("/api/sessions")
        .json(&json!({ "email": "admin@hotel.com", "password": DEMO_PASSWORD }))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    let res = server
        .post("/api/sessions")
        .json(&json!({ "email": "admin@hotel.com", "password": "a-new-password" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);

    let res = server
        .put("/api/users/director@hotel.com/password")
        .json(&json!({ "password": "taken-over" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let server = setup_test_app().await;
    let token = login_token(&server, "director@hotel.com").await;

    let res = server
        .delete("/api/sessions/current")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);

    let res = server
        .get("/api/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deactivating_an_account_ends_its_sessions() {
    let server = setup_test_app().await;
    let admin = login_token(&server, "admin@hotel.com").await;
    let director = login_token(&server, "director@hotel.com").await;

    let res = server
        .patch("/api/users/admin@hotel.com")
        .add_header(header::AUTHORIZATION, bearer(&director))
        .json(&json!({ "status": "inactive", "branchId": "branch-2" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);

    let res = server
        .get("/api/dashboard/branches/branch-1")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);

    // Reactivating does not bring the old token back
    let res = server
        .patch("/api/users/admin@hotel.com")
        .add_header(header::AUTHORIZATION, bearer(&director))
        .json(&json!({ "status": "active" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    let res = server
        .get("/api/me")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sessions_follow_role_and_branch_changes() {
    let server = setup_test_app().await;
    let admin = login_token(&server, "admin@hotel.com").await;
    let director = login_token(&server, "director@hotel.com").await;

    let res = server
        .patch("/api/users/admin@hotel.com")
        .add_header(header::AUTHORIZATION, bearer(&director))
        .json(&json!({ "branchId": "branch-2" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);

    let res = server
        .get("/api/dashboard/branches/branch-1")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    let res = server
        .get("/api/dashboard/branches/branch-2")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let me: Value = server
        .get("/api/me")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await
        .json();
    assert_eq!(me["branchId"], "branch-2");

    // Deleting the account ends the session too
    let res = server
        .delete("/api/users/admin@hotel.com")
        .add_header(header::AUTHORIZATION, bearer(&director))
        .await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    let res = server
        .get("/api/me")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn my_view_follows_the_role() {
    let server = setup_test_app().await;

    let client = login_token(&server, "client@hotel.com").await;
    let res = server
        .get("/api/me/view")
        .add_header(header::AUTHORIZATION, bearer(&client))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let view: Value = res.json();
    assert_eq!(view["role"], "client");
    assert_eq!(view["booking"]["id"], "booking-1");
    assert_eq!(view["room"]["id"], "room-101");

    let admin = login_token(&server, "admin@hotel.com").await;
    let view: Value = server
        .get("/api/me/view")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await
        .json();
    assert_eq!(view["role"], "admin");
    assert_eq!(view["rooms"].as_array().unwrap().len(), 6);
    assert_eq!(view["branch"]["name"], "Downtown Branch");

    let director = login_token(&server, "director@hotel.com").await;
    let view: Value = server
        .get("/api/me/view")
        .add_header(header::AUTHORIZATION, bearer(&director))
        .await
        .json();
    assert_eq!(view["role"], "director");
    assert_eq!(view["branches"].as_array().unwrap().len(), 5);
    let staff = view["staff"].as_array().unwrap();
    assert_eq!(staff.len(), 2);
    assert!(staff.iter().all(|u| u["role"] != "client"));
}

#[tokio::test]
async fn demo_view_needs_no_session() {
    let server = setup_test_app().await;

    let res = server
        .get("/api/demo/view")
        .add_query_param("email", "director@hotel.com")
        .add_query_param("role", "director")
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let view: Value = res.json();
    assert_eq!(view["stats"]["totalRooms"], 150);
    assert_eq!(view["stats"]["monthlyRevenue"], 850000.0);

    let view: Value = server
        .get("/api/demo/view")
        .add_query_param("email", "admin@hotel.com")
        .add_query_param("role", "admin")
        .add_query_param("branchId", "branch-1")
        .await
        .json();
    assert_eq!(view["complaints"].as_array().unwrap().len(), 2);

    let res = server
        .get("/api/demo/view")
        .add_query_param("email", "x@hotel.com")
        .add_query_param("role", "owner")
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}
