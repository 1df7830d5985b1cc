use axum::http::HeaderValue;
use axum_test::TestServer;
use hotel_api::{AppState, create_app, seed_demo};
use hotel_core::{
    Cache, DocumentStore, Hotel,
    adapters::{InMemoryCache, InMemoryDocumentStore},
    demo::DEMO_PASSWORD,
    domain::{RoomPatch, RoomStatus},
};
use http::{StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;

/// Seeded server plus a handle on the same store, for writes that bypass HTTP.
async fn build_server() -> (TestServer, Hotel) {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::default());
    let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::default());
    let state = AppState::new(store, cache);
    seed_demo(&state).await.expect("seed demo data");
    let hotel = state.hotel.clone();

    let server = TestServer::new(create_app(state)).expect("start test server");
    (server, hotel)
}

async fn login(server: &TestServer, email: &str) -> HeaderValue {
    let res = server
        .post("/api/sessions")
        .json(&json!({ "email": email, "password": DEMO_PASSWORD }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED, "login {email}");
    let token = res.json::<Value>()["token"].as_str().unwrap().to_string();
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

#[tokio::test]
async fn dashboards_require_a_session() {
    let (server, _hotel) = build_server().await;

    let res = server.get("/api/dashboard/global").await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);

    let res = server
        .get("/api/dashboard/branches/branch-1")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer not-a-session"))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn director_sees_global_and_any_branch() {
    let (server, _hotel) = build_server().await;
    let auth = login(&server, "director@hotel.com").await;

    let res = server
        .get("/api/dashboard/global")
        .add_header(header::AUTHORIZATION, auth.clone())
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let stats: Value = res.json();
    assert_eq!(stats["totalBranches"], 5);
    assert_eq!(stats["totalRooms"], 6);
    assert_eq!(stats["bookedRooms"], 3);
    assert_eq!(stats["availableRooms"], 3);
    assert_eq!(stats["totalClients"], 1);
    assert_eq!(stats["totalStaff"], 1);
    assert_eq!(stats["activeAdmins"], 1);

    let res = server
        .get("/api/dashboard/branches/branch-3")
        .add_header(header::AUTHORIZATION, auth)
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let stats: Value = res.json();
    assert_eq!(stats["totalRooms"], 0);
    assert_eq!(stats["occupancy"], 0);
}

#[tokio::test]
async fn admin_is_scoped_to_own_branch() {
    let (server, _hotel) = build_server().await;
    let auth = login(&server, "admin@hotel.com").await;

    let res = server
        .get("/api/dashboard/branches/branch-1")
        .add_header(header::AUTHORIZATION, auth.clone())
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let stats: Value = res.json();
    assert_eq!(stats["totalRooms"], 6);
    assert_eq!(stats["occupiedRooms"], 3);
    assert_eq!(stats["occupancy"], 50);
    assert_eq!(stats["totalBookings"], 2);
    assert_eq!(stats["activeBookings"], 2);
    assert_eq!(stats["totalComplaints"], 2);
    assert_eq!(stats["pendingComplaints"], 1);

    let res = server
        .get("/api/dashboard/branches/branch-2")
        .add_header(header::AUTHORIZATION, auth.clone())
        .await;
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);

    let res = server
        .get("/api/dashboard/global")
        .add_header(header::AUTHORIZATION, auth)
        .await;
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn client_sees_no_dashboard() {
    let (server, _hotel) = build_server().await;
    let auth = login(&server, "client@hotel.com").await;

    let res = server
        .get("/api/dashboard/branches/branch-1")
        .add_header(header::AUTHORIZATION, auth)
        .await;
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn stats_are_cached_until_a_write_through_the_api() {
    let (server, hotel) = build_server().await;
    let auth = login(&server, "admin@hotel.com").await;
    let branch_stats = || {
        server
            .get("/api/dashboard/branches/branch-1")
            .add_header(header::AUTHORIZATION, auth.clone())
    };

    let before: Value = branch_stats().await.json();
    assert_eq!(before["occupiedRooms"], 3);

    // A write straight to the store is not seen while the cached entry lives
    let occupy = RoomPatch {
        status: Some(RoomStatus::Occupied),
        ..RoomPatch::default()
    };
    hotel.rooms().update("room-102", &occupy).await.unwrap();
    let cached: Value = branch_stats().await.json();
    assert_eq!(cached["occupiedRooms"], 3);

    // A write through the API drops the cached figures
    let res = server
        .patch("/api/rooms/room-105")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "status": "occupied", "guest": "Ana Lopez" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);

    let after: Value = branch_stats().await.json();
    assert_eq!(after["occupiedRooms"], 5);
    assert_eq!(after["occupancy"], 83);
}

#[tokio::test]
async fn creating_a_client_refreshes_global_stats() {
    let (server, _hotel) = build_server().await;
    let auth = login(&server, "director@hotel.com").await;

    let before: Value = server
        .get("/api/dashboard/global")
        .add_header(header::AUTHORIZATION, auth.clone())
        .await
        .json();

    let res = server
        .post("/api/users")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({
            "name": "Maria Garcia",
            "role": "client",
            "email": "maria@example.com",
            "branchId": "branch-2",
            "status": "active",
            "lastLogin": "Never"
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);

    let after: Value = server
        .get("/api/dashboard/global")
        .add_header(header::AUTHORIZATION, auth)
        .await
        .json();
    assert_eq!(after["totalClients"], before["totalClients"].as_u64().unwrap() + 1);
    assert_eq!(after["activeClients"], before["activeClients"].as_u64().unwrap() + 1);
}
