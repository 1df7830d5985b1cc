use axum::{
    Router,
    middleware,
    routing::{delete, get, patch, post, put},
};
use hotel_core::{
    Cache, CoreError, DocumentStore, Hotel, demo,
    domain::{Booking, Branch, Complaint, Room, User},
};
use http::StatusCode;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

pub mod application;
pub mod config;

use application::{
    authz::WriteAccess,
    commands::{
        entities::{create_entity, delete_entity, update_entity},
        sessions::{handle_login, handle_logout, handle_set_password},
    },
    credentials::Credentials,
    middleware::session_auth,
    query::{
        get_entity, handle_branch_stats, handle_demo_view, handle_global_stats, handle_health,
        handle_me, handle_my_view, list_entities,
    },
};

pub const DEFAULT_STATS_TTL_SECONDS: u64 = 30;
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 3600;

// Holds shared dependencies
#[derive(Clone)]
pub struct AppState {
    pub hotel: Hotel,
    pub credentials: Credentials,
    pub cache: Arc<dyn Cache>,
    pub stats_ttl_seconds: u64,
    pub session_ttl_seconds: u64,
}

impl AppState {
    /// State with the default cache lifetimes.
    pub fn new(store: Arc<dyn DocumentStore>, cache: Arc<dyn Cache>) -> Self {
        Self {
            hotel: Hotel::new(store.clone()),
            credentials: Credentials::new(store),
            cache,
            stats_ttl_seconds: DEFAULT_STATS_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }
}

/// Bundled sample records, plus the demo password on every bundled account.
pub async fn seed_demo(app_state: &AppState) -> Result<(), CoreError> {
    demo::seed(&app_state.hotel).await?;
    app_state.credentials.seed_demo().await
}

// GET /{collection} and GET /{collection}/{id} are open; writes need a session
fn with_entity_routes<E: WriteAccess>(
    router: Router<AppState>,
    app_state: &AppState,
) -> Router<AppState> {
    let collection_path = format!("/{}", E::COLLECTION);
    let item_path = format!("/{}/{{id}}", E::COLLECTION);
    router
        .route(
            &collection_path,
            get(list_entities::<E>).merge(
                post(create_entity::<E>).route_layer(middleware::from_fn_with_state(
                    app_state.clone(),
                    session_auth,
                )),
            ),
        )
        .route(
            &item_path,
            get(get_entity::<E>).merge(
                patch(update_entity::<E>)
                    .delete(delete_entity::<E>)
                    .route_layer(middleware::from_fn_with_state(
                        app_state.clone(),
                        session_auth,
                    )),
            ),
        )
}

pub fn create_app(app_state: AppState) -> Router {
    // Everything here needs a session
    let session_routes = Router::new()
        .route("/me", get(handle_me))
        .route("/me/view", get(handle_my_view))
        .route("/dashboard/global", get(handle_global_stats))
        .route("/dashboard/branches/{branch_id}", get(handle_branch_stats))
        .route("/sessions/current", delete(handle_logout))
        .route("/users/{id}/password", put(handle_set_password))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            session_auth,
        ));

    let mut api_routes = Router::new()
        .route("/sessions", post(handle_login))
        .route("/demo/view", get(handle_demo_view));
    api_routes = with_entity_routes::<Branch>(api_routes, &app_state);
    api_routes = with_entity_routes::<Room>(api_routes, &app_state);
    api_routes = with_entity_routes::<Booking>(api_routes, &app_state);
    api_routes = with_entity_routes::<Complaint>(api_routes, &app_state);
    api_routes = with_entity_routes::<User>(api_routes, &app_state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes.merge(session_routes))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(app_state)
}

pub fn map_core_error(err: &CoreError) -> StatusCode {
    let status = match err {
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Internal(_)
        | CoreError::Serialization(_)
        | CoreError::Deserialization(_)
        | CoreError::Infrastructure(_)
        | CoreError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("CoreError occurred: {:?}", err);
    } else {
        warn!("Request rejected: {}", err);
    }
    status
}
