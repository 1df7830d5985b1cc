use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use hotel_core::{
    Cache, CoreError,
    dashboard::{BranchStats, Dashboard, GlobalStats},
    demo,
    domain::Entity,
    views::{self, RoleView, Viewer},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, warn};
use uuid::Uuid;

use super::ApiError;
use super::authz::{Requirement, authorize};
use super::middleware::Session;
use crate::AppState;

// Dashboard stats live under `q:v1:dashboard:{scope}@{generation}`. A write
// bumps the scope's generation rather than deleting the entry, so a
// computation that began before the write stores under a generation no
// reader asks for.
pub const GLOBAL_SCOPE: &str = "global";

pub fn branch_scope(branch_id: &str) -> String {
    format!("branch:{branch_id}")
}

fn generation_key(scope: &str) -> String {
    format!("q:v1:dashboard:{scope}:gen")
}

/// Current cache key for a stats scope.
pub async fn stats_key(cache: &dyn Cache, scope: &str) -> String {
    let generation = match cache.get(&generation_key(scope)).await {
        Ok(Some(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(None) => "0".to_string(),
        Err(e) => {
            warn!("Failed to read stats generation for {}: {}", scope, e);
            "0".to_string()
        }
    };
    format!("q:v1:dashboard:{scope}@{generation}")
}

pub async fn bump_generation(cache: &dyn Cache, scope: &str) -> Result<(), CoreError> {
    let generation = Uuid::new_v4().simple().to_string();
    cache
        .set(&generation_key(scope), generation.as_bytes(), None)
        .await
}

// GET /health
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// GET /api/{collection}[?field=value]
pub async fn list_entities<E: Entity>(
    State(app_state): State<AppState>,
    Query(filter): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = app_state.hotel.repository::<E>();
    let records = match filter.len() {
        0 => repo.get_all().await?,
        1 => {
            let Some((field, value)) = filter.into_iter().next() else {
                return Err(ApiError::BadRequest("empty filter".into()));
            };
            if !E::FILTERS.contains(&field.as_str()) {
                return Err(ApiError::BadRequest(format!(
                    "{} cannot be filtered by {}; use one of {:?}",
                    E::COLLECTION,
                    field,
                    E::FILTERS
                )));
            }
            repo.get_by_filter(&field, value).await?
        }
        _ => {
            return Err(ApiError::BadRequest(
                "only one filter may be given".into(),
            ));
        }
    };

    Ok(Json(json!({
        "data": records,
        "returned": records.len(),
    })))
}

// GET /api/{collection}/{id}
pub async fn get_entity<E: Entity>(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<E>, ApiError> {
    app_state
        .hotel
        .repository::<E>()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::NotFound(format!("{}/{}", E::COLLECTION, id)).into())
}

/// Serve `key` from the cache, or compute it and cache it for `ttl_seconds`.
async fn cached<T, F>(
    app_state: &AppState,
    key: &str,
    ttl_seconds: u64,
    compute: F,
) -> Result<T, CoreError>
where
    T: Serialize + DeserializeOwned,
    F: Future<Output = Result<T, CoreError>>,
{
    if let Ok(Some(bytes)) = app_state.cache.get(key).await {
        if let Ok(hit) = serde_json::from_slice::<T>(&bytes) {
            debug!("cache hit key={}", key);
            return Ok(hit);
        }
    }

    let value = compute.await?;
    match serde_json::to_vec(&value) {
        Ok(bytes) => {
            if let Err(e) = app_state.cache.set(key, &bytes, Some(ttl_seconds)).await {
                warn!("Failed to cache {}: {}", key, e);
            }
        }
        Err(e) => warn!("Failed to encode {} for caching: {}", key, e),
    }
    Ok(value)
}

// GET /api/dashboard/global
pub async fn handle_global_stats(
    State(app_state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<GlobalStats>, ApiError> {
    authorize(&session, Requirement::DirectorOnly)?;

    // Key first: the generation must predate the computation
    let key = stats_key(app_state.cache.as_ref(), GLOBAL_SCOPE).await;
    let dashboard = Dashboard::new(app_state.hotel.clone());
    let stats = cached(
        &app_state,
        &key,
        app_state.stats_ttl_seconds,
        dashboard.global_stats(),
    )
    .await?;
    Ok(Json(stats))
}

// GET /api/dashboard/branches/{branch_id}
pub async fn handle_branch_stats(
    State(app_state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(branch_id): Path<String>,
) -> Result<Json<BranchStats>, ApiError> {
    authorize(
        &session,
        Requirement::BranchAccess {
            branch_id: branch_id.clone(),
        },
    )?;

    let key = stats_key(app_state.cache.as_ref(), &branch_scope(&branch_id)).await;
    let dashboard = Dashboard::new(app_state.hotel.clone());
    let stats = cached(
        &app_state,
        &key,
        app_state.stats_ttl_seconds,
        dashboard.branch_stats(&branch_id),
    )
    .await?;
    Ok(Json(stats))
}

// GET /api/me
pub async fn handle_me(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}

// GET /api/me/view
pub async fn handle_my_view(
    State(app_state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<RoleView>, ApiError> {
    let view = views::load_view(&app_state.hotel, &session.viewer(), Utc::now().date_naive()).await?;
    Ok(Json(view))
}

// GET /api/demo/view?email=..&role=..&branchId=..
pub async fn handle_demo_view(Query(viewer): Query<Viewer>) -> (StatusCode, Json<RoleView>) {
    (StatusCode::OK, Json(demo::demo_view(&viewer)))
}
