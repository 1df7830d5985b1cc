use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use hotel_core::{
    Cache, CoreError,
    domain::{Entity, User},
};
use serde_json::json;
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::AppState;
use crate::application::ApiError;
use crate::application::authz::{WriteAccess, authorize};
use crate::application::middleware::Session;
use crate::application::query::{GLOBAL_SCOPE, bump_generation, branch_scope};

/// Retire the cached dashboard figures a write may have changed: the global
/// stats, plus the stats of every touched branch.
pub async fn invalidate_stats<'a>(
    cache: &dyn Cache,
    branches: impl IntoIterator<Item = Option<&'a str>>,
) {
    let mut scopes = BTreeSet::from([GLOBAL_SCOPE.to_string()]);
    scopes.extend(branches.into_iter().flatten().map(branch_scope));
    for scope in scopes {
        // Stale stats age out with their TTL anyway
        if let Err(e) = bump_generation(cache, &scope).await {
            warn!("Failed to invalidate {} stats: {}", scope, e);
        }
    }
}

/// The `branchId` a patch moves a record to, if it sets one.
fn patched_branch<E: Entity>(patch: &E::Patch) -> Option<String> {
    serde_json::to_value(patch)
        .ok()
        .and_then(|fields| fields.get("branchId")?.as_str().map(String::from))
}

// POST /api/{collection}
pub async fn create_entity<E: WriteAccess>(
    State(app_state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(draft): Json<E::Draft>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = E::draft_branch_scope(&draft);
    authorize(&session, E::write_requirement(scope))?;

    let id = app_state.hotel.repository::<E>().create(&draft).await?;
    info!("{} created {}/{}", session.email, E::COLLECTION, id);

    invalidate_stats(app_state.cache.as_ref(), [scope]).await;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// PATCH /api/{collection}/{id}
pub async fn update_entity<E: WriteAccess>(
    State(app_state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(patch): Json<E::Patch>,
) -> Result<StatusCode, ApiError> {
    let repo = app_state.hotel.repository::<E>();
    let previous = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("{}/{}", E::COLLECTION, id)))?;
    let previous_scope = previous.branch_scope().map(String::from);
    let moved_to = patched_branch::<E>(&patch);

    // Both the branch it leaves and the one it joins
    authorize(&session, E::write_requirement(previous_scope.as_deref()))?;
    if moved_to.is_some() && moved_to != previous_scope {
        authorize(&session, E::write_requirement(moved_to.as_deref()))?;
    }

    repo.update(&id, &patch).await?;
    info!("{} updated {}/{}", session.email, E::COLLECTION, previous.id());

    invalidate_stats(
        app_state.cache.as_ref(),
        [previous_scope.as_deref(), moved_to.as_deref()],
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/{collection}/{id}
pub async fn delete_entity<E: WriteAccess>(
    State(app_state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let repo = app_state.hotel.repository::<E>();
    let Some(record) = repo.get_by_id(&id).await? else {
        // Already gone: fine for anyone who could write in their own branch
        authorize(&session, E::write_requirement(session.branch_id.as_deref()))?;
        return Ok(StatusCode::NO_CONTENT);
    };
    authorize(&session, E::write_requirement(record.branch_scope()))?;

    repo.delete(record.id()).await?;
    if E::COLLECTION == User::COLLECTION {
        app_state.credentials.forget(record.id()).await?;
    }
    info!("{} deleted {}/{}", session.email, E::COLLECTION, record.id());

    invalidate_stats(app_state.cache.as_ref(), [record.branch_scope()]).await;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::query::stats_key;
    use hotel_core::adapters::InMemoryCache;

    #[tokio::test]
    async fn test_stats_computed_before_a_write_are_never_served() {
        let cache = InMemoryCache::default();
        let before = stats_key(&cache, &branch_scope("branch-1")).await;
        let global_before = stats_key(&cache, GLOBAL_SCOPE).await;

        invalidate_stats(&cache, [Some("branch-1"), None]).await;
        // A computation that started before the write finishes after it
        cache.set(&before, b"stale", Some(30)).await.unwrap();

        let after = stats_key(&cache, &branch_scope("branch-1")).await;
        assert_ne!(before, after);
        assert_eq!(cache.get(&after).await.unwrap(), None);
        assert_ne!(global_before, stats_key(&cache, GLOBAL_SCOPE).await);

        // Untouched branches keep their generation
        assert_eq!(
            stats_key(&cache, &branch_scope("branch-2")).await,
            "q:v1:dashboard:branch:branch-2@0"
        );
    }
}
