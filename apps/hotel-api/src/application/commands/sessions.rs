use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use hotel_core::{
    CoreError,
    domain::{UserPatch, UserRole},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::application::ApiError;
use crate::application::authz::{Requirement, authorize};
use crate::application::middleware::{Session, SessionToken, session_key};

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub role: UserRole,
    pub branch_id: Option<String>,
    pub expires_in: u64,
}

// POST /api/sessions
pub async fn handle_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest("email and password are required".into()));
    }

    info!("Login attempt for {}", email);
    let users = state.hotel.users();
    // Same answer for an unknown email and a wrong password
    let rejected = || ApiError::Unauthorized("invalid email or password".into());
    let user = users.by_email(email).await?.ok_or_else(rejected)?;
    if !state.credentials.verify(&user.id, &payload.password).await? {
        return Err(rejected());
    }
    if !user.is_active() {
        return Err(ApiError::Forbidden(format!("account {} is inactive", user.email)));
    }

    let token = format!("sess-{}", Uuid::new_v4());
    let session = Session {
        user_id: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        branch_id: user.branch_id.clone(),
    };
    let bytes = serde_json::to_vec(&session)
        .map_err(|e| CoreError::Serialization(e.to_string()))?;
    state
        .cache
        .set(&session_key(&token), &bytes, Some(state.session_ttl_seconds))
        .await?;

    let stamp = UserPatch {
        last_login: Some(Utc::now().to_rfc3339()),
        ..UserPatch::default()
    };
    if let Err(e) = users.update(&user.id, &stamp).await {
        // Session is already issued; login succeeds without the stamp
        warn!("Failed to record login time for {}: {}", user.id, e);
    }

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token,
            user_id: user.id,
            role: user.role,
            branch_id: user.branch_id,
            expires_in: state.session_ttl_seconds,
        }),
    ))
}

// DELETE /api/sessions/current
pub async fn handle_logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<StatusCode, ApiError> {
    state.cache.delete(&session_key(&token)).await?;
    info!("Session closed for {}", session.email);
    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/users/{id}/password
pub async fn handle_set_password(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<String>,
    Json(payload): Json<PasswordRequest>,
) -> Result<StatusCode, ApiError> {
    authorize(
        &session,
        Requirement::SelfOrDirector {
            user_id: user_id.clone(),
        },
    )?;
    if payload.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    if state.hotel.users().get_by_id(&user_id).await?.is_none() {
        return Err(CoreError::NotFound(format!("users/{user_id}")).into());
    }

    state.credentials.set_password(&user_id, &payload.password).await?;
    info!("{} set the password of {}", session.email, user_id);
    Ok(StatusCode::NO_CONTENT)
}
