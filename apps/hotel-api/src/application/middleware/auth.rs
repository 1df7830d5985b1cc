use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use hotel_core::domain::{User, UserRole};
use hotel_core::views::Viewer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::AppState;
use crate::application::ApiError;

/// The caller behind a bearer token. Cached at login and refreshed from the
/// user record on every request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
    pub branch_id: Option<String>,
}

impl Session {
    pub fn viewer(&self) -> Viewer {
        Viewer {
            email: self.email.clone(),
            role: self.role,
            branch_id: self.branch_id.clone(),
        }
    }
}

/// The raw bearer token of the current request.
#[derive(Clone, Debug)]
pub struct SessionToken(pub String);

pub fn session_key(token: &str) -> String {
    format!("session:{token}")
}

/// Resolve the bearer token to a live `Session` and attach it to the request.
pub async fn session_auth(
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

    let cached = app_state
        .cache
        .get(&session_key(&token))
        .await
        .map_err(|e| {
            // Cannot confirm the token, so treat it as unknown
            warn!("Cache error during session lookup: {}", e);
            ApiError::Unauthorized("session could not be verified".into())
        })?
        .ok_or_else(|| ApiError::Unauthorized("unknown or expired session".into()))?;

    let issued = serde_json::from_slice::<Session>(&cached).map_err(|e| {
        warn!("Failed to deserialize cached session: {}", e);
        ApiError::Unauthorized("unknown or expired session".into())
    })?;

    // Role, branch and status may have changed since login
    let user = app_state.hotel.users().get_by_id(&issued.user_id).await?;
    let Some(user) = user.filter(User::is_active) else {
        if let Err(e) = app_state.cache.delete(&session_key(&token)).await {
            warn!("Failed to drop session of {}: {}", issued.email, e);
        }
        info!("Session of {} revoked: account removed or inactive", issued.email);
        return Err(ApiError::Unauthorized("account is no longer active".into()));
    };
    let session = Session {
        user_id: user.id,
        email: user.email,
        role: user.role,
        branch_id: user.branch_id,
    };

    debug!("Session authenticated for {}", session.email);
    req.extensions_mut().insert(session);
    req.extensions_mut().insert(SessionToken(token));
    Ok(next.run(req).await)
}
