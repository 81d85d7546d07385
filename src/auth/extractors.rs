use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use tracing::{error, warn};

use super::dto::{JwtKeys, User};
use crate::state::AppState;

/// The signed-in user. The bearer token must name the user in the session slot.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing Authorization header".to_string()))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "invalid auth scheme".to_string()))?;

        let claims = JwtKeys::from_ref(state).verify(token).map_err(|_| {
            warn!("invalid or expired token");
            (StatusCode::UNAUTHORIZED, "invalid or expired token".to_string())
        })?;

        let user = state.store.load_user().await.map_err(|e| {
            error!(error = %e, "load session user failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "session unavailable".to_string())
        })?;

        match user {
            Some(u) if u.id == claims.sub => Ok(CurrentUser(u)),
            _ => {
                warn!(user_id = %claims.sub, "token does not match active session");
                Err((StatusCode::UNAUTHORIZED, "session ended".into()))
            }
        }
    }
}
