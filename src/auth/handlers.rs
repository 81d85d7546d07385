use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    app::INTERNAL_ERROR_MESSAGE,
    auth::{
        dto::{JwtKeys, LoginRequest, SessionResponse, User},
        extractors::CurrentUser,
        services::{fabricate_user, is_valid_email},
    },
    session::state::Action,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

/// Login and signup are the same stub: any well-formed email gets a fresh identity.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let user = fabricate_user(payload.name.as_deref(), &email);

    if let Err(e) = state.store.save_user(&user).await {
        error!(error = %e, "save session user failed");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.into()));
    }

    let access_token = JwtKeys::from_ref(&state).sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.into())
    })?;

    state.dispatch(Action::Login(user.clone())).await;

    info!(user_id = %user.id, email = %user.email, "user signed in");
    Ok(Json(SessionResponse { access_token, user }))
}

#[instrument(skip(state, user))]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, (StatusCode, String)> {
    state.store.clear_user().await.map_err(|e| {
        error!(error = %e, "clear session user failed");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.into())
    })?;
    state.dispatch(Action::Logout).await;
    info!(user_id = %user.id, "user signed out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(user))]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[cfg(test)]
mod me_tests {
    use super::*;

    #[test]
    fn session_response_serialization() {
        let response = SessionResponse {
            access_token: "t".into(),
            user: User {
                id: uuid::Uuid::new_v4(),
                name: "Test".into(),
                email: "test@example.com".into(),
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("accessToken"));
        assert!(json.contains("test@example.com"));
    }
}
