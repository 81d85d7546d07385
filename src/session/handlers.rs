use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::state::{Action, SessionSummary, View};
use crate::{auth::extractors::CurrentUser, state::AppState};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/navigate", post(navigate))
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub view: View,
}

#[instrument(skip(state))]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSummary> {
    Json(state.session.read().await.summary())
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn navigate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<NavigateRequest>,
) -> Json<SessionSummary> {
    let next = state.dispatch(Action::Navigate(body.view)).await;
    Json(next.summary())
}
