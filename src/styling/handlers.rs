use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    app::INTERNAL_ERROR_MESSAGE,
    auth::extractors::CurrentUser,
    session::state::{Action, View},
    state::AppState,
};

use super::dto::ShareResponse;
use super::error::StylingError;
use super::services::generate_and_record;
use super::shopping::{keyword_links, share_text, whatsapp_link};
use super::types::{StylingRequest, StylingResult};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(list_history))
        .route("/history/:id", get(get_history_entry))
        .route("/history/:id/share", get(share_history_entry))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/stylings", post(create_styling))
        // room for over-limit photos so validation, not the body limit, rejects them
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}

// --- handlers ---

/// POST /stylings { image, gender, occasion, age, eventDetails, budget?, colorPreference? }
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_styling(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<StylingRequest>,
) -> Result<(StatusCode, HeaderMap, Json<StylingResult>), (StatusCode, String)> {
    let result = generate_and_record(&state, &user, body)
        .await
        .map_err(styling_error)?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/history/{}", result.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }

    Ok((StatusCode::CREATED, headers, Json(result)))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<StylingResult>>, (StatusCode, String)> {
    let history = state.store.load_history(user.id).await.map_err(|e| {
        error!(error = %e, "load history failed");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.into())
    })?;
    state.dispatch(Action::Navigate(View::History)).await;
    Ok(Json(history))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_history_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StylingResult>, (StatusCode, String)> {
    let result = find_entry(&state, user.id, id).await?;
    state.dispatch(Action::SetResult(result.clone())).await;
    Ok(Json(result))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn share_history_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ShareResponse>, (StatusCode, String)> {
    let result = find_entry(&state, user.id, id).await?;
    Ok(Json(ShareResponse {
        text: share_text(&result),
        whatsapp_url: whatsapp_link(&result),
        links: keyword_links(&result),
    }))
}

async fn find_entry(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> Result<StylingResult, (StatusCode, String)> {
    match state.store.find_history_entry(user_id, id).await {
        Ok(Some(r)) => Ok(r),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Styling result not found".into())),
        Err(e) => {
            error!(error = %e, %id, "load history entry failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.into()))
        }
    }
}

fn styling_error(e: StylingError) -> (StatusCode, String) {
    match e {
        StylingError::Validation(v) => (StatusCode::BAD_REQUEST, v.to_string()),
        StylingError::Generation(g) => (StatusCode::BAD_GATEWAY, g.user_message().to_string()),
        StylingError::Store(s) => {
            error!(error = %s, "store failure while recording styling");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.into())
        }
    }
}
