pub mod handlers;
pub mod repo;
pub mod state;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::session_routes()
}
