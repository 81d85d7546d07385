pub mod client;
mod dto;
pub mod error;
pub mod handlers;
pub mod prompt;
pub mod services;
pub mod shopping;
pub mod types;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
