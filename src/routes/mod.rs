pub mod api;
pub mod trips;

use axum::Router;
use tower_http::services::ServeDir;

use crate::{error::AppError, state::AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(trips::router())
        .nest("/api", api::router())
        .nest_service("/static", ServeDir::new("static"))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}
