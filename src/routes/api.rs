use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::error;

use crate::{
    error::AppError,
    models::month::{group_by_month, MonthGroup},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/trips", get(months))
}

#[derive(Serialize)]
struct MonthsResponse {
    months: Vec<MonthGroup>,
}

async fn months(State(state): State<AppState>) -> Result<Json<MonthsResponse>, AppError> {
    let trips = state.trips.list_trips().await.map_err(|err| {
        error!("loading trips failed: {err}");
        err
    })?;
    Ok(Json(MonthsResponse {
        months: group_by_month(trips, state.config.locale),
    }))
}
