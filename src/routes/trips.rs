use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::Locale;
use serde::Deserialize;
use tracing::{error, info};

use crate::{
    error::AppError,
    models::{
        month::group_by_month,
        trip::{format_departure, parse_departure, NewTrip, Trip},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(trips_list))
        .route("/trips", post(trip_submit))
}

#[derive(Clone)]
struct TripCard {
    origin: String,
    destination: String,
    departure: String,
    distance: String,
    comment: String,
    has_comment: bool,
}

#[derive(Clone)]
struct MonthSection {
    label: String,
    total_km: i64,
    trips: Vec<TripCard>,
}

#[derive(Template)]
#[template(path = "trips/list.html")]
struct TripsListTemplate {
    loading: bool,
    months: Vec<MonthSection>,
    modal_open: bool,
    form: TripForm,
    show_error: bool,
    error_message: String,
}

#[derive(Deserialize)]
struct ListQuery {
    add: Option<String>,
}

async fn trips_list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let modal_open = query.add.is_some();
    render_page(&state, modal_open, TripForm::default(), None, StatusCode::OK).await
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TripForm {
    pub departure_date_time: String,
    pub origin: String,
    pub destination: String,
    pub distance_km: String,
    pub comment: String,
}

impl TripForm {
    /// Checks the required fields and turns the raw form strings into an
    /// insertable row.
    pub fn to_new_trip(&self) -> Result<NewTrip, AppError> {
        let departure = required(&self.departure_date_time, "la date de départ")?;
        let origin = required(&self.origin, "l'origine")?;
        let destination = required(&self.destination, "la destination")?;
        let distance_raw = required(&self.distance_km, "la distance")?;

        if parse_departure(&departure).is_none() {
            return Err(AppError::BadRequest(format!(
                "Date de départ invalide : {departure}"
            )));
        }

        let distance_km = distance_raw
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|km| km.is_finite() && *km >= 0.0)
            .ok_or_else(|| AppError::BadRequest(format!("Distance invalide : {distance_raw}")))?;

        Ok(NewTrip {
            departure_date_time: departure,
            origin,
            destination,
            distance_km,
            comment: normalize_optional(Some(self.comment.clone())),
        })
    }
}

async fn trip_submit(
    State(state): State<AppState>,
    Form(form): Form<TripForm>,
) -> Result<Response, AppError> {
    let new_trip = match form.to_new_trip() {
        Ok(new_trip) => new_trip,
        Err(AppError::BadRequest(msg)) => {
            return Ok(render_page(&state, true, form, Some(msg), StatusCode::BAD_REQUEST).await)
        }
        Err(err) => return Err(err),
    };

    match state.trips.insert_trip(&new_trip).await {
        Ok(trip) => {
            info!(id = trip.id, origin = %trip.origin, destination = %trip.destination, "trip added");
            Ok(Redirect::to("/").into_response())
        }
        Err(err) => {
            error!("saving trip failed: {err}");
            Ok(render_page(&state, true, form, None, StatusCode::BAD_GATEWAY).await)
        }
    }
}

async fn render_page(
    state: &AppState,
    modal_open: bool,
    form: TripForm,
    error_message: Option<String>,
    status: StatusCode,
) -> Response {
    let (loading, months) = match state.trips.list_trips().await {
        Ok(trips) => (false, month_sections(trips, state.config.locale)),
        Err(err) => {
            error!("loading trips failed: {err}");
            (true, Vec::new())
        }
    };

    (
        status,
        AskamaTemplateResponse::into_response(TripsListTemplate {
            loading,
            months,
            modal_open,
            form,
            show_error: error_message.is_some(),
            error_message: error_message.unwrap_or_default(),
        }),
    )
        .into_response()
}

fn month_sections(trips: Vec<Trip>, locale: Locale) -> Vec<MonthSection> {
    group_by_month(trips, locale)
        .into_iter()
        .map(|group| MonthSection {
            label: group.label,
            total_km: group.total_km,
            trips: group
                .trips
                .into_iter()
                .map(|trip| trip_card(trip, locale))
                .collect(),
        })
        .collect()
}

fn trip_card(trip: Trip, locale: Locale) -> TripCard {
    let departure = trip
        .departure()
        .map(|departure| format_departure(departure, locale))
        .unwrap_or_else(|| trip.departure_date_time.clone());
    let comment = normalize_optional(trip.comment);
    TripCard {
        origin: trip.origin,
        destination: trip.destination,
        departure,
        distance: trip.distance_km.to_string(),
        has_comment: comment.is_some(),
        comment: comment.unwrap_or_default(),
    }
}

fn required(value: &str, label: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::BadRequest(format!("Merci de renseigner {label}.")))
    } else {
        Ok(trimmed.to_string())
    }
}

fn normalize_optional(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
