use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    camelize::to_camel_case,
    config::AppConfig,
    error::AppError,
    models::trip::{NewTrip, Trip},
};

const BASE_COLUMNS: &str = "id,departure_date_time,origin,destination,distance_km";
const ORDER_NEWEST_FIRST: &str = "departure_date_time.desc";

/// Access to the trips table through the backend's PostgREST API.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    endpoint: Arc<Url>,
    api_key: Arc<str>,
    with_comment: bool,
}

#[derive(Deserialize)]
struct BackendErrorBody {
    message: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let http = Client::builder()
            .build()
            .map_err(|err| AppError::Config(format!("cannot build http client: {err}")))?;
        let endpoint = table_endpoint(&config.supabase_url, &config.trips_table)?;
        Ok(Self {
            http,
            endpoint: Arc::new(endpoint),
            api_key: Arc::from(config.supabase_key.as_str()),
            with_comment: config.with_comment,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// All trips, newest departure first.
    pub async fn list_trips(&self) -> Result<Vec<Trip>, AppError> {
        let select = self.columns();
        let response = self
            .request(Method::GET)
            .query(&[("select", select.as_str()), ("order", ORDER_NEWEST_FIRST)])
            .send()
            .await
            .map_err(AppError::backend)?;
        let trips = read_trips(response).await?;
        debug!(count = trips.len(), "fetched trips");
        Ok(trips)
    }

    /// Inserts one row and returns it as stored by the backend.
    pub async fn insert_trip(&self, new_trip: &NewTrip) -> Result<Trip, AppError> {
        let mut row = new_trip.clone();
        if !self.with_comment {
            row.comment = None;
        }
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await
            .map_err(AppError::backend)?;
        let trip = read_trips(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Backend("insert returned no row".into()))?;
        debug!(id = trip.id, "inserted trip");
        Ok(trip)
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.http
            .request(method, self.endpoint.as_str())
            .header("apikey", &*self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn columns(&self) -> String {
        if self.with_comment {
            format!("{BASE_COLUMNS},comment")
        } else {
            BASE_COLUMNS.to_string()
        }
    }
}

fn table_endpoint(base: &Url, table: &str) -> Result<Url, AppError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::Config(format!("SUPABASE_URL cannot be used as a base: {base}")))?
        .pop_if_empty()
        .extend(["rest", "v1", table]);
    Ok(url)
}

async fn read_trips(response: Response) -> Result<Vec<Trip>, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<BackendErrorBody>(&body)
            .map(|parsed| parsed.message)
            .unwrap_or(body);
        return Err(AppError::Backend(format!("{status}: {detail}")));
    }
    let raw: Value = response.json().await.map_err(AppError::backend)?;
    serde_json::from_value(to_camel_case(raw)).map_err(AppError::backend)
}
