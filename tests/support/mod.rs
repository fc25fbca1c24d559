//! In-process stand-in for the hosted PostgREST endpoint of the trips table.
//!
//! Like PostgREST it only returns the columns named in `select`, sorts by the
//! `order` parameter and answers an insert with an empty body unless the
//! request asks for `Prefer: return=representation`.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, AtomicI64, Ordering},
        Arc, Mutex,
    },
};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

pub const API_KEY: &str = "bdd-anon-key";

/// What the gateway asked for on its latest calls.
#[derive(Debug, Clone, Default)]
pub struct SeenRequests {
    pub select: Option<String>,
    pub order: Option<String>,
    pub prefer: Option<String>,
}

#[derive(Default)]
struct FakeTable {
    rows: Mutex<Vec<Value>>,
    next_id: AtomicI64,
    failing: AtomicBool,
    seen: Mutex<SeenRequests>,
}

pub struct FakeBackend {
    addr: SocketAddr,
    table: Arc<FakeTable>,
}

impl FakeBackend {
    pub async fn start() -> anyhow::Result<Self> {
        let table = Arc::new(FakeTable::default());
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = Router::new()
            .route("/rest/v1/trips", get(list_rows).post(insert_rows))
            .with_state(table.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service()).await;
        });

        Ok(Self { addr, table })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_failing(&self, failing: bool) {
        self.table.failing.store(failing, Ordering::SeqCst);
    }

    /// Stores a snake_case row the way a previous insert would have.
    pub fn seed(&self, departure: &str, origin: &str, destination: &str, distance_km: f64) {
        let row = json!({
            "departure_date_time": departure,
            "origin": origin,
            "destination": destination,
            "distance_km": distance_km,
        });
        self.table.store(row);
    }

    pub fn rows(&self) -> Vec<Value> {
        self.table.rows.lock().expect("rows lock").clone()
    }

    pub fn seen(&self) -> SeenRequests {
        self.table.seen.lock().expect("seen lock").clone()
    }
}

impl FakeTable {
    fn store(&self, mut row: Value) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(fields) = row.as_object_mut() {
            fields.insert("id".into(), json!(id));
            // a `timestamp` column without time zone, as PostgREST renders it
            fields.insert("created_at".into(), json!("2026-10-19T10:00:00.123456"));
            fields.entry("comment").or_insert(Value::Null);
        }
        self.rows.lock().expect("rows lock").push(row.clone());
        row
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn reject(headers: &HeaderMap, table: &FakeTable) -> Option<Response> {
    let key_ok = headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(API_KEY);
    let bearer_ok = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {API_KEY}").as_str());
    if !key_ok || !bearer_ok {
        return Some(error_body(StatusCode::UNAUTHORIZED, "Invalid API key"));
    }
    if table.failing.load(Ordering::SeqCst) {
        return Some(error_body(
            StatusCode::SERVICE_UNAVAILABLE,
            "database is sleeping",
        ));
    }
    None
}

fn project(row: &Value, columns: &[&str]) -> Value {
    let fields: Map<String, Value> = columns
        .iter()
        .filter_map(|column| row.get(*column).map(|value| (column.to_string(), value.clone())))
        .collect();
    Value::Object(fields)
}

async fn list_rows(
    State(table): State<Arc<FakeTable>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    {
        let mut seen = table.seen.lock().expect("seen lock");
        seen.select = params.get("select").cloned();
        seen.order = params.get("order").cloned();
    }
    if let Some(rejection) = reject(&headers, &table) {
        return rejection;
    }

    let Some(select) = params.get("select") else {
        return error_body(StatusCode::BAD_REQUEST, "select is required");
    };
    let columns: Vec<&str> = select.split(',').collect();

    let mut rows = table.rows.lock().expect("rows lock").clone();
    let key = |row: &Value| {
        row["departure_date_time"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    };
    match params.get("order").map(String::as_str) {
        Some("departure_date_time.desc") => rows.sort_by(|a, b| key(b).cmp(&key(a))),
        Some("departure_date_time.asc") => rows.sort_by(|a, b| key(a).cmp(&key(b))),
        None => {}
        Some(other) => {
            return error_body(StatusCode::BAD_REQUEST, &format!("unsupported order {other}"))
        }
    }

    let projected: Vec<Value> = rows.iter().map(|row| project(row, &columns)).collect();
    Json(projected).into_response()
}

async fn insert_rows(
    State(table): State<Arc<FakeTable>>,
    headers: HeaderMap,
    Json(rows): Json<Vec<Value>>,
) -> Response {
    let prefer = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    table.seen.lock().expect("seen lock").prefer = prefer.clone();
    if let Some(rejection) = reject(&headers, &table) {
        return rejection;
    }
    let stored: Vec<Value> = rows.into_iter().map(|row| table.store(row)).collect();
    if prefer.as_deref() == Some("return=representation") {
        (StatusCode::CREATED, Json(stored)).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}
