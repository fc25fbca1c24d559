use chrono::{DateTime, Local, Locale, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A logged trip, in the camelCase shape used everywhere past the backend
/// gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: i64,
    /// Kept as the backend sent it; `timestamp` and `timestamptz` columns
    /// serialize differently.
    #[serde(default)]
    pub created_at: Option<String>,
    pub departure_date_time: String,
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Trip {
    pub fn departure(&self) -> Option<NaiveDateTime> {
        parse_departure(&self.departure_date_time)
    }
}

/// Row sent to the backend on insert. Field names are the table's column
/// names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTrip {
    pub departure_date_time: String,
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses the timestamps the backend and the `datetime-local` input produce.
///
/// Values carrying an offset are converted to the server's local time zone,
/// so a trip close to midnight at a month boundary is grouped under the
/// server's month. Naive values are taken as wall-clock time unchanged.
pub fn parse_departure(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// "sam. 3 oct. 2026 08:30" style label for a trip card.
pub fn format_departure(departure: NaiveDateTime, locale: Locale) -> String {
    Utc.from_utc_datetime(&departure)
        .format_localized("%a %-d %b %Y %H:%M", locale)
        .to_string()
}
