use chrono::{Datelike, Locale, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::{calculator::sum_distance, models::trip::Trip};

pub const UNKNOWN_MONTH_LABEL: &str = "Date inconnue";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGroup {
    pub label: String,
    /// `None` for the bucket of trips whose departure does not parse.
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub total_km: i64,
    pub trips: Vec<Trip>,
}

/// Buckets trips by calendar month of departure.
///
/// Groups come out in order of first appearance, so a newest-first input
/// yields newest-first months. Unparseable departures end up in a trailing
/// group.
pub fn group_by_month(trips: Vec<Trip>, locale: Locale) -> Vec<MonthGroup> {
    let mut buckets: Vec<((i32, u32), Vec<Trip>)> = Vec::new();
    let mut unknown = Vec::new();

    for trip in trips {
        let Some(departure) = trip.departure() else {
            unknown.push(trip);
            continue;
        };
        let key = (departure.year(), departure.month());
        match buckets.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, items)) => items.push(trip),
            None => buckets.push((key, vec![trip])),
        }
    }

    let mut groups: Vec<MonthGroup> = buckets
        .into_iter()
        .map(|((year, month), trips)| MonthGroup {
            label: month_label(year, month, locale),
            year: Some(year),
            month: Some(month),
            total_km: sum_distance(&trips),
            trips,
        })
        .collect();

    if !unknown.is_empty() {
        groups.push(MonthGroup {
            label: UNKNOWN_MONTH_LABEL.to_string(),
            year: None,
            month: None,
            total_km: sum_distance(&unknown),
            trips: unknown,
        });
    }

    groups
}

fn month_label(year: i32, month: u32, locale: Locale) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| {
            Utc.from_utc_datetime(&midnight)
                .format_localized("%B %Y", locale)
                .to_string()
        })
        .unwrap_or_else(|| format!("{month:02}/{year}"))
}
