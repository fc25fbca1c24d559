use crate::models::trip::Trip;

/// Total distance of `trips` in whole kilometres.
///
/// Rounds half away from zero, so an exact 15.5 km total reads as 16.
pub fn sum_distance(trips: &[Trip]) -> i64 {
    let total: f64 = trips.iter().map(|trip| trip.distance_km).sum();
    total.round() as i64
}
