use crate::geo::haversine_km;
use crate::parser::Point;

/// Kinematic summary of one trip, rounded to 2 decimal places.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TripStats {
    pub distance_km: f64,
    pub duration_min: f64,
    pub avg_speed_kph: f64,
    pub max_speed_kph: f64,
}

impl TripStats {
    /// Computes stats over consecutive pairs of `points`, which must be in
    /// time order. An empty or single-point slice yields all zeros.
    pub fn from_points(points: &[Point]) -> Self {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Self::default();
        };

        let duration_hours = (last.time - first.time) as f64 / 3600.0;

        let mut total_distance_km = 0.0;
        let mut max_speed_kph: f64 = 0.0;

        for pair in points.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            let distance = haversine_km(prev.lat, prev.lon, cur.lat, cur.lon);
            let hours = (cur.time - prev.time) as f64 / 3600.0;

            total_distance_km += distance;

            // Zero or negative elapsed time has no defined speed.
            if hours > 0.0 {
                max_speed_kph = max_speed_kph.max(distance / hours);
            }
        }

        let avg_speed_kph = if duration_hours > 0.0 {
            total_distance_km / duration_hours
        } else {
            0.0
        };

        TripStats {
            distance_km: round2(total_distance_km),
            duration_min: round2(duration_hours * 60.0),
            avg_speed_kph: round2(avg_speed_kph),
            max_speed_kph: round2(max_speed_kph),
        }
    }
}

/// Rounds to 2 decimal places, halves away from zero.
///
/// The scaled value is first cut to 15 significant digits, so inputs such as
/// `1.005` (stored as `1.00499999...`) round up to `1.01`.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    let pre_rounded = format!("{scaled:.14e}").parse::<f64>().unwrap_or(scaled);
    pre_rounded.round() / 100.0
}
