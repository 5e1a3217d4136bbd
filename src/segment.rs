//! Splitting a time-ordered point stream into trips.
//!
//! Consecutive points stay in the same trip unless they are more than
//! [`MAX_GAP_MINUTES`] apart in time or more than [`MAX_GAP_KM`] apart in
//! space. Both limits are strict: a gap of exactly 25 minutes or exactly
//! 2 km does not split.

use tracing::debug;

use crate::geo::haversine_km;
use crate::parser::Point;
use crate::stats::TripStats;

/// Time gap above which a new trip starts.
pub const MAX_GAP_MINUTES: f64 = 25.0;

/// Distance gap above which a new trip starts.
pub const MAX_GAP_KM: f64 = 2.0;

/// A finalized trip: its points in time order and the stats derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: String,
    pub points: Vec<Point>,
    pub stats: TripStats,
}

impl Trip {
    /// Builds trip number `number` (1-based) and computes its stats.
    pub fn finalize(number: usize, points: Vec<Point>) -> Self {
        let stats = TripStats::from_points(&points);
        Trip {
            id: format!("trip_{number}"),
            points,
            stats,
        }
    }
}

/// Stable sort by resolved time; ties keep input order.
pub fn sort_points(points: &mut [Point]) {
    points.sort_by_key(|p| p.time);
}

/// Returns `true` if `cur` must open a new trip after `prev`.
pub fn is_trip_boundary(prev: &Point, cur: &Point) -> bool {
    let time_diff_minutes = (cur.time - prev.time) as f64 / 60.0;
    let distance_km = haversine_km(prev.lat, prev.lon, cur.lat, cur.lon);

    time_diff_minutes > MAX_GAP_MINUTES || distance_km > MAX_GAP_KM
}

/// Partitions already time-sorted `points` into trips.
///
/// Every point ends up in exactly one trip, in the order given.
pub fn split_trips(points: Vec<Point>) -> Vec<Trip> {
    let mut trips = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for point in points {
        if let Some(prev) = current.last() {
            if is_trip_boundary(prev, &point) {
                let finished = std::mem::take(&mut current);
                trips.push(close_trip(trips.len() + 1, finished));
            }
        }
        current.push(point);
    }

    if !current.is_empty() {
        trips.push(close_trip(trips.len() + 1, current));
    }

    trips
}

/// Sorts `points` by time, then splits them into trips.
pub fn segment_points(mut points: Vec<Point>) -> Vec<Trip> {
    sort_points(&mut points);
    split_trips(points)
}

fn close_trip(number: usize, points: Vec<Point>) -> Trip {
    let trip = Trip::finalize(number, points);
    debug!(
        trip_id = %trip.id,
        points = trip.points.len(),
        distance_km = trip.stats.distance_km,
        duration_min = trip.stats.duration_min,
        "Trip finalized"
    );
    trip
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64, time: i64) -> Point {
        Point {
            device_id: "dev".to_string(),
            lat,
            lon,
            timestamp: time.to_string(),
            time,
        }
    }

    #[test]
    fn test_no_points_no_trips() {
        assert!(split_trips(Vec::new()).is_empty());
    }

    #[test]
    fn test_single_point_single_trip() {
        let trips = split_trips(vec![point(1.0, 1.0, 100)]);

        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].id, "trip_1");
        assert_eq!(trips[0].points.len(), 1);
        assert_eq!(trips[0].stats, TripStats::default());
    }

    #[test]
    fn test_close_points_stay_together() {
        let points = vec![
            point(0.0, 0.0, 0),
            point(0.0, 0.001, 60),
            point(0.0, 0.002, 120),
        ];
        let trips = split_trips(points.clone());

        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].points, points);
    }

    #[test]
    fn test_one_degree_steps_split_every_point() {
        // ~111 km per step, far above the distance limit
        let trips = split_trips(vec![
            point(0.0, 0.0, 0),
            point(0.0, 1.0, 60),
            point(0.0, 2.0, 120),
        ]);

        assert_eq!(trips.len(), 3);
        assert!(trips.iter().all(|t| t.points.len() == 1));
    }

    #[test]
    fn test_exactly_25_minutes_does_not_split() {
        let trips = split_trips(vec![point(0.0, 0.0, 0), point(0.0, 0.0, 25 * 60)]);
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].stats.duration_min, 25.0);
    }

    #[test]
    fn test_just_over_25_minutes_splits() {
        let trips = split_trips(vec![point(0.0, 0.0, 0), point(0.0, 0.0, 25 * 60 + 1)]);
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].id, "trip_1");
        assert_eq!(trips[1].id, "trip_2");
    }

    #[test]
    fn test_distance_limit() {
        // 0.017 deg of latitude is ~1.89 km, 0.019 deg is ~2.11 km
        assert!(!is_trip_boundary(&point(0.0, 0.0, 0), &point(0.017, 0.0, 60)));
        assert!(is_trip_boundary(&point(0.0, 0.0, 0), &point(0.019, 0.0, 60)));
    }

    #[test]
    fn test_split_keeps_prev_in_closed_trip() {
        let trips = split_trips(vec![
            point(0.0, 0.0, 0),
            point(0.0, 0.001, 60),
            point(0.0, 0.001, 60 + 26 * 60),
            point(0.0, 0.002, 60 + 27 * 60),
        ]);

        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].points.len(), 2);
        assert_eq!(trips[0].points[1].time, 60);
        assert_eq!(trips[1].points.len(), 2);
        assert_eq!(trips[1].points[0].time, 60 + 26 * 60);
    }

    #[test]
    fn test_concatenated_trips_equal_input() {
        let mut points = Vec::new();
        let mut time = 0;
        for i in 0..40 {
            // every seventh step jumps 30 minutes, every eleventh jumps 5 km
            time += if i % 7 == 0 { 30 * 60 } else { 60 };
            let lat = if i % 11 == 0 { 0.05 * i as f64 } else { 0.0001 * i as f64 };
            points.push(point(lat, 0.0, time));
        }

        let trips = split_trips(points.clone());
        let flattened: Vec<Point> = trips.into_iter().flat_map(|t| t.points).collect();

        assert_eq!(flattened, points);
    }

    #[test]
    fn test_trip_ids_are_sequential() {
        let trips = split_trips(vec![
            point(0.0, 0.0, 0),
            point(0.0, 0.0, 3600),
            point(0.0, 0.0, 3660),
            point(0.0, 0.0, 7200 + 3660),
        ]);

        let ids: Vec<_> = trips.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["trip_1", "trip_2", "trip_3"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut a = point(0.0, 0.0, 100);
        a.device_id = "a".to_string();
        let mut b = point(0.0, 0.0, 100);
        b.device_id = "b".to_string();
        let c = point(0.0, 0.0, 50);

        let mut points = vec![a, b, c];
        sort_points(&mut points);

        let order: Vec<_> = points.iter().map(|p| p.device_id.as_str()).collect();
        assert_eq!(order, ["dev", "a", "b"]);
    }

    #[test]
    fn test_segment_points_sorts_first() {
        let trips = segment_points(vec![
            point(0.0, 0.002, 120),
            point(0.0, 0.0, 0),
            point(0.0, 0.001, 60),
        ]);

        assert_eq!(trips.len(), 1);
        let times: Vec<_> = trips[0].points.iter().map(|p| p.time).collect();
        assert_eq!(times, [0, 60, 120]);
    }
}
