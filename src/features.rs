//! Styled GeoJSON features for finalized trips.

use anyhow::{Result, anyhow};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use serde::{Deserialize, Serialize};

use crate::segment::Trip;

/// Line colors, assigned to trips cyclically by output position.
pub const PALETTE: [&str; 6] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4",
];

pub const STROKE_WIDTH: u32 = 3;
pub const STROKE_OPACITY: u32 = 1;

/// Styling and metrics attached to each trip feature, in output key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripProperties {
    pub trip_id: String,
    pub stroke: String,
    #[serde(rename = "stroke-width")]
    pub stroke_width: u32,
    #[serde(rename = "stroke-opacity")]
    pub stroke_opacity: u32,
    pub distance_km: f64,
    pub duration_min: f64,
    pub avg_speed_kph: f64,
    pub max_speed_kph: f64,
}

impl TripProperties {
    pub fn for_trip(index: usize, trip: &Trip) -> Self {
        TripProperties {
            trip_id: trip.id.clone(),
            stroke: color_for(index).to_string(),
            stroke_width: STROKE_WIDTH,
            stroke_opacity: STROKE_OPACITY,
            distance_km: trip.stats.distance_km,
            duration_min: trip.stats.duration_min,
            avg_speed_kph: trip.stats.avg_speed_kph,
            max_speed_kph: trip.stats.max_speed_kph,
        }
    }

    /// Converts into a GeoJSON properties object.
    pub fn into_object(self) -> Result<JsonObject> {
        match serde_json::to_value(self)? {
            JsonValue::Object(map) => Ok(map),
            other => Err(anyhow!("trip properties serialized to non-object: {other}")),
        }
    }
}

/// Color for the trip at `index` (0-based) in the output.
pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Line over the trip's points as `[longitude, latitude]` positions.
///
/// A single-point trip gives a one-position line.
pub fn trip_geometry(trip: &Trip) -> Geometry {
    let positions = trip.points.iter().map(|p| vec![p.lon, p.lat]).collect();
    Geometry::new(Value::LineString(positions))
}

pub fn trip_feature(index: usize, trip: &Trip) -> Result<Feature> {
    Ok(Feature {
        bbox: None,
        geometry: Some(trip_geometry(trip)),
        id: None,
        properties: Some(TripProperties::for_trip(index, trip).into_object()?),
        foreign_members: None,
    })
}

/// One feature per trip, in trip order.
pub fn build_feature_collection(trips: &[Trip]) -> Result<FeatureCollection> {
    let features = trips
        .iter()
        .enumerate()
        .map(|(index, trip)| trip_feature(index, trip))
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}
