//! Reconstructs movement trips from raw device location samples and
//! exports them as a styled GeoJSON `FeatureCollection`.

pub mod features;
pub mod geo;
pub mod input;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod segment;
pub mod stats;
