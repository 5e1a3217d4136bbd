//! End-to-end batch run: read, validate, segment, write.

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::features::build_feature_collection;
use crate::input::{open_input, read_records};
use crate::output::{RejectSink, write_json};
use crate::parser::{Point, RawRecord, parse_record};
use crate::segment::segment_points;

pub const DEFAULT_INPUT: &str = "input.csv";
pub const DEFAULT_REJECTS: &str = "rejects.log";
pub const DEFAULT_OUTPUT: &str = "trips.geojson";

/// File locations for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub rejects: PathBuf,
    pub output: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT.into(),
            rejects: DEFAULT_REJECTS.into(),
            output: DEFAULT_OUTPUT.into(),
        }
    }
}

/// Counts from a completed run. `accepted + rejected == records`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub records: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub trips: usize,
    pub output: PathBuf,
}

/// Validates `records` in order, sending each failure to `rejects`.
pub fn validate_records<W: Write>(
    records: &[RawRecord],
    rejects: &mut RejectSink<W>,
) -> Result<Vec<Point>> {
    let mut points = Vec::with_capacity(records.len());

    for record in records {
        match parse_record(record) {
            Ok(point) => points.push(point),
            Err(reason) => {
                debug!(line = record.line, %reason, "Record rejected");
                rejects.append(record)?;
            }
        }
    }

    Ok(points)
}

/// Runs the whole pipeline once.
///
/// # Errors
///
/// Fails before creating any file if the input cannot be opened. Later I/O
/// failures also abort the run. Invalid records never do.
#[tracing::instrument(skip_all, fields(input = %config.input.display()))]
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let mut reader = open_input(&config.input)?;
    let mut rejects = RejectSink::create(&config.rejects)?;

    let records = read_records(&mut reader)?;
    drop(reader);

    let points = validate_records(&records, &mut rejects)?;
    let rejected = rejects.count();
    rejects.finish()?;

    let accepted = points.len();
    let trips = segment_points(points);
    let collection = build_feature_collection(&trips)?;
    write_json(&config.output, &collection)?;

    let summary = RunSummary {
        records: records.len(),
        accepted,
        rejected,
        trips: trips.len(),
        output: config.output.clone(),
    };

    info!(
        records = summary.records,
        accepted = summary.accepted,
        rejected = summary.rejected,
        trips = summary.trips,
        output = %summary.output.display(),
        "Run complete"
    );

    Ok(summary)
}
