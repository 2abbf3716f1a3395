#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Artifact generation for the outbreak map presenter.
//!
//! The dashboard renderer is an external consumer; this crate writes
//! exactly what it reads:
//!
//! - `counts.csv` — the aggregated case table, one row per
//!   `(date, district, suburb)` bucket
//! - `layers_day_<N>.json` — one colored `GeoJSON` layer per percentage
//!   bin for the selected day (see [`layers`])
//! - `chart_<scenario>_<kind>.json` — bar-chart series per scenario and
//!   chart kind selection
//! - `metadata.json` — known date range, scenario set, and the bin
//!   boundary map
//!
//! All JSON artifacts are written atomically (temp file + rename) so a
//! crashed run never leaves a half-written file behind.

pub mod layers;

use std::io::BufWriter;
use std::path::Path;

use outbreak_map_aggregate::bins::PERCENT_BINS;
use outbreak_map_aggregate::charts::ChartData;
use outbreak_map_epidemic_models::{AggregatedTable, CaseTable, Scenario};
use thiserror::Error;

/// Errors from artifact generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The boundary file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    Geojson(#[from] geojson::Error),

    /// The boundary file parsed but has the wrong shape.
    #[error("Format error: {message}")]
    Format {
        /// Description of what was expected.
        message: String,
    },
}

/// Loads the district-boundary `GeoJSON` file.
///
/// # Errors
///
/// Returns [`GenerateError`] if the file cannot be read, is not valid
/// `GeoJSON`, or is not a `FeatureCollection`.
pub fn load_boundaries(path: &Path) -> Result<geojson::FeatureCollection, GenerateError> {
    let contents = std::fs::read_to_string(path)?;
    let geojson: geojson::GeoJson = contents.parse()?;

    match geojson {
        geojson::GeoJson::FeatureCollection(collection) => {
            log::info!(
                "Loaded {} boundary features from {}",
                collection.features.len(),
                path.display()
            );
            Ok(collection)
        }
        other => Err(GenerateError::Format {
            message: format!(
                "Expected a FeatureCollection in {}, found {}",
                path.display(),
                geojson_kind(&other)
            ),
        }),
    }
}

const fn geojson_kind(value: &geojson::GeoJson) -> &'static str {
    match value {
        geojson::GeoJson::Geometry(_) => "a bare Geometry",
        geojson::GeoJson::Feature(_) => "a single Feature",
        geojson::GeoJson::FeatureCollection(_) => "a FeatureCollection",
    }
}

/// Writes the aggregated table as `counts.csv` in the output directory.
///
/// Columns are `date,district,suburb` followed by the numeric columns in
/// case-table order; an absent suburb serializes as an empty field.
///
/// # Errors
///
/// Returns [`GenerateError`] if the file cannot be written.
pub fn write_counts_csv(table: &AggregatedTable, dir: &Path) -> Result<(), GenerateError> {
    let path = dir.join("counts.csv");
    let file = std::fs::File::create(&path)?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    let mut header = vec!["date".to_string(), "district".to_string(), "suburb".to_string()];
    header.extend(table.numeric_columns.iter().cloned());
    writer.write_record(&header)?;

    for (key, sums) in &table.buckets {
        let mut record = vec![
            key.date.to_string(),
            key.district.clone(),
            key.suburb.clone().unwrap_or_default(),
        ];
        record.extend(sums.iter().map(|v| format_value(*v)));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    log::info!("Wrote {} buckets to {}", table.buckets.len(), path.display());
    Ok(())
}

/// Formats a summed value, dropping the fractional part when integral.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Writes one chart selection as `chart_<scenario>_<kind>.json`.
///
/// # Errors
///
/// Returns [`GenerateError`] if serialization or the file write fails.
pub fn write_chart(chart: &ChartData, dir: &Path) -> Result<(), GenerateError> {
    let path = dir.join(format!("chart_{}_{}.json", chart.scenario.column(), chart.kind));
    write_json_atomic(&path, &serde_json::to_value(chart)?)?;
    log::info!("Chart artifact written: {}", path.display());
    Ok(())
}

/// Generates `metadata.json`: the presenter's startup context.
///
/// Contains the known day range of the case table, the scenario set
/// (column plus display label), and the bin boundary map
/// `label -> { lower, upper, color }`.
///
/// # Errors
///
/// Returns [`GenerateError`] if serialization or the file write fails.
pub fn write_metadata(cases: &CaseTable, dir: &Path) -> Result<(), GenerateError> {
    let (min_date, max_date) = cases
        .date_range()
        .map_or((None, None), |(lo, hi)| (Some(lo), Some(hi)));

    let scenarios: Vec<serde_json::Value> = Scenario::ALL
        .iter()
        .map(|s| {
            serde_json::json!({
                "column": s.column(),
                "label": s.label(),
                "baseline": s.is_baseline(),
            })
        })
        .collect();

    let mut bins = serde_json::Map::new();
    for bin in PERCENT_BINS {
        bins.insert(
            bin.label.to_string(),
            serde_json::json!({
                "lower": bin.lower,
                "upper": bin.upper,
                "color": bin.color,
            }),
        );
    }

    let metadata = serde_json::json!({
        "minDate": min_date,
        "maxDate": max_date,
        "scenarios": scenarios,
        "bins": bins,
    });

    let path = dir.join("metadata.json");
    write_json_atomic(&path, &metadata)?;
    log::info!("Presenter metadata generated: {}", path.display());
    Ok(())
}

/// Writes a JSON value to `path` via a temp file and rename.
fn write_json_atomic(path: &Path, value: &serde_json::Value) -> Result<(), GenerateError> {
    let tmp_path = path.with_extension("json.tmp");
    let contents = serde_json::to_string_pretty(value)?;
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
