//! Full pipeline orchestrator for the generate subcommand.
//!
//! Chains load -> resolve -> aggregate -> write in one synchronous pass.
//! Every run is a full recomputation over the immutable input files;
//! nothing incremental is kept between runs.

use std::path::Path;
use std::time::Instant;

use outbreak_map_aggregate::charts;
use outbreak_map_epidemic_models::{ChartKind, Scenario};
use outbreak_map_geocoder::{cache, resolve};

/// Runs the aggregation pipeline and writes the presenter artifacts.
///
/// Locations that fail to resolve are logged per `zid` and excluded;
/// they are never given a default district.
///
/// # Errors
///
/// Returns an error if any input cannot be loaded, the selected day is
/// outside the known range, or an artifact cannot be written.
pub fn run(
    cases_path: &Path,
    cache_path: &Path,
    boundaries_path: &Path,
    output_dir: &Path,
    day: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();

    let cases = outbreak_map_cases::load_case_table(cases_path)?;
    let cached = cache::load(cache_path)?;

    let (resolved, failures) = resolve::resolve_all(&cached);
    for (zid, err) in &failures {
        log::warn!("Location {zid} failed to resolve: {err}");
    }
    if !failures.is_empty() {
        log::warn!(
            "{} of {} cached locations failed to resolve and were excluded",
            failures.len(),
            cached.len()
        );
    }

    let aggregated = outbreak_map_aggregate::aggregate_cases(&cases, &resolved);

    let Some((min_day, max_day)) = cases.date_range() else {
        return Err("Case table is empty; nothing to generate".into());
    };
    let day = day.unwrap_or(max_day);
    if !(min_day..=max_day).contains(&day) {
        return Err(format!("Day {day} is outside the known range {min_day}-{max_day}").into());
    }

    std::fs::create_dir_all(output_dir)?;

    outbreak_map_generate::write_counts_csv(&aggregated, output_dir)?;

    let boundaries = outbreak_map_generate::load_boundaries(boundaries_path)?;
    outbreak_map_generate::layers::write_layers(&boundaries, day, output_dir)?;

    for scenario in Scenario::ALL {
        for kind in [ChartKind::Daily, ChartKind::Cumulative] {
            let chart = charts::chart_data(&cases, *scenario, kind, day);
            outbreak_map_generate::write_chart(&chart, output_dir)?;
        }
    }

    outbreak_map_generate::write_metadata(&cases, output_dir)?;

    log::info!(
        "Pipeline complete in {:.1}s: {}",
        started.elapsed().as_secs_f64(),
        output_dir.display()
    );
    Ok(())
}
