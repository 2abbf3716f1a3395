//! Bar-chart series for the dashboard.
//!
//! The dashboard shows per-day infection totals for a selected scenario,
//! either as raw daily counts or as a running total. A non-baseline
//! selection is charted next to the baseline run for comparison.

use std::collections::BTreeMap;

use outbreak_map_epidemic_models::{CaseTable, ChartKind, Scenario};
use serde::Serialize;

/// Series name for the baseline run.
const BASELINE_SERIES: &str = "Стандартный сценарий";

/// Series name for a non-baseline scenario charted against the baseline.
const COMPARISON_SERIES: &str = "Новый сценарий";

/// One bar of a chart series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Day number.
    pub date: u32,
    /// Summed (or cumulative) count for that day.
    pub value: f64,
}

/// A named per-day series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Display name.
    pub name: String,
    /// Source column the values were summed from.
    pub column: String,
    /// Points ordered by date ascending.
    pub points: Vec<ChartPoint>,
}

/// Chart data for one scenario/kind/day selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// Selected scenario.
    pub scenario: Scenario,
    /// Raw or cumulative.
    pub kind: ChartKind,
    /// Upper day bound; later rows are excluded.
    pub day: u32,
    /// The selected series, followed by the baseline when comparing.
    pub series: Vec<ChartSeries>,
}

/// Builds the chart for a scenario/kind/day selection.
///
/// Rows dated after `day` are excluded; the remaining rows are summed per
/// date, ascending. [`ChartKind::Cumulative`] replaces each value with
/// the running total, which is monotonically non-decreasing for
/// non-negative counts.
#[must_use]
pub fn chart_data(cases: &CaseTable, scenario: Scenario, kind: ChartKind, day: u32) -> ChartData {
    let series = if scenario.is_baseline() {
        vec![series_for(cases, scenario.column(), BASELINE_SERIES, kind, day)]
    } else {
        vec![
            series_for(cases, scenario.column(), COMPARISON_SERIES, kind, day),
            series_for(cases, Scenario::Sick.column(), BASELINE_SERIES, kind, day),
        ]
    };

    ChartData {
        scenario,
        kind,
        day,
        series,
    }
}

fn series_for(
    cases: &CaseTable,
    column: &str,
    name: &str,
    kind: ChartKind,
    day: u32,
) -> ChartSeries {
    let mut sums: BTreeMap<u32, f64> = BTreeMap::new();
    for row in &cases.rows {
        if row.date > day {
            continue;
        }
        if let Some(value) = row.numeric.get(column) {
            *sums.entry(row.date).or_default() += value;
        }
    }

    let mut running = 0.0;
    let points = sums
        .into_iter()
        .map(|(date, value)| {
            let value = match kind {
                ChartKind::Daily => value,
                ChartKind::Cumulative => {
                    running += value;
                    running
                }
            };
            ChartPoint { date, value }
        })
        .collect();

    ChartSeries {
        name: name.to_string(),
        column: column.to_string(),
        points,
    }
}
