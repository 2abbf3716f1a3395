#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Case aggregation for the outbreak map.
//!
//! Joins case rows to their resolved administrative placements, keeps the
//! capital region, and sums the numeric columns per
//! `(date, district, suburb)` group. [`bins`] partitions the percentage
//! metric into fixed display ranges; [`charts`] builds the per-day bar
//! chart series.

pub mod bins;
pub mod charts;

use std::collections::BTreeMap;

use outbreak_map_epidemic_models::{
    AggregatedTable, BucketKey, CAPITAL_REGION, CaseRow, CaseTable, ResolvedLocation,
};

/// One case row paired with its resolved placement, if any.
///
/// Left-join semantics: a row whose `zid` has no resolved location is
/// kept with an absent placement rather than treated as an error.
#[derive(Debug, Clone, Copy)]
pub struct JoinedRow<'a> {
    /// The case row.
    pub row: &'a CaseRow,
    /// The row's placement; `None` when the `zid` did not resolve.
    pub location: Option<&'a ResolvedLocation>,
}

/// Builds the `zid` lookup over a resolved location table.
#[must_use]
pub fn location_index(locations: &[ResolvedLocation]) -> BTreeMap<i64, &ResolvedLocation> {
    locations.iter().map(|loc| (loc.zid, loc)).collect()
}

/// Left-joins every case row to its resolved location on `zid`.
#[must_use]
pub fn join_locations<'a>(
    cases: &'a CaseTable,
    locations: &'a [ResolvedLocation],
) -> Vec<JoinedRow<'a>> {
    let index = location_index(locations);
    cases
        .rows
        .iter()
        .map(|row| JoinedRow {
            row,
            location: index.get(&row.zid).copied(),
        })
        .collect()
}

/// Aggregates the case table over the resolved locations.
///
/// Joins on `zid`, keeps rows whose resolved state is the capital-region
/// marker, groups by `(date, district, suburb)`, and sums every numeric
/// column element-wise. Text columns are dropped — they have no defined
/// combination rule. Rows with no placement, or a placement outside the
/// capital region, contribute to no bucket.
///
/// The result is independent of input row order.
#[must_use]
pub fn aggregate_cases(cases: &CaseTable, locations: &[ResolvedLocation]) -> AggregatedTable {
    let mut buckets: BTreeMap<BucketKey, Vec<f64>> = BTreeMap::new();
    let mut kept: u64 = 0;

    for joined in join_locations(cases, locations) {
        let Some(location) = joined.location else {
            continue;
        };
        if location.state != CAPITAL_REGION {
            continue;
        }
        kept += 1;

        let key = BucketKey {
            date: joined.row.date,
            district: location.district.clone(),
            suburb: location.suburb.clone(),
        };
        let sums = buckets
            .entry(key)
            .or_insert_with(|| vec![0.0; cases.numeric_columns.len()]);

        for (i, column) in cases.numeric_columns.iter().enumerate() {
            if let Some(value) = joined.row.numeric.get(column) {
                sums[i] += value;
            }
        }
    }

    log::debug!(
        "Aggregated {kept} of {} case rows into {} buckets",
        cases.len(),
        buckets.len()
    );

    AggregatedTable {
        numeric_columns: cases.numeric_columns.clone(),
        buckets,
    }
}
