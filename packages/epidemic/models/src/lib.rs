#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared model types for the outbreak map pipeline.
//!
//! This crate defines the case-table, location and aggregation types that
//! flow between the loader, the address resolver, the aggregator and the
//! artifact generator. All types are plain data; behavior lives in the
//! crates that produce and consume them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The distinguished state value for the capital region.
///
/// Locations resolving to this state get their own address-field priority
/// list during resolution, and only their case rows survive the
/// aggregation filter.
pub const CAPITAL_REGION: &str = "Москва";

/// Simulation scenario selector.
///
/// Each variant corresponds to one numeric column of the case table:
/// the baseline epidemic run plus four intervention scenarios.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Scenario {
    /// Baseline run, no interventions.
    #[serde(rename = "sick")]
    #[strum(serialize = "sick")]
    Sick,
    /// Intervention scenario 1.
    #[serde(rename = "sick_1")]
    #[strum(serialize = "sick_1")]
    Sick1,
    /// Intervention scenario 2.
    #[serde(rename = "sick_2")]
    #[strum(serialize = "sick_2")]
    Sick2,
    /// Intervention scenario 3.
    #[serde(rename = "sick_3")]
    #[strum(serialize = "sick_3")]
    Sick3,
    /// Intervention scenario 4.
    #[serde(rename = "sick_4")]
    #[strum(serialize = "sick_4")]
    Sick4,
}

impl Scenario {
    /// All scenarios, in dashboard dropdown order.
    pub const ALL: &[Self] = &[
        Self::Sick,
        Self::Sick1,
        Self::Sick2,
        Self::Sick3,
        Self::Sick4,
    ];

    /// The case-table column holding this scenario's counts.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Sick => "sick",
            Self::Sick1 => "sick_1",
            Self::Sick2 => "sick_2",
            Self::Sick3 => "sick_3",
            Self::Sick4 => "sick_4",
        }
    }

    /// Human-readable label, as shown in the dashboard dropdown.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sick => "Стандартный сценарий",
            Self::Sick1 => "Сценарий 1",
            Self::Sick2 => "Сценарий 2",
            Self::Sick3 => "Сценарий 3",
            Self::Sick4 => "Сценарий 4",
        }
    }

    /// Whether this is the baseline scenario.
    #[must_use]
    pub const fn is_baseline(self) -> bool {
        matches!(self, Self::Sick)
    }
}

/// Bar-chart flavor selector.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChartKind {
    /// Per-day counts.
    Daily,
    /// Running total over days, ascending.
    Cumulative,
}

/// A distinct source location: join key plus WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Join key linking case rows to this location.
    pub zid: i64,
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
}

impl Location {
    /// Latitude (WGS84).
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.y
    }

    /// Longitude (WGS84).
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.x
    }
}

/// Administrative placement of one location, derived once from its
/// geocoded address attributes and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// Join key linking case rows to this location.
    pub zid: i64,
    /// State (oblast / federal city) name.
    pub state: String,
    /// Administrative district within the state.
    pub district: String,
    /// Suburb-level name. Absent when no suburb-shaped attribute was
    /// present in the address; an absent suburb is a valid group key.
    pub suburb: Option<String>,
}

/// One row of the case table.
///
/// Columns beyond the fixed `zid`/`date` keys are carried as maps rather
/// than struct fields: the set of scenario columns is data, not schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRow {
    /// Join key linking this row to a [`Location`].
    pub zid: i64,
    /// Day number within the covered period.
    pub date: u32,
    /// Numeric columns (case counts, percentage metrics).
    pub numeric: BTreeMap<String, f64>,
    /// Non-numeric columns. Dropped during aggregation, which has no
    /// combination rule for them.
    pub text: BTreeMap<String, String>,
}

/// The full case table plus its numeric column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseTable {
    /// Numeric column names in source-file order.
    pub numeric_columns: Vec<String>,
    /// All rows, in source-file order.
    pub rows: Vec<CaseRow>,
}

impl CaseTable {
    /// Returns `(min, max)` of the `date` column, or `None` for an empty
    /// table.
    #[must_use]
    pub fn date_range(&self) -> Option<(u32, u32)> {
        let mut dates = self.rows.iter().map(|r| r.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Group key for aggregated case counts.
///
/// `suburb` is optional: rows whose address resolved without a
/// suburb-level attribute group under `None` rather than being dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BucketKey {
    /// Day number.
    pub date: u32,
    /// Administrative district.
    pub district: String,
    /// Suburb-level name, if the address had one.
    pub suburb: Option<String>,
}

/// Aggregation output: per-bucket element-wise sums of the numeric
/// columns, keyed and ordered by [`BucketKey`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedTable {
    /// Numeric column names, in the same order as each bucket's sums.
    pub numeric_columns: Vec<String>,
    /// Summed values per `(date, district, suburb)` group.
    pub buckets: BTreeMap<BucketKey, Vec<f64>>,
}
