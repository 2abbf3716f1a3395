//! Fixed percentage bins for choropleth coloring.
//!
//! The infected-share metric is partitioned into ten half-open ranges,
//! each with a display color from a light-to-dark green scale. Only the
//! presentation layer uses these; nothing is persisted per bin.

/// One half-open percentage range with its display color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentBin {
    /// Display label, e.g. `"0.5-1%"`.
    pub label: &'static str,
    /// Inclusive lower bound.
    pub lower: f64,
    /// Exclusive upper bound. The last bin ignores it and accepts any
    /// value at or above its lower bound.
    pub upper: f64,
    /// Fill color for map features in this bin.
    pub color: &'static str,
}

/// The bin table, ordered by lower bound ascending.
pub static PERCENT_BINS: &[PercentBin] = &[
    PercentBin { label: "0-0.1%", lower: 0.0, upper: 0.1, color: "#f2fffb" },
    PercentBin { label: "0.1-0.5%", lower: 0.1, upper: 0.5, color: "#98ffe0" },
    PercentBin { label: "0.5-1%", lower: 0.5, upper: 1.0, color: "#6df0c8" },
    PercentBin { label: "1-5%", lower: 1.0, upper: 5.0, color: "#59dab2" },
    PercentBin { label: "5-10%", lower: 5.0, upper: 10.0, color: "#31c194" },
    PercentBin { label: "10-20%", lower: 10.0, upper: 20.0, color: "#25a27b" },
    PercentBin { label: "20-40%", lower: 20.0, upper: 40.0, color: "#188463" },
    PercentBin { label: "40-50%", lower: 40.0, upper: 50.0, color: "#157658" },
    PercentBin { label: "50-60%", lower: 50.0, upper: 60.0, color: "#11684d" },
    PercentBin { label: "60-100%", lower: 60.0, upper: 100.0, color: "#10523e" },
];

/// Returns the bin containing `value`, or `None` for values below the
/// first bin's lower bound.
///
/// A value exactly on a boundary falls into the bin whose lower bound
/// equals it. The topmost bin is open-ended.
#[must_use]
pub fn bin_for(value: f64) -> Option<&'static PercentBin> {
    let last = PERCENT_BINS.len() - 1;
    PERCENT_BINS.iter().enumerate().find_map(|(i, bin)| {
        let matches = if i == last {
            value >= bin.lower
        } else {
            value >= bin.lower && value < bin.upper
        };
        matches.then_some(bin)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_value_falls_upward() {
        // 0.5 belongs to [0.5, 1), not [0.1, 0.5).
        assert_eq!(bin_for(0.5).unwrap().label, "0.5-1%");
    }

    #[test]
    fn zero_is_in_the_first_bin() {
        assert_eq!(bin_for(0.0).unwrap().label, "0-0.1%");
    }

    #[test]
    fn negative_values_have_no_bin() {
        assert!(bin_for(-0.01).is_none());
    }

    #[test]
    fn top_bin_is_open_ended() {
        assert_eq!(bin_for(60.0).unwrap().label, "60-100%");
        assert_eq!(bin_for(100.0).unwrap().label, "60-100%");
        assert_eq!(bin_for(250.0).unwrap().label, "60-100%");
    }

    #[test]
    fn bins_tile_the_range_without_gaps() {
        for window in PERCENT_BINS.windows(2) {
            assert!((window[0].upper - window[1].lower).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn every_bin_has_a_distinct_color() {
        let mut colors: Vec<&str> = PERCENT_BINS.iter().map(|b| b.color).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), PERCENT_BINS.len());
    }
}
