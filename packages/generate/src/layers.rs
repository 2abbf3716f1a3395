//! Per-bin map layers for the choropleth.
//!
//! The boundary file carries one feature per district polygon per day,
//! with `date` and `rel` (infected share, percent) properties. For a
//! selected day, each feature lands in the layer of the bin containing
//! its `rel` value; the renderer paints every layer in its bin color.

use std::path::Path;

use geojson::{Feature, FeatureCollection};
use outbreak_map_aggregate::bins::{PERCENT_BINS, bin_for};
use serde::Serialize;

use crate::GenerateError;

/// One colored map layer: the features of a single percentage bin.
#[derive(Debug, Clone, Serialize)]
pub struct MapLayer {
    /// Bin label, e.g. `"0.5-1%"`.
    pub label: &'static str,
    /// Fill color for this layer.
    pub color: &'static str,
    /// The day's features whose `rel` falls in this bin.
    pub features: FeatureCollection,
}

/// Partitions the day's boundary features into one layer per bin.
///
/// Features without a usable `date` or `rel` property are skipped, as are
/// features of other days and `rel` values below the first bin.
#[must_use]
pub fn bin_layers(boundaries: &FeatureCollection, day: u32) -> Vec<MapLayer> {
    let mut per_bin: Vec<Vec<Feature>> = vec![Vec::new(); PERCENT_BINS.len()];

    for feature in &boundaries.features {
        let Some(feature_day) = property_u32(feature, "date") else {
            continue;
        };
        if feature_day != day {
            continue;
        }
        let Some(rel) = property_f64(feature, "rel") else {
            continue;
        };
        if let Some(bin) = bin_for(rel)
            && let Some(index) = PERCENT_BINS.iter().position(|b| b.label == bin.label)
        {
            per_bin[index].push(feature.clone());
        }
    }

    PERCENT_BINS
        .iter()
        .zip(per_bin)
        .map(|(bin, features)| MapLayer {
            label: bin.label,
            color: bin.color,
            features: FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
        })
        .collect()
}

/// Writes the day's layers as `layers_day_<N>.json`.
///
/// # Errors
///
/// Returns [`GenerateError`] if serialization or the file write fails.
pub fn write_layers(
    boundaries: &FeatureCollection,
    day: u32,
    dir: &Path,
) -> Result<(), GenerateError> {
    let layers = bin_layers(boundaries, day);
    let populated = layers.iter().filter(|l| !l.features.features.is_empty()).count();

    let path = dir.join(format!("layers_day_{day}.json"));
    let tmp_path = path.with_extension("json.tmp");
    let contents = serde_json::to_string_pretty(&layers)?;
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, &path)?;

    log::info!(
        "Map layers for day {day} written ({populated} of {} bins populated): {}",
        layers.len(),
        path.display()
    );
    Ok(())
}

fn property_u32(feature: &Feature, name: &str) -> Option<u32> {
    let value = feature.property(name)?;
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|v| v.round() as u64))
        .and_then(|v| u32::try_from(v).ok())
}

fn property_f64(feature: &Feature, name: &str) -> Option<f64> {
    feature.property(name)?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(date: u32, rel: f64, district: &str) -> Feature {
        let geometry: geojson::Geometry = geojson::Value::Polygon(vec![vec![
            vec![37.5, 55.7],
            vec![37.6, 55.7],
            vec![37.6, 55.8],
            vec![37.5, 55.7],
        ]])
        .into();

        let mut properties = geojson::JsonObject::new();
        properties.insert("date".to_string(), date.into());
        properties.insert("rel".to_string(), rel.into());
        properties.insert("district".to_string(), district.into());

        Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    #[test]
    fn one_layer_per_bin() {
        let layers = bin_layers(&collection(vec![]), 1);
        assert_eq!(layers.len(), PERCENT_BINS.len());
    }

    #[test]
    fn feature_lands_in_exactly_one_bin() {
        let boundaries = collection(vec![feature(1, 0.5, "ЦАО")]);
        let layers = bin_layers(&boundaries, 1);

        let populated: Vec<&MapLayer> = layers
            .iter()
            .filter(|l| !l.features.features.is_empty())
            .collect();
        assert_eq!(populated.len(), 1);
        assert_eq!(populated[0].label, "0.5-1%");
        assert_eq!(populated[0].color, "#6df0c8");
    }

    #[test]
    fn other_days_are_excluded() {
        let boundaries = collection(vec![feature(2, 0.5, "ЦАО")]);
        let layers = bin_layers(&boundaries, 1);
        assert!(layers.iter().all(|l| l.features.features.is_empty()));
    }

    #[test]
    fn features_without_rel_are_skipped() {
        let mut incomplete = feature(1, 0.5, "ЦАО");
        incomplete
            .properties
            .as_mut()
            .unwrap()
            .remove("rel");
        let layers = bin_layers(&collection(vec![incomplete]), 1);
        assert!(layers.iter().all(|l| l.features.features.is_empty()));
    }

    #[test]
    fn float_encoded_dates_still_match() {
        let mut float_date = feature(1, 12.0, "САО");
        float_date
            .properties
            .as_mut()
            .unwrap()
            .insert("date".to_string(), 1.0.into());
        let layers = bin_layers(&collection(vec![float_date]), 1);
        let populated: Vec<&MapLayer> = layers
            .iter()
            .filter(|l| !l.features.features.is_empty())
            .collect();
        assert_eq!(populated.len(), 1);
        assert_eq!(populated[0].label, "10-20%");
    }
}
