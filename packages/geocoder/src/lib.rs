#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reverse geocoding for the outbreak map.
//!
//! Converts location coordinates to administrative placements in three
//! steps, each usable on its own:
//!
//! 1. **Nominatim reverse lookup** ([`nominatim`]) — an offline, one-off
//!    data-preparation step that fetches the nested address attributes for
//!    each distinct location. Rate-limited to 1 request/second on the
//!    public instance.
//! 2. **Geocode cache** ([`cache`]) — the fetched attributes persisted as
//!    a MessagePack map keyed by the location identifier, so the pipeline
//!    never needs the network.
//! 3. **Field resolution** ([`resolve`]) — pure priority-ordered fallback
//!    over the differently named suburb/district attributes, producing a
//!    normalized `(state, district, suburb)` per location.

pub mod cache;
pub mod nominatim;
pub mod resolve;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nested address attributes for one reverse-geocoded location.
///
/// Attribute names follow Nominatim's `address` object (`"state"`,
/// `"county"`, `"city"`, `"town"`, `"suburb"`, `"village"`,
/// `"state_district"`, `"neighbourhood"`, `"hamlet"`, `"road"`,
/// `"allotments"`, ...). Not every attribute is present on every record;
/// absence is the normal case, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressRecord {
    attributes: BTreeMap<String, String>,
}

impl AddressRecord {
    /// Returns the value of `attribute`, if present.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(String::as_str)
    }

    /// Returns the first attribute from `candidates` present on this
    /// record, walking the slice in priority order.
    #[must_use]
    pub fn first_of(&self, candidates: &[&str]) -> Option<&str> {
        candidates.iter().find_map(|name| self.get(name))
    }

    /// The `state` attribute, if present.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    /// Number of attributes on this record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the record carries no attributes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AddressRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Errors from reverse-geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_of_respects_priority_order() {
        let record: AddressRecord = [("town", "Balashikha"), ("city", "Moscow")]
            .into_iter()
            .collect();
        assert_eq!(record.first_of(&["city", "town"]), Some("Moscow"));
        assert_eq!(record.first_of(&["town", "city"]), Some("Balashikha"));
    }

    #[test]
    fn first_of_skips_absent_attributes() {
        let record: AddressRecord = [("village", "Barvikha")].into_iter().collect();
        assert_eq!(
            record.first_of(&["city", "town", "village"]),
            Some("Barvikha")
        );
        assert_eq!(record.first_of(&["city", "town"]), None);
    }
}
