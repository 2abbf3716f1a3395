//! Priority-ordered address-field resolution.
//!
//! Reverse-geocoded addresses name the suburb level differently depending
//! on settlement type: a city district comes back as `"city"`, a rural
//! settlement as `"hamlet"` or `"village"`, an allotment area as
//! `"allotments"`, and so on. Resolution walks a fixed candidate list in
//! priority order and takes the first attribute present.
//!
//! Capital-region addresses use their own, shorter lists: the capital
//! nests districts under `state_district` where every other state uses
//! `county`, and its suburb-level attributes are limited to urban forms.

use outbreak_map_epidemic_models::{CAPITAL_REGION, ResolvedLocation};
use thiserror::Error;

use crate::AddressRecord;
use crate::cache::GeocodeCache;

/// Suburb-level candidates for capital-region addresses, in priority order.
static CAPITAL_SUBURB_FIELDS: &[&str] = &["city", "town", "suburb", "village"];

/// Suburb-level candidates everywhere else, in priority order. Longer
/// than the capital list: regional addresses also surface rural and
/// street-level forms.
static REGIONAL_SUBURB_FIELDS: &[&str] = &[
    "city",
    "hamlet",
    "neighbourhood",
    "town",
    "village",
    "allotments",
    "road",
    "suburb",
];

/// District field and its fallback for capital-region addresses.
static CAPITAL_DISTRICT_FIELDS: &[&str] = &["state_district", "city"];

/// District field and its fallback elsewhere.
static REGIONAL_DISTRICT_FIELDS: &[&str] = &["county", "state_district"];

/// Errors from address-field resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The address carries no `state` attribute, so no candidate list can
    /// be chosen.
    #[error("address has no state attribute")]
    MissingState,

    /// Neither the primary nor the fallback district field is present.
    /// Callers collect these per location rather than substituting a
    /// default district.
    #[error("address in state '{state}' has no district attribute")]
    MissingDistrict {
        /// The state whose candidate list was exhausted.
        state: String,
    },
}

/// Picks `(district, suburb)` from one address record.
///
/// The suburb is the first present attribute of the state category's
/// candidate list; no candidate present yields `None`, which downstream
/// grouping accepts as a valid key. The district is read from the
/// category's primary field, then its documented fallback.
///
/// Pure function: same input always yields the same output.
///
/// # Errors
///
/// Returns [`ResolveError::MissingDistrict`] when neither district
/// candidate field is present on the record.
pub fn resolve_fields(
    address: &AddressRecord,
    state: &str,
) -> Result<(String, Option<String>), ResolveError> {
    let (district_fields, suburb_fields) = if state == CAPITAL_REGION {
        (CAPITAL_DISTRICT_FIELDS, CAPITAL_SUBURB_FIELDS)
    } else {
        (REGIONAL_DISTRICT_FIELDS, REGIONAL_SUBURB_FIELDS)
    };

    let district = address
        .first_of(district_fields)
        .ok_or_else(|| ResolveError::MissingDistrict {
            state: state.to_string(),
        })?;
    let suburb = address.first_of(suburb_fields);

    Ok((district.to_string(), suburb.map(str::to_string)))
}

/// Resolves one location from its geocoded address attributes.
///
/// # Errors
///
/// Returns [`ResolveError`] if the state attribute is absent or no
/// district candidate field is present.
pub fn resolve_location(
    zid: i64,
    address: &AddressRecord,
) -> Result<ResolvedLocation, ResolveError> {
    let state = address.state().ok_or(ResolveError::MissingState)?;
    let (district, suburb) = resolve_fields(address, state)?;

    Ok(ResolvedLocation {
        zid,
        state: state.to_string(),
        district,
        suburb,
    })
}

/// Resolves every cached address, splitting successes from failures.
///
/// Failures keep their location identifier so callers can report exactly
/// which locations dropped out; they are never defaulted.
#[must_use]
pub fn resolve_all(cache: &GeocodeCache) -> (Vec<ResolvedLocation>, Vec<(i64, ResolveError)>) {
    let mut resolved = Vec::with_capacity(cache.len());
    let mut failed = Vec::new();

    for (&zid, address) in cache {
        match resolve_location(zid, address) {
            Ok(location) => resolved.push(location),
            Err(err) => failed.push((zid, err)),
        }
    }

    (resolved, failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capital(pairs: &[(&str, &str)]) -> AddressRecord {
        pairs
            .iter()
            .copied()
            .chain([("state", CAPITAL_REGION)])
            .collect()
    }

    fn regional(pairs: &[(&str, &str)]) -> AddressRecord {
        pairs
            .iter()
            .copied()
            .chain([("state", "Московская область")])
            .collect()
    }

    #[test]
    fn capital_district_without_suburb_fields() {
        let record = capital(&[("state_district", "ЦАО"), ("road", "Тверская улица")]);
        let (district, suburb) = resolve_fields(&record, CAPITAL_REGION).unwrap();
        assert_eq!(district, "ЦАО");
        assert_eq!(suburb, None);
    }

    #[test]
    fn capital_suburb_priority_prefers_city() {
        let record = capital(&[
            ("state_district", "ВАО"),
            ("city", "Москва"),
            ("suburb", "Сокольники"),
        ]);
        let (district, suburb) = resolve_fields(&record, CAPITAL_REGION).unwrap();
        assert_eq!(district, "ВАО");
        assert_eq!(suburb.as_deref(), Some("Москва"));
    }

    #[test]
    fn capital_district_falls_back_to_city() {
        let record = capital(&[("city", "Зеленоград"), ("suburb", "Крюково")]);
        let (district, suburb) = resolve_fields(&record, CAPITAL_REGION).unwrap();
        assert_eq!(district, "Зеленоград");
        assert_eq!(suburb.as_deref(), Some("Зеленоград"));
    }

    #[test]
    fn regional_county_and_road_only() {
        let record = regional(&[("county", "Одинцовский округ"), ("road", "Минское шоссе")]);
        let (district, suburb) = resolve_fields(&record, "Московская область").unwrap();
        assert_eq!(district, "Одинцовский округ");
        assert_eq!(suburb.as_deref(), Some("Минское шоссе"));
    }

    #[test]
    fn regional_hamlet_beats_road() {
        let record = regional(&[
            ("county", "Истринский округ"),
            ("road", "Волоколамское шоссе"),
            ("hamlet", "Ленино"),
        ]);
        let (_, suburb) = resolve_fields(&record, "Московская область").unwrap();
        assert_eq!(suburb.as_deref(), Some("Ленино"));
    }

    #[test]
    fn regional_district_falls_back_to_state_district() {
        let record = regional(&[("state_district", "Рузский округ"), ("village", "Нестерово")]);
        let (district, suburb) = resolve_fields(&record, "Московская область").unwrap();
        assert_eq!(district, "Рузский округ");
        assert_eq!(suburb.as_deref(), Some("Нестерово"));
    }

    #[test]
    fn no_district_field_is_an_error() {
        let record = regional(&[("road", "Минское шоссе")]);
        let err = resolve_fields(&record, "Московская область").unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingDistrict {
                state: "Московская область".to_string(),
            }
        );
    }

    #[test]
    fn missing_state_is_an_error() {
        let record: AddressRecord = [("county", "Одинцовский округ")].into_iter().collect();
        assert_eq!(
            resolve_location(5, &record).unwrap_err(),
            ResolveError::MissingState
        );
    }

    #[test]
    fn resolve_location_carries_zid_and_state() {
        let record = capital(&[("state_district", "ЮЗАО"), ("suburb", "Ясенево")]);
        let location = resolve_location(42, &record).unwrap();
        assert_eq!(location.zid, 42);
        assert_eq!(location.state, CAPITAL_REGION);
        assert_eq!(location.district, "ЮЗАО");
        assert_eq!(location.suburb.as_deref(), Some("Ясенево"));
    }

    #[test]
    fn resolve_all_splits_failures() {
        let mut cache = GeocodeCache::new();
        cache.insert(1, capital(&[("state_district", "ЦАО")]));
        cache.insert(2, regional(&[("road", "без района")]));

        let (resolved, failed) = resolve_all(&cache);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].zid, 1);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, 2);
    }
}
