//! Nominatim / OpenStreetMap reverse geocoder client.
//!
//! Resolves `(lat, lon)` coordinates to nested address attributes.
//! Nominatim has strict rate limits: **1 request per second** maximum on
//! the public instance.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use crate::{AddressRecord, GeocodeError};

/// Reverse endpoint of the public Nominatim instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Reverse-geocodes a single coordinate pair.
///
/// Returns `Ok(None)` when Nominatim cannot place the coordinates (open
/// water, out of coverage). The caller is responsible for rate limiting
/// (typically 1 request per second for the public instance).
///
/// Results are requested in Russian so that state names match the
/// capital-region marker used downstream.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn reverse_geocode(
    client: &reqwest::Client,
    base_url: &str,
    latitude: f64,
    longitude: f64,
) -> Result<Option<AddressRecord>, GeocodeError> {
    let resp = client
        .get(base_url)
        .query(&[
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("format", "jsonv2".to_string()),
            ("accept-language", "ru".to_string()),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses a Nominatim reverse-geocode JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<AddressRecord>, GeocodeError> {
    // Unplaceable coordinates come back as `{"error": "Unable to geocode"}`.
    if body.get("error").is_some() {
        return Ok(None);
    }

    let address = body
        .get("address")
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing address object in Nominatim response".to_string(),
        })?
        .clone();

    let record: AddressRecord =
        serde_json::from_value(address).map_err(|e| GeocodeError::Parse {
            message: format!("Invalid address object in Nominatim response: {e}"),
        })?;

    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reverse_result() {
        let body = serde_json::json!({
            "lat": "55.7558",
            "lon": "37.6173",
            "display_name": "Москва, Центральный федеральный округ, Россия",
            "address": {
                "state": "Москва",
                "state_district": "Центральный административный округ",
                "city": "Москва",
                "country": "Россия"
            }
        });
        let record = parse_response(&body).unwrap().unwrap();
        assert_eq!(record.state(), Some("Москва"));
        assert_eq!(
            record.get("state_district"),
            Some("Центральный административный округ")
        );
    }

    #[test]
    fn unplaceable_coordinates_are_none() {
        let body = serde_json::json!({"error": "Unable to geocode"});
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn missing_address_is_parse_error() {
        let body = serde_json::json!({"lat": "55.0", "lon": "37.0"});
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(err, GeocodeError::Parse { .. }));
    }
}
