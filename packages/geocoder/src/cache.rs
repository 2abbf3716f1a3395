//! On-disk cache of reverse-geocoded address attributes.
//!
//! The batch geocode step writes one MessagePack file mapping each
//! location identifier (`zid`) to its [`AddressRecord`]. The pipeline
//! then runs entirely from this file; re-running the geocode step only
//! fetches identifiers that are not yet cached.
//!
//! Keying on `zid` (rather than aligning a result list with source-row
//! order) keeps the cache valid when the case table is re-sorted or
//! partially re-exported.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::AddressRecord;

/// Cached geocoder output: location identifier to address attributes.
pub type GeocodeCache = BTreeMap<i64, AddressRecord>;

/// Errors from geocode cache file handling.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file does not exist. Run the geocode step first.
    #[error("Geocode cache not found: {path}")]
    NotFound {
        /// Path that was looked up.
        path: String,
    },

    /// Reading or writing the cache file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the cache failed.
    #[error("Cache encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// The cache file exists but does not decode; it is corrupt or from
    /// an incompatible version.
    #[error("Cache decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Loads the cache from `path`.
///
/// # Errors
///
/// Returns [`CacheError::NotFound`] for a missing file, distinguishing it
/// from a corrupt one ([`CacheError::Decode`]).
pub fn load(path: &Path) -> Result<GeocodeCache, CacheError> {
    if !path.exists() {
        return Err(CacheError::NotFound {
            path: path.display().to_string(),
        });
    }

    let bytes = std::fs::read(path)?;
    Ok(rmp_serde::from_slice(&bytes)?)
}

/// Loads the cache from `path`, treating a missing file as empty.
///
/// Used by the geocode step itself, for which an absent cache just means
/// nothing has been fetched yet.
///
/// # Errors
///
/// Returns [`CacheError`] if an existing file cannot be read or decoded.
pub fn load_or_empty(path: &Path) -> Result<GeocodeCache, CacheError> {
    match load(path) {
        Err(CacheError::NotFound { .. }) => Ok(GeocodeCache::new()),
        other => other,
    }
}

/// Writes the cache to `path` atomically (temp file + rename).
///
/// # Errors
///
/// Returns [`CacheError`] if encoding or any file operation fails.
pub fn store(path: &Path, cache: &GeocodeCache) -> Result<(), CacheError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let bytes = rmp_serde::to_vec(cache)?;
    let tmp_path = path.with_extension("msgpack.tmp");
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)?;

    log::debug!("Wrote {} cached addresses to {}", cache.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AddressRecord;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.msgpack");

        let mut cache = GeocodeCache::new();
        cache.insert(
            1,
            [("state", "Москва"), ("state_district", "ЦАО")]
                .into_iter()
                .collect::<AddressRecord>(),
        );
        cache.insert(
            2,
            [("state", "Московская область"), ("county", "Одинцовский")]
                .into_iter()
                .collect::<AddressRecord>(),
        );

        store(&path, &cache).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, cache);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.msgpack")).unwrap_err();
        assert!(matches!(err, CacheError::NotFound { .. }));
    }

    #[test]
    fn load_or_empty_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = load_or_empty(&dir.path().join("absent.msgpack")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.msgpack");
        std::fs::write(&path, b"not msgpack").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, CacheError::Decode(_)));
    }
}
