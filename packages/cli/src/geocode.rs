//! Batch reverse geocoding of case locations.
//!
//! Walks the distinct locations of the case table and fills the geocode
//! cache with their address attributes, one Nominatim request per second.
//! Already-cached identifiers are skipped, so an interrupted run resumes
//! where it left off.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use outbreak_map_geocoder::{cache, nominatim};

/// Minimum delay between requests, per the public Nominatim usage policy.
const REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Runs the geocode subcommand.
///
/// On a request error the addresses fetched so far are persisted before
/// the error propagates; a rerun continues from the cache.
///
/// # Errors
///
/// Returns an error if the case table or cache cannot be read, a request
/// fails, or the cache cannot be written.
pub async fn run(
    cases: &Path,
    cache_path: &Path,
    base_url: Option<&str>,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let locations = outbreak_map_cases::load_locations(cases)?;
    let mut cached = cache::load_or_empty(cache_path)?;

    let mut pending: Vec<_> = locations
        .iter()
        .filter(|location| !cached.contains_key(&location.zid))
        .collect();
    if let Some(limit) = limit {
        pending.truncate(limit);
    }

    if pending.is_empty() {
        log::info!(
            "All {} locations already cached in {}",
            locations.len(),
            cache_path.display()
        );
        return Ok(());
    }

    log::info!(
        "Geocoding {} of {} locations ({} already cached)",
        pending.len(),
        locations.len(),
        cached.len()
    );

    let client = reqwest::Client::builder()
        .user_agent("outbreak-map (data preparation)")
        .build()?;
    let base_url = base_url.unwrap_or(nominatim::DEFAULT_BASE_URL);

    let bar = ProgressBar::new(pending.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "  {msg} {wide_bar:.cyan/dim} {pos}/{len} {percent}% [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );
    bar.set_message("reverse geocoding");

    let mut fetched: u64 = 0;
    let mut unplaced: u64 = 0;

    for location in pending {
        let result = nominatim::reverse_geocode(
            &client,
            base_url,
            location.latitude(),
            location.longitude(),
        )
        .await;

        match result {
            Ok(Some(record)) => {
                cached.insert(location.zid, record);
                fetched += 1;
            }
            Ok(None) => {
                log::warn!(
                    "No address for zid {} at ({}, {})",
                    location.zid,
                    location.latitude(),
                    location.longitude()
                );
                unplaced += 1;
            }
            Err(err) => {
                // Keep what was fetched so a rerun resumes from here.
                bar.abandon();
                cache::store(cache_path, &cached)?;
                return Err(err.into());
            }
        }

        bar.inc(1);
        tokio::time::sleep(REQUEST_DELAY).await;
    }

    bar.finish_with_message("reverse geocoding complete");
    cache::store(cache_path, &cached)?;

    log::info!(
        "Cached {fetched} new addresses ({unplaced} unplaceable): {}",
        cache_path.display()
    );
    Ok(())
}
