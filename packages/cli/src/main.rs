#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the outbreak map toolchain.
//!
//! Two subcommands mirror the two halves of the system: `geocode` is the
//! offline, one-off preparation step that fills the reverse-geocode
//! cache, and `generate` runs the aggregation pipeline from the cached
//! inputs and writes the presenter artifacts.

mod geocode;
mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "outbreak-map", about = "Outbreak map data toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reverse-geocode the distinct case locations into the cache
    Geocode {
        /// Case table CSV with `zid`, `x`, `y` columns
        #[arg(long, default_value = "data/covid_scenario.csv")]
        cases: PathBuf,
        /// Geocode cache file to fill (created if absent)
        #[arg(long, default_value = "data/locations.msgpack")]
        cache: PathBuf,
        /// Nominatim reverse endpoint (defaults to the public instance)
        #[arg(long)]
        base_url: Option<String>,
        /// Maximum number of lookups this run (for testing)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Run the aggregation pipeline and write presenter artifacts
    Generate {
        /// Case table CSV
        #[arg(long, default_value = "data/covid_scenario.csv")]
        cases: PathBuf,
        /// Geocode cache produced by the `geocode` subcommand
        #[arg(long, default_value = "data/locations.msgpack")]
        cache: PathBuf,
        /// District-boundary GeoJSON with per-day `rel` properties
        #[arg(long, default_value = "data/geo.json")]
        boundaries: PathBuf,
        /// Directory for the generated artifacts
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// Day to build map layers for; defaults to the latest known day
        #[arg(long)]
        day: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Geocode {
            cases,
            cache,
            base_url,
            limit,
        } => geocode::run(&cases, &cache, base_url.as_deref(), limit).await?,
        Commands::Generate {
            cases,
            cache,
            boundaries,
            output_dir,
            day,
        } => pipeline::run(&cases, &cache, &boundaries, &output_dir, day)?,
    }

    Ok(())
}
