//! Stations command - validate and list station data
//!
//! Malformed features are reported as warnings by the loader and left out
//! of the listing, exactly as the game would see them.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use tubeguess_core::{LatLngBounds, Station, StationPool};

#[derive(Args)]
pub struct StationsArgs {
    /// GeoJSON file with station features
    #[arg(long, value_name = "FILE", default_value = "data/stations.geojson")]
    pub stations: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StationReport<'a> {
    count: usize,
    bounds: Option<LatLngBounds>,
    stations: &'a [Station],
}

pub fn run(args: StationsArgs) -> Result<()> {
    let pool = StationPool::load(&args.stations)
        .with_context(|| format!("Failed to load stations: {}", args.stations.display()))?;

    let stdout = std::io::stdout();
    report(&pool, args.json, stdout.lock())
}

fn report<W: Write>(pool: &StationPool, json: bool, mut out: W) -> Result<()> {
    let locations: Vec<_> = pool.iter().map(|s| s.location).collect();
    let bounds = LatLngBounds::from_points(&locations);

    if json {
        let report = StationReport {
            count: pool.len(),
            bounds,
            stations: pool,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    for station in pool.iter() {
        writeln!(
            out,
            "{:<32} {:>9.4} {:>9.4}",
            station.name, station.location.lat, station.location.lng
        )?;
    }
    writeln!(out, "{} valid stations", pool.len())?;
    if let Some(b) = bounds {
        writeln!(
            out,
            "bounds: {:.4},{:.4} to {:.4},{:.4}",
            b.south_west.lat, b.south_west.lng, b.north_east.lat, b.north_east.lng
        )?;
    }
    Ok(())
}
