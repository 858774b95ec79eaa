//! Station records and GeoJSON loading
//!
//! Stations come from a GeoJSON FeatureCollection where each feature carries
//! `properties.name` and a point geometry in `[longitude, latitude]` order.
//! Records without a usable name or position are skipped with a warning so
//! they can never be drawn as a round's target.

use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StationError;
use crate::geo::LatLng;

/// A named target location
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub location: LatLng,
}

impl Station {
    pub fn new(name: impl Into<String>, location: LatLng) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// Why a feature was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidStation {
    MissingName,
    MissingCoordinates,
    OutOfRange,
}

impl std::fmt::Display for InvalidStation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidStation::MissingName => f.write_str("missing name"),
            InvalidStation::MissingCoordinates => f.write_str("missing coordinates"),
            InvalidStation::OutOfRange => f.write_str("coordinates out of range"),
        }
    }
}

/// Immutable, shareable list of valid stations
#[derive(Clone, Debug)]
pub struct StationPool {
    stations: Arc<[Station]>,
}

impl StationPool {
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            stations: stations.into(),
        }
    }

    /// Read and parse a GeoJSON file
    pub fn load(path: &Path) -> Result<Self, StationError> {
        let content = std::fs::read_to_string(path).map_err(|source| StationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let pool = Self::from_geojson(&content)?;
        tracing::info!("Loaded {} stations from {}", pool.len(), path.display());
        Ok(pool)
    }

    /// Parse a GeoJSON FeatureCollection, dropping malformed features
    pub fn from_geojson(content: &str) -> Result<Self, StationError> {
        let parsed: Value = serde_json::from_str(content)?;
        let features = parsed
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(StationError::MissingFeatures)?;

        let mut stations = Vec::with_capacity(features.len());
        for (index, feature) in features.iter().enumerate() {
            match parse_feature(feature) {
                Ok(station) => stations.push(station),
                Err(reason) => {
                    tracing::warn!("Invalid station at index {}: {}", index, reason);
                }
            }
        }

        Ok(Self::new(stations))
    }

    pub fn get(&self, index: usize) -> Option<&Station> {
        self.stations.get(index)
    }
}

impl Default for StationPool {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Deref for StationPool {
    type Target = [Station];

    fn deref(&self) -> &[Station] {
        &self.stations
    }
}

impl From<Vec<Station>> for StationPool {
    fn from(stations: Vec<Station>) -> Self {
        Self::new(stations)
    }
}

/// Extract a station from one GeoJSON feature
fn parse_feature(feature: &Value) -> Result<Station, InvalidStation> {
    let name = feature
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(InvalidStation::MissingName)?;

    let coords = feature
        .get("geometry")
        .and_then(|g| g.get("coordinates"))
        .and_then(|c| c.as_array())
        .ok_or(InvalidStation::MissingCoordinates)?;

    let (lng, lat) = match (
        coords.first().and_then(|v| v.as_f64()),
        coords.get(1).and_then(|v| v.as_f64()),
    ) {
        (Some(lng), Some(lat)) => (lng, lat),
        _ => return Err(InvalidStation::MissingCoordinates),
    };

    let location = LatLng::from_lng_lat(lng, lat);
    if !location.is_valid() {
        return Err(InvalidStation::OutOfRange);
    }

    Ok(Station::new(name, location))
}
