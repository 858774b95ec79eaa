//! Error types for station loading and game control

use std::path::PathBuf;

/// Station data could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    #[error("failed to read station data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("station data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("station data has no \"features\" array")]
    MissingFeatures,
}

/// The controller cannot proceed
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("station pool is empty")]
    NoStations,
}
