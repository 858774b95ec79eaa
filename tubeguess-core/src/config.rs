//! Game configuration

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;
use crate::scoring::MAX_ROUND_POINTS;

/// Rounds in a standard session
pub const DEFAULT_ROUNDS: u32 = 10;

/// Central London (Charing Cross)
pub const DEFAULT_CENTER: LatLng = LatLng::new(51.5074, -0.1278);

/// Zoom that shows Zones 1-4
pub const DEFAULT_ZOOM: u8 = 11;

/// Pixel padding when framing guess and station
pub const DEFAULT_FIT_PADDING: u32 = 80;

/// Session parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Rounds before the game-over panel
    pub rounds_per_session: u32,
    /// Map view restored at the start of every round
    pub default_center: LatLng,
    pub default_zoom: u8,
    /// Padding used when fitting the result to the viewport
    pub fit_padding: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds_per_session: DEFAULT_ROUNDS,
            default_center: DEFAULT_CENTER,
            default_zoom: DEFAULT_ZOOM,
            fit_padding: DEFAULT_FIT_PADDING,
        }
    }
}

impl GameConfig {
    /// Set the number of rounds (at least one)
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds_per_session = rounds.max(1);
        self
    }

    /// Set the default map view
    pub fn with_view(mut self, center: LatLng, zoom: u8) -> Self {
        self.default_center = center;
        self.default_zoom = zoom;
        self
    }

    /// Best possible cumulative score
    pub fn max_score(&self) -> u32 {
        self.rounds_per_session * MAX_ROUND_POINTS
    }
}
