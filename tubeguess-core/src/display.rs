//! Display surface view model
//!
//! Everything the player sees outside the map: station name, counters,
//! result panel and game-over panel. The controller is the only writer.

use serde::{Deserialize, Serialize};

use crate::scoring::DistanceClass;

/// Which action button is showing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionButton {
    #[default]
    Submit,
    Next,
}

/// Panel shown after submitting a guess
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultPanel {
    /// e.g. `"950m"` or `"1.5km"`
    pub distance_text: String,
    pub distance_class: DistanceClass,
    /// e.g. `"+742"`
    pub points_text: String,
}

/// Panel shown when the session ends
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameOverPanel {
    pub final_score_text: String,
    pub message: String,
}

/// Text and visibility state of every non-map element
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub station_name: String,
    /// `"3/10"`
    pub round_label: String,
    /// `"Round 3"`
    pub round_badge: String,
    pub score_text: String,
    pub submit_enabled: bool,
    pub action: ActionButton,
    pub hint_visible: bool,
    pub result: Option<ResultPanel>,
    pub game_over: Option<GameOverPanel>,
}

impl DisplayState {
    /// Fresh display before any round has started
    pub fn new() -> Self {
        Self {
            score_text: "0".to_string(),
            hint_visible: true,
            ..Default::default()
        }
    }

    /// Per-round reset: result hidden, submit disabled, hint shown
    pub fn reset_round(&mut self, station_name: &str, round: u32, total_rounds: u32) {
        self.station_name = station_name.to_string();
        self.round_label = format!("{}/{}", round, total_rounds);
        self.round_badge = format!("Round {}", round);
        self.submit_enabled = false;
        self.action = ActionButton::Submit;
        self.hint_visible = true;
        self.result = None;
    }
}
