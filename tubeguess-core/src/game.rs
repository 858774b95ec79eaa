//! Round controller state machine
//!
//! `Idle -> AwaitingGuess -> Guessed -> (AwaitingGuess | Over)`
//!
//! Every user action arrives as an [`Input`]. Inputs that make no sense in
//! the current phase (clicking after submitting, submitting without a guess,
//! "next" before scoring) are ignored rather than treated as errors.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::display::{ActionButton, DisplayState, GameOverPanel, ResultPanel};
use crate::error::GameError;
use crate::geo::{LatLng, LatLngBounds};
use crate::map::{LayerId, LineStyle, MapSurface, MarkerKind, TileLayer};
use crate::scoring::{calculate_score, format_distance, format_score, DistanceClass, ScoreTier};
use crate::session::{RoundPhase, SessionState};
use crate::station::{Station, StationPool};

// ============================================================================
// INPUTS AND OUTCOMES
// ============================================================================

/// A user action
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    MapClick { at: LatLng },
    Submit,
    Next,
    PlayAgain,
}

/// Score of one submitted guess
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Whole meters between guess and station
    pub distance_m: u32,
    pub points: u32,
    pub distance_class: DistanceClass,
    pub guess: LatLng,
    pub truth: LatLng,
}

/// What an input did
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// Out of sequence; nothing changed
    Ignored,
    RoundStarted { round: u32, station: String },
    GuessPlaced { at: LatLng },
    Scored { result: RoundResult, total: u32 },
    SessionOver { final_score: u32, tier: ScoreTier },
}

/// Map layers owned by the current round
#[derive(Clone, Copy, Debug, Default)]
struct RoundLayers {
    guess: Option<LayerId>,
    truth: Option<LayerId>,
    line: Option<LayerId>,
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// Drives one player's session against a map surface
pub struct RoundController<M: MapSurface, R = ChaCha8Rng> {
    config: GameConfig,
    stations: StationPool,
    session: SessionState,
    display: DisplayState,
    map: M,
    layers: RoundLayers,
    rng: R,
    last_result: Option<RoundResult>,
}

impl<M: MapSurface> RoundController<M, ChaCha8Rng> {
    /// Controller with a seeded RNG for reproducible station order
    pub fn seeded(config: GameConfig, stations: StationPool, map: M, seed: u64) -> Self {
        Self::new(config, stations, map, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<M: MapSurface, R: rand::Rng> RoundController<M, R> {
    pub fn new(config: GameConfig, stations: StationPool, map: M, rng: R) -> Self {
        Self {
            config,
            stations,
            session: SessionState::new(),
            display: DisplayState::new(),
            map,
            layers: RoundLayers::default(),
            rng,
            last_result: None,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> RoundPhase {
        self.session.phase
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn stations(&self) -> &StationPool {
        &self.stations
    }

    /// Target of the round in progress
    pub fn current_station(&self) -> Option<&Station> {
        self.session.current_station.and_then(|i| self.stations.get(i))
    }

    /// Result of the most recent submit in this round
    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    // ========================================================================
    // DISPATCH
    // ========================================================================

    /// Apply one user action
    pub fn handle(&mut self, input: Input) -> Result<Outcome, GameError> {
        let outcome = match input {
            Input::MapClick { at } => Ok(self.on_map_click(at)),
            Input::Submit => Ok(self.on_submit()),
            Input::Next => self.on_next(),
            Input::PlayAgain => self.on_play_again(),
        }?;
        tracing::debug!(?input, ?outcome, phase = ?self.session.phase, "handled input");
        Ok(outcome)
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// Reset the board and draw the next station
    pub fn start_round(&mut self) -> Result<Outcome, GameError> {
        self.clear_round_layers();
        self.map.set_tile_layer(TileLayer::Unlabeled);
        self.map.set_view(self.config.default_center, self.config.default_zoom);

        let index = match self.session.select_next_station(&self.stations, &mut self.rng) {
            Some(index) => index,
            None => {
                tracing::error!("Cannot start round: station data is not loaded");
                self.session.phase = RoundPhase::Idle;
                return Err(GameError::NoStations);
            }
        };
        let name = self.stations[index].name.clone();

        self.session.current_station = Some(index);
        self.session.guess = None;
        self.session.has_guessed = false;
        self.session.phase = RoundPhase::AwaitingGuess;
        self.last_result = None;
        self.display
            .reset_round(&name, self.session.round, self.config.rounds_per_session);

        tracing::info!("Round {} started: {}", self.session.round, name);
        Ok(Outcome::RoundStarted {
            round: self.session.round,
            station: name,
        })
    }

    /// Place or move the guess marker
    pub fn on_map_click(&mut self, at: LatLng) -> Outcome {
        if self.session.has_guessed || self.session.phase != RoundPhase::AwaitingGuess {
            return Outcome::Ignored;
        }

        if let Some(id) = self.layers.guess.take() {
            self.map.remove_layer(id);
        }
        self.layers.guess = Some(self.map.place_marker(MarkerKind::Guess, at));
        self.session.guess = Some(at);
        self.display.submit_enabled = true;
        self.display.hint_visible = false;

        Outcome::GuessPlaced { at }
    }

    /// Score the pending guess and reveal the station
    pub fn on_submit(&mut self) -> Outcome {
        if self.session.has_guessed || self.session.phase != RoundPhase::AwaitingGuess {
            return Outcome::Ignored;
        }
        let (guess, truth) = match (self.session.guess, self.current_station()) {
            (Some(guess), Some(station)) => (guess, station.location),
            _ => return Outcome::Ignored,
        };

        self.session.has_guessed = true;
        self.session.phase = RoundPhase::Guessed;

        let distance_m = self.map.distance_between(truth, guess).round() as u32;
        let points = calculate_score(distance_m as f64);
        self.session.score += points;

        let result = RoundResult {
            distance_m,
            points,
            distance_class: DistanceClass::classify(distance_m as f64),
            guess,
            truth,
        };
        self.last_result = Some(result);

        self.map.set_tile_layer(TileLayer::Labeled);
        self.layers.truth = Some(self.map.place_marker(MarkerKind::Truth, truth));
        self.layers.line = Some(self.map.draw_line(guess, truth, LineStyle::result_line()));
        if let Some(bounds) = LatLngBounds::from_points(&[guess, truth]) {
            self.map.fit_bounds(bounds, self.config.fit_padding);
        }

        self.display.score_text = format_score(self.session.score);
        self.display.result = Some(ResultPanel {
            distance_text: format_distance(distance_m as f64),
            distance_class: result.distance_class,
            points_text: format!("+{}", points),
        });
        self.display.action = ActionButton::Next;

        tracing::info!(
            "Round {} scored: {}m, {} points (total {})",
            self.session.round,
            distance_m,
            points,
            self.session.score
        );

        Outcome::Scored {
            result,
            total: self.session.score,
        }
    }

    /// Advance to the next round, or end the session after the last one
    pub fn on_next(&mut self) -> Result<Outcome, GameError> {
        if self.session.phase != RoundPhase::Guessed {
            return Ok(Outcome::Ignored);
        }

        if self.session.round >= self.config.rounds_per_session {
            return Ok(self.finish_session());
        }

        self.session.round += 1;
        self.start_round()
    }

    /// Wipe score and history and start again from round one
    pub fn on_play_again(&mut self) -> Result<Outcome, GameError> {
        self.session.reset();
        self.display = DisplayState::new();
        tracing::info!("Session restarted");
        self.start_round()
    }

    fn finish_session(&mut self) -> Outcome {
        let final_score = self.session.score;
        let tier = ScoreTier::classify(final_score, self.config.max_score());

        self.session.phase = RoundPhase::Over;
        self.display.game_over = Some(GameOverPanel {
            final_score_text: format_score(final_score),
            message: tier.message().to_string(),
        });

        tracing::info!("Session over: {} points ({:?})", final_score, tier);
        Outcome::SessionOver { final_score, tier }
    }

    fn clear_round_layers(&mut self) {
        let layers = std::mem::take(&mut self.layers);
        for id in [layers.guess, layers.truth, layers.line].into_iter().flatten() {
            self.map.remove_layer(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{HeadlessMap, Viewport};

    fn stations() -> StationPool {
        StationPool::new(vec![
            Station::new("Bank", LatLng::new(51.5133, -0.0886)),
            Station::new("Angel", LatLng::new(51.5322, -0.1057)),
            Station::new("Oval", LatLng::new(51.4819, -0.1127)),
        ])
    }

    fn controller() -> RoundController<HeadlessMap> {
        let config = GameConfig::default();
        let map = HeadlessMap::new(config.default_center, config.default_zoom);
        RoundController::seeded(config, stations(), map, 99)
    }

    fn target(c: &RoundController<HeadlessMap>) -> LatLng {
        c.current_station().unwrap().location
    }

    #[test]
    fn test_start_round_resets_view() {
        let mut c = controller();
        let outcome = c.start_round().unwrap();
        assert!(matches!(outcome, Outcome::RoundStarted { round: 1, .. }));
        assert_eq!(c.phase(), RoundPhase::AwaitingGuess);
        assert_eq!(c.map().tile_layer, TileLayer::Unlabeled);
        assert_eq!(
            c.map().viewport,
            Viewport::Centered { center: c.config().default_center, zoom: 11 }
        );
        assert_eq!(c.display().round_label, "1/10");
        assert_eq!(c.display().station_name, c.current_station().unwrap().name);
        assert!(!c.display().submit_enabled);
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let config = GameConfig::default();
        let map = HeadlessMap::new(config.default_center, config.default_zoom);
        let mut c = RoundController::seeded(config, StationPool::default(), map, 1);
        assert!(matches!(c.start_round(), Err(GameError::NoStations)));
        assert_eq!(c.phase(), RoundPhase::Idle);
        assert_eq!(c.handle(Input::Submit).unwrap(), Outcome::Ignored);
    }

    #[test]
    fn test_click_replaces_guess_marker() {
        let mut c = controller();
        c.start_round().unwrap();
        c.on_map_click(LatLng::new(51.50, -0.10));
        c.on_map_click(LatLng::new(51.51, -0.11));
        assert_eq!(c.map().markers(MarkerKind::Guess), vec![LatLng::new(51.51, -0.11)]);
        assert!(c.display().submit_enabled);
        assert!(!c.display().hint_visible);
    }

    #[test]
    fn test_submit_without_guess_is_ignored() {
        let mut c = controller();
        c.start_round().unwrap();
        assert_eq!(c.on_submit(), Outcome::Ignored);
        assert_eq!(c.phase(), RoundPhase::AwaitingGuess);
    }

    #[test]
    fn test_exact_guess_scores_full_points() {
        let mut c = controller();
        c.start_round().unwrap();
        let truth = target(&c);
        c.on_map_click(truth);
        match c.on_submit() {
            Outcome::Scored { result, total } => {
                assert_eq!(result.distance_m, 0);
                assert_eq!(result.points, 1000);
                assert_eq!(total, 1000);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(c.map().tile_layer, TileLayer::Labeled);
        assert_eq!(c.map().markers(MarkerKind::Truth), vec![truth]);
        assert_eq!(c.map().line_count(), 1);
        assert!(matches!(c.map().viewport, Viewport::Fitted { padding: 80, .. }));
        let panel = c.display().result.as_ref().unwrap();
        assert_eq!(panel.distance_text, "0m");
        assert_eq!(panel.points_text, "+1000");
        assert_eq!(panel.distance_class, DistanceClass::Excellent);
        assert_eq!(c.display().action, ActionButton::Next);
        assert_eq!(c.display().score_text, "1,000");
    }

    #[test]
    fn test_inputs_after_submit_are_ignored() {
        let mut c = controller();
        c.start_round().unwrap();
        c.on_map_click(target(&c));
        c.on_submit();
        assert_eq!(c.on_map_click(LatLng::new(51.0, 0.0)), Outcome::Ignored);
        assert_eq!(c.on_submit(), Outcome::Ignored);
        assert_eq!(c.session().score, 1000);
        assert_eq!(c.map().markers(MarkerKind::Guess).len(), 1);
    }

    #[test]
    fn test_next_before_submit_is_ignored() {
        let mut c = controller();
        c.start_round().unwrap();
        assert_eq!(c.on_next().unwrap(), Outcome::Ignored);
        assert_eq!(c.session().round, 1);
    }

    #[test]
    fn test_next_clears_layers() {
        let mut c = controller();
        c.start_round().unwrap();
        c.on_map_click(LatLng::new(51.52, -0.12));
        c.on_submit();
        let outcome = c.on_next().unwrap();
        assert!(matches!(outcome, Outcome::RoundStarted { round: 2, .. }));
        assert!(c.map().layers.is_empty());
        assert_eq!(c.map().tile_layer, TileLayer::Unlabeled);
        assert!(c.display().result.is_none());
        assert_eq!(c.display().round_badge, "Round 2");
        assert!(c.last_result().is_none());
    }

    #[test]
    fn test_far_guess_scores_zero() {
        let mut c = controller();
        c.start_round().unwrap();
        // Brighton
        c.on_map_click(LatLng::new(50.8225, -0.1372));
        match c.on_submit() {
            Outcome::Scored { result, .. } => {
                assert!(result.distance_m > 5000);
                assert_eq!(result.points, 0);
                assert_eq!(result.distance_class, DistanceClass::Far);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(c.display().result.as_ref().unwrap().distance_text.ends_with("km"));
    }

    #[test]
    fn test_play_again_from_mid_session() {
        let mut c = controller();
        c.start_round().unwrap();
        c.on_map_click(target(&c));
        c.on_submit();
        c.on_next().unwrap();
        let outcome = c.handle(Input::PlayAgain).unwrap();
        assert!(matches!(outcome, Outcome::RoundStarted { round: 1, .. }));
        assert_eq!(c.session().score, 0);
        assert_eq!(c.session().used_stations.len(), 1);
        assert_eq!(c.display().score_text, "0");
    }
}
