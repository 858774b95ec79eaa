//! Session state and station selection

use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::geo::LatLng;
use crate::station::StationPool;

/// Where the current round is in its lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// No round started yet (or the pool was empty)
    #[default]
    Idle,
    /// Waiting for map clicks / submit
    AwaitingGuess,
    /// Guess scored, waiting for "next"
    Guessed,
    /// Last round finished
    Over,
}

/// Mutable state of one ten-round session
#[derive(Clone, Debug)]
pub struct SessionState {
    /// Index into the station pool
    pub current_station: Option<usize>,
    /// 1-based round number
    pub round: u32,
    pub score: u32,
    /// Names drawn since the last reset
    pub used_stations: FxHashSet<String>,
    pub guess: Option<LatLng>,
    pub has_guessed: bool,
    pub phase: RoundPhase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            current_station: None,
            round: 1,
            score: 0,
            used_stations: FxHashSet::default(),
            guess: None,
            has_guessed: false,
            phase: RoundPhase::Idle,
        }
    }

    /// Back to round one with no score or history
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Draw an unused station at random and mark it used.
    ///
    /// Once every name has been drawn the history is cleared and the whole
    /// pool is eligible again. Returns `None` only for an empty pool.
    pub fn select_next_station<R: Rng>(&mut self, pool: &StationPool, rng: &mut R) -> Option<usize> {
        if pool.is_empty() {
            return None;
        }

        let mut available: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, s)| !self.used_stations.contains(&s.name))
            .map(|(i, _)| i)
            .collect();

        if available.is_empty() {
            tracing::debug!("All {} stations used, resetting history", pool.len());
            self.used_stations.clear();
            available = (0..pool.len()).collect();
        }

        let index = available[rng.gen_range(0..available.len())];
        self.used_stations.insert(pool[index].name.clone());
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::Station;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pool(n: usize) -> StationPool {
        (0..n)
            .map(|i| Station::new(format!("Station {}", i), LatLng::new(51.5, -0.1 + i as f64 * 0.01)))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_empty_pool_yields_none() {
        let mut session = SessionState::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(session.select_next_station(&StationPool::default(), &mut rng), None);
        assert!(session.used_stations.is_empty());
    }

    #[test]
    fn test_no_repeats_until_exhausted() {
        let pool = pool(10);
        let mut session = SessionState::new();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut seen = FxHashSet::default();
        for _ in 0..10 {
            let i = session.select_next_station(&pool, &mut rng).unwrap();
            assert!(seen.insert(i), "station {} drawn twice", i);
        }
        assert_eq!(session.used_stations.len(), 10);
    }

    #[test]
    fn test_history_resets_when_exhausted() {
        let pool = pool(3);
        let mut session = SessionState::new();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..3 {
            session.select_next_station(&pool, &mut rng).unwrap();
        }
        assert_eq!(session.used_stations.len(), 3);

        let fourth = session.select_next_station(&pool, &mut rng).unwrap();
        assert_eq!(session.used_stations.len(), 1);
        assert!(session.used_stations.contains(&pool[fourth].name));
    }

    #[test]
    fn test_single_station_repeats() {
        let pool = pool(1);
        let mut session = SessionState::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..5 {
            assert_eq!(session.select_next_station(&pool, &mut rng), Some(0));
        }
    }

    #[test]
    fn test_reset() {
        let mut session = SessionState::new();
        session.round = 7;
        session.score = 4200;
        session.used_stations.insert("Bank".to_string());
        session.phase = RoundPhase::Over;
        session.reset();
        assert_eq!(session.round, 1);
        assert_eq!(session.score, 0);
        assert!(session.used_stations.is_empty());
        assert_eq!(session.phase, RoundPhase::Idle);
    }
}
