//! Server state management
//!
//! Station data loaded at startup plus one round controller per browser
//! session. Sessions that go idle are evicted, and the map never holds more
//! than `SessionLimits::max_sessions` entries.

use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::Serialize;

use tubeguess_core::{
    DisplayState, GameConfig, HeadlessMap, Outcome, RoundController, RoundPhase, StationPool,
};

use crate::error::{ApiError, ApiResult};

/// One player's game
pub type GameSession = RoundController<HeadlessMap>;

/// Everything the browser needs to render a session
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: RoundPhase,
    pub round: u32,
    pub score: u32,
    /// Effect of the request that produced this snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub display: DisplayState,
    pub map: HeadlessMap,
}

impl SessionSnapshot {
    pub fn capture(session_id: &str, game: &GameSession, outcome: Option<Outcome>) -> Self {
        Self {
            session_id: session_id.to_string(),
            phase: game.phase(),
            round: game.session().round,
            score: game.session().score,
            outcome,
            display: game.display().clone(),
            map: game.map().clone(),
        }
    }
}

/// How long sessions live and how many may exist at once
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionLimits {
    /// A session untouched for this long is dropped
    pub idle_timeout: Duration,
    /// Creating a session beyond this evicts the least recently used one
    pub max_sessions: usize,
}

impl SessionLimits {
    /// How often the background sweep runs
    pub fn sweep_interval(&self) -> Duration {
        (self.idle_timeout / 4).max(Duration::from_secs(1))
    }
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            max_sessions: 10_000,
        }
    }
}

/// A controller plus the last time a request reached it
pub struct SessionEntry {
    pub game: GameSession,
    pub last_seen: Instant,
}

/// Server-wide shared state
pub struct ServerState {
    pub config: GameConfig,
    /// `None` when station data failed to load; the game is unplayable
    pub stations: Option<StationPool>,
    pub limits: SessionLimits,
    pub sessions: RwLock<FxHashMap<String, SessionEntry>>,
    /// Seeds each new session's controller
    rng: Mutex<ChaCha8Rng>,
}

impl ServerState {
    pub fn new(config: GameConfig, stations: Option<StationPool>) -> Self {
        Self {
            config,
            stations,
            limits: SessionLimits::default(),
            sessions: RwLock::new(FxHashMap::default()),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(rand::thread_rng().gen())),
        }
    }

    /// Make the station order of successive sessions reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(ChaCha8Rng::seed_from_u64(seed));
        self
    }

    pub fn with_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = SessionLimits {
            max_sessions: limits.max_sessions.max(1),
            ..limits
        };
        self
    }

    pub fn station_count(&self) -> usize {
        self.stations.as_ref().map_or(0, |pool| pool.len())
    }

    /// Create a session and start its first round
    pub fn create_session(&self) -> ApiResult<SessionSnapshot> {
        let stations = match &self.stations {
            Some(pool) if !pool.is_empty() => pool.clone(),
            _ => return Err(ApiError::StationsUnavailable),
        };

        let id = format!("{:016x}", rand::thread_rng().gen::<u64>());
        let game_seed = self.rng.lock().unwrap_or_else(PoisonError::into_inner).gen();
        let map = HeadlessMap::new(self.config.default_center, self.config.default_zoom);
        let mut game = GameSession::seeded(self.config.clone(), stations, map, game_seed);
        let outcome = game.start_round()?;
        let snapshot = SessionSnapshot::capture(&id, &game, Some(outcome));

        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        self.evict_idle(&mut sessions, now);
        while sessions.len() >= self.limits.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    tracing::info!("Session {} evicted (limit {})", oldest, self.limits.max_sessions);
                }
                None => break,
            }
        }
        sessions.insert(id.clone(), SessionEntry { game, last_seen: now });

        tracing::info!("Session {} created", id);
        Ok(snapshot)
    }

    /// Run `f` against a session while holding the write lock
    pub fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut GameSession) -> ApiResult<T>,
    ) -> ApiResult<T> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let entry = sessions
            .get_mut(id)
            .ok_or_else(|| ApiError::SessionNotFound(id.to_string()))?;
        entry.last_seen = Instant::now();
        f(&mut entry.game)
    }

    /// Drop a session; returns whether it existed
    pub fn remove_session(&self, id: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some();
        if removed {
            tracing::info!("Session {} closed", id);
        }
        removed
    }

    /// Drop every session idle past the timeout; returns how many went
    pub fn evict_idle_sessions(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    /// Same as `evict_idle_sessions`, measured from `now`
    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        self.evict_idle(&mut sessions, now)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn evict_idle(&self, sessions: &mut FxHashMap<String, SessionEntry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_seen) < self.limits.idle_timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("Evicted {} idle sessions", evicted);
        }
        evicted
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(GameConfig::default(), None)
    }
}
