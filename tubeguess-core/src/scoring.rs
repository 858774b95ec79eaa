//! Round scoring, distance tiers and end-of-game messages
//!
//! All functions here are pure; the controller feeds them the rounded
//! distance between guess and station.

use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Points for a perfect round
pub const MAX_ROUND_POINTS: u32 = 1000;

/// Guesses closer than this (meters) score full points
pub const PERFECT_RADIUS_M: f64 = 50.0;

/// Guesses further than this (meters) score nothing
pub const CUTOFF_RADIUS_M: f64 = 5000.0;

/// Per-meter decay base
pub const DECAY_BASE: f64 = 0.9995;

// ============================================================================
// SCORING
// ============================================================================

/// Points earned for a guess `distance_m` meters away
pub fn calculate_score(distance_m: f64) -> u32 {
    if distance_m < PERFECT_RADIUS_M {
        return MAX_ROUND_POINTS;
    }
    if distance_m > CUTOFF_RADIUS_M {
        return 0;
    }
    (MAX_ROUND_POINTS as f64 * DECAY_BASE.powf(distance_m)).round() as u32
}

/// Styling tier for a distance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceClass {
    Excellent,
    Good,
    Ok,
    Far,
}

impl DistanceClass {
    pub fn classify(distance_m: f64) -> Self {
        if distance_m < 200.0 {
            DistanceClass::Excellent
        } else if distance_m < 500.0 {
            DistanceClass::Good
        } else if distance_m < 1000.0 {
            DistanceClass::Ok
        } else {
            DistanceClass::Far
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceClass::Excellent => "excellent",
            DistanceClass::Good => "good",
            DistanceClass::Ok => "ok",
            DistanceClass::Far => "far",
        }
    }
}

impl std::fmt::Display for DistanceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// `"950m"` below a kilometer, `"1.5km"` from there on
pub fn format_distance(distance_m: f64) -> String {
    if distance_m < 1000.0 {
        format!("{}m", distance_m.round() as i64)
    } else {
        format!("{:.1}km", distance_m / 1000.0)
    }
}

/// Score with thousands separators, e.g. `8,500`
pub fn format_score(score: u32) -> String {
    let digits = score.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// END OF GAME
// ============================================================================

/// End-of-game rating, from best to worst
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Expert,
    Impressive,
    WellDone,
    GoodEffort,
    KeepExploring,
}

impl ScoreTier {
    /// Rate a cumulative score against the session maximum.
    ///
    /// Thresholds sit strictly above 80/60/40/20 percent of `max_score`,
    /// i.e. 8000/6000/4000/2000 for a ten-round session.
    pub fn classify(score: u32, max_score: u32) -> Self {
        let score = score as u64 * 10;
        let max = max_score as u64;
        if score > max * 8 {
            ScoreTier::Expert
        } else if score > max * 6 {
            ScoreTier::Impressive
        } else if score > max * 4 {
            ScoreTier::WellDone
        } else if score > max * 2 {
            ScoreTier::GoodEffort
        } else {
            ScoreTier::KeepExploring
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ScoreTier::Expert => "You're a London expert! 🏆",
            ScoreTier::Impressive => "Impressive knowledge! 🌟",
            ScoreTier::WellDone => "Well done! 👏",
            ScoreTier::GoodEffort => "Good effort! 👍",
            ScoreTier::KeepExploring => "Keep exploring the Tube! 🗺️",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_plateau_and_cutoff() {
        assert_eq!(calculate_score(0.0), 1000);
        assert_eq!(calculate_score(49.9), 1000);
        assert_eq!(calculate_score(5000.1), 0);
        assert_eq!(calculate_score(12_000.0), 0);
    }

    #[test]
    fn test_score_decay() {
        assert_eq!(calculate_score(50.0), (1000.0 * 0.9995f64.powf(50.0)).round() as u32);
        assert_eq!(calculate_score(50.0), 975);
        assert_eq!(calculate_score(1000.0), 606);
        assert_eq!(calculate_score(5000.0), 82);
    }

    #[test]
    fn test_score_strictly_decreasing() {
        let mut prev = calculate_score(50.0);
        // Step wide enough that rounding never produces a tie
        let mut d = 150.0;
        while d <= 5000.0 {
            let s = calculate_score(d);
            assert!(s < prev, "score({}) = {} not below {}", d, s, prev);
            prev = s;
            d += 100.0;
        }
    }

    #[test]
    fn test_distance_class_boundaries() {
        assert_eq!(DistanceClass::classify(199.0), DistanceClass::Excellent);
        assert_eq!(DistanceClass::classify(200.0), DistanceClass::Good);
        assert_eq!(DistanceClass::classify(499.0), DistanceClass::Good);
        assert_eq!(DistanceClass::classify(500.0), DistanceClass::Ok);
        assert_eq!(DistanceClass::classify(999.0), DistanceClass::Ok);
        assert_eq!(DistanceClass::classify(1000.0), DistanceClass::Far);
        assert_eq!(DistanceClass::Far.to_string(), "far");
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(950.0), "950m");
        assert_eq!(format_distance(999.0), "999m");
        assert_eq!(format_distance(1000.0), "1.0km");
        assert_eq!(format_distance(1500.0), "1.5km");
        assert_eq!(format_distance(12_340.0), "12.3km");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0), "0");
        assert_eq!(format_score(999), "999");
        assert_eq!(format_score(1000), "1,000");
        assert_eq!(format_score(8500), "8,500");
        assert_eq!(format_score(1_234_567), "1,234,567");
    }

    #[test]
    fn test_score_tiers() {
        assert_eq!(ScoreTier::classify(8500, 10_000), ScoreTier::Expert);
        assert_eq!(ScoreTier::classify(8000, 10_000), ScoreTier::Impressive);
        assert_eq!(ScoreTier::classify(6001, 10_000), ScoreTier::Impressive);
        assert_eq!(ScoreTier::classify(6000, 10_000), ScoreTier::WellDone);
        assert_eq!(ScoreTier::classify(4000, 10_000), ScoreTier::GoodEffort);
        assert_eq!(ScoreTier::classify(2001, 10_000), ScoreTier::GoodEffort);
        assert_eq!(ScoreTier::classify(2000, 10_000), ScoreTier::KeepExploring);
        assert_eq!(ScoreTier::classify(0, 10_000), ScoreTier::KeepExploring);
        assert_eq!(ScoreTier::Expert.message(), "You're a London expert! 🏆");
    }
}
