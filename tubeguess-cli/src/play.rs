//! Play command - a full session in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_controller(), play_session()
//! - Level 3: play_round(), report_result(), report_game_over()
//! - Level 4: input parsing

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::Rng;

use tubeguess_core::{
    GameConfig, HeadlessMap, Input, LatLng, Outcome, RoundController, RoundResult, ScoreTier,
    StationPool, format_distance, format_score,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// GeoJSON file with station features
    #[arg(long, value_name = "FILE", default_value = "data/stations.geojson")]
    pub stations: PathBuf,

    /// Rounds per session
    #[arg(long, default_value = "10")]
    pub rounds: u32,
}

type TerminalGame = RoundController<HeadlessMap>;

/// Why a session loop stopped
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Finished,
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Load stations and build the controller
/// 2. Play sessions until the player stops
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let stations = StationPool::load(&args.stations)
        .with_context(|| format!("Failed to load stations: {}", args.stations.display()))?;
    if stations.is_empty() {
        anyhow::bail!("No valid stations in {}", args.stations.display());
    }

    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    tracing::info!("Playing with {} stations (seed={})", stations.len(), seed);

    let mut game = build_controller(stations, args.rounds, seed);
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    play_session(&mut game, stdin.lock(), stdout.lock())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_controller(stations: StationPool, rounds: u32, seed: u64) -> TerminalGame {
    let config = GameConfig::default().with_rounds(rounds);
    let map = HeadlessMap::new(config.default_center, config.default_zoom);
    RoundController::seeded(config, stations, map, seed)
}

/// Play sessions, offering a rematch after each one
fn play_session<R: BufRead, W: Write>(game: &mut TerminalGame, mut input: R, mut out: W) -> Result<()> {
    let mut outcome = game.start_round()?;

    loop {
        if let SessionEnd::Quit = play_rounds(game, &mut outcome, &mut input, &mut out)? {
            writeln!(out, "Bye!")?;
            return Ok(());
        }

        write!(out, "Play again? [y/N] ")?;
        out.flush()?;
        match read_line(&mut input)? {
            Some(answer) if answer.eq_ignore_ascii_case("y") => {
                outcome = game.handle(Input::PlayAgain)?;
            }
            _ => return Ok(()),
        }
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play rounds until the session ends or the player quits
fn play_rounds<R: BufRead, W: Write>(
    game: &mut TerminalGame,
    outcome: &mut Outcome,
    input: &mut R,
    out: &mut W,
) -> Result<SessionEnd> {
    loop {
        match outcome {
            Outcome::RoundStarted { .. } => {
                if let SessionEnd::Quit = play_round(game, input, out)? {
                    return Ok(SessionEnd::Quit);
                }
                *outcome = game.handle(Input::Next)?;
            }
            Outcome::SessionOver { final_score, tier } => {
                report_game_over(out, *final_score, *tier)?;
                return Ok(SessionEnd::Finished);
            }
            _ => return Ok(SessionEnd::Finished),
        }
    }
}

/// Prompt for a guess until one is scored
fn play_round<R: BufRead, W: Write>(game: &mut TerminalGame, input: &mut R, out: &mut W) -> Result<SessionEnd> {
    let display = game.display();
    writeln!(out)?;
    writeln!(out, "[{}] Where is {}?", display.round_label, display.station_name)?;

    loop {
        write!(out, "guess (lat, lng) or q> ")?;
        out.flush()?;

        let line = match read_line(input)? {
            Some(line) => line,
            None => return Ok(SessionEnd::Quit),
        };
        if line.eq_ignore_ascii_case("q") {
            return Ok(SessionEnd::Quit);
        }

        let at = match parse_guess(&line) {
            Some(at) => at,
            None => {
                writeln!(out, "Enter latitude and longitude, e.g. 51.5074, -0.1278")?;
                continue;
            }
        };

        game.handle(Input::MapClick { at })?;
        if let Outcome::Scored { result, total } = game.handle(Input::Submit)? {
            report_result(out, &result, total)?;
            return Ok(SessionEnd::Finished);
        }
    }
}

fn report_result<W: Write>(out: &mut W, result: &RoundResult, total: u32) -> Result<()> {
    writeln!(
        out,
        "{} away ({}), +{} points. Station was at {:.4}, {:.4}. Total: {}",
        format_distance(result.distance_m as f64),
        result.distance_class,
        result.points,
        result.truth.lat,
        result.truth.lng,
        format_score(total)
    )?;
    Ok(())
}

fn report_game_over<W: Write>(out: &mut W, final_score: u32, tier: ScoreTier) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Game over! Final score: {}", format_score(final_score))?;
    writeln!(out, "{}", tier.message())?;
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Next trimmed line, `None` at end of input
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Parse `"lat, lng"` or `"lat lng"`
fn parse_guess(line: &str) -> Option<LatLng> {
    let mut parts = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let lat = parts.next()?.parse().ok()?;
    let lng = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let at = LatLng::new(lat, lng);
    at.is_valid().then_some(at)
}

// ============================================================================
// TESTS
// ============================================================================
