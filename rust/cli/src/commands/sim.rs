//! Simulation command handler: AI-only games in bulk.
//!
//! Every seat is driven by the configured strategy. Game `i` is dealt from
//! `seed + i`, so a seeded run is reproducible. With `--output`, each
//! finished or abandoned round is appended to a JSONL round history.
//!
//! # Examples
//!
//! ```no_run
//! use loba_cli::commands::sim::handle_sim_command;
//! use std::io;
//!
//! let mut out = io::stdout();
//! let mut err = io::stderr();
//! handle_sim_command(10, Some(3), Some(42), Some("data/rounds.jsonl".into()), &mut out, &mut err).unwrap();
//! ```

use std::time::Duration;

use crate::config::{self, Config};
use crate::error::CliError;
use crate::formatters::game_winner;
use crate::session::{play_ai_game, runtime, RoundEnd};
use crate::ui;
use loba_ai::orchestrator::TurnOrchestrator;
use loba_ai::{create_strategy, StrategyOptions};
use loba_engine::game::GameState;
use loba_engine::logger::RoundLogger;
use std::io::Write;

/// Handle the sim command.
///
/// # Arguments
///
/// * `games` - Number of games to play (>= 1)
/// * `players` - Seats per game; the configured count when `None`
/// * `seed` - Base seed; game `i` uses `seed + i`
/// * `output` - JSONL round history path
pub fn handle_sim_command(
    games: u32,
    players: Option<usize>,
    seed: Option<u64>,
    output: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if games == 0 {
        ui::write_error(err, "games must be >= 1")?;
        return Err(CliError::InvalidInput("games must be >= 1".to_string()));
    }
    let cfg = config::load()?;
    let players = players.unwrap_or(cfg.players);
    let base_seed = seed.or(cfg.seed).unwrap_or_else(rand::random);

    let mut logger = match output.as_deref() {
        Some(path) => match RoundLogger::create(path) {
            Ok(l) => Some(l),
            Err(e) => {
                ui::write_error(err, &format!("Failed to open output file: {}", e))?;
                return Err(CliError::Io(e));
            }
        },
        None => None,
    };

    writeln!(
        out,
        "sim: games={} players={} strategy={} seed={}",
        games, players, cfg.strategy, base_seed
    )?;

    let rt = runtime()?;
    let mut wins = vec![0u32; players];
    let mut totals = SimTotals::default();

    for i in 0..games {
        let game_seed = base_seed.wrapping_add(u64::from(i));
        let mut state = GameState::new(players, cfg.game_options(Some(game_seed), 0))?;
        let seats = seats_for(&cfg, players, game_seed);

        let report = rt.block_on(play_ai_game(&mut state, &seats, |state, end| {
            let Some(logger) = logger.as_mut() else {
                return Ok(());
            };
            let mut record = state.round_record(logger.next_id());
            record.meta = Some(serde_json::json!({
                "game": i + 1,
                "abandoned": matches!(end, RoundEnd::Abandoned),
            }));
            logger.write(&record)?;
            Ok(())
        }))?;

        totals.rounds += report.rounds;
        totals.abandoned += report.abandoned;
        totals.stalls += report.stalls;
        if report.finished {
            totals.finished += 1;
            wins[game_winner(&state)] += 1;
        }
    }

    writeln!(out, "Games played: {}", games)?;
    writeln!(
        out,
        "Finished: {}  Rounds: {}  Abandoned rounds: {}  Stalls: {}",
        totals.finished, totals.rounds, totals.abandoned, totals.stalls
    )?;
    for (seat, w) in wins.iter().enumerate() {
        writeln!(out, "P{} wins: {}", seat + 1, w)?;
    }
    if let Some(path) = output {
        writeln!(out, "Round history: {}", path)?;
    }
    Ok(())
}

#[derive(Debug, Default)]
struct SimTotals {
    finished: u32,
    rounds: u32,
    abandoned: u32,
    stalls: u32,
}

/// One orchestrator per seat, each with its own strategy instance so that
/// seeded random strategies do not share a generator.
fn seats_for(cfg: &Config, players: usize, seed: u64) -> Vec<TurnOrchestrator> {
    (0..players)
        .map(|seat| {
            let options = StrategyOptions {
                seed: Some(seed.wrapping_add(seat as u64)),
                remote_url: Some(cfg.remote_url.clone()),
            };
            TurnOrchestrator::new(create_strategy(&cfg.strategy, &options))
                .with_pace(Duration::from_millis(cfg.ai_delay_ms))
        })
        .collect()
}
