//! Head-to-head strategy evaluation.
//!
//! Two strategies play two-seat games against each other. Seats alternate
//! every game so neither side always moves first, and game `i` is dealt from
//! `seed + i`.

use std::time::Duration;

use crate::config;
use crate::error::CliError;
use crate::formatters::game_winner;
use crate::session::{play_ai_game, runtime, RoundEnd};
use crate::ui;
use loba_ai::orchestrator::TurnOrchestrator;
use loba_ai::{create_strategy, strategy_names, StrategyOptions};
use loba_engine::game::GameState;
use std::io::Write;

/// Per-strategy tallies.
#[derive(Debug, Clone, Default)]
struct EvalStats {
    games_won: u32,
    rounds_won: u32,
    penalty_points: u64,
    rounds_played: u32,
}

impl EvalStats {
    fn win_rate(&self, games: u32) -> f64 {
        if games == 0 {
            0.0
        } else {
            (self.games_won as f64 / games as f64) * 100.0
        }
    }

    fn avg_penalty(&self) -> f64 {
        if self.rounds_played == 0 {
            0.0
        } else {
            self.penalty_points as f64 / self.rounds_played as f64
        }
    }
}

/// Evaluates two strategies head-to-head.
///
/// # Errors
///
/// `CliError::InvalidInput` for an unknown strategy name or zero games.
pub fn handle_eval_command(
    ai_a: &str,
    ai_b: &str,
    games: u32,
    seed: Option<u64>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if games == 0 {
        ui::write_error(err, "games must be >= 1")?;
        return Err(CliError::InvalidInput("games must be >= 1".to_string()));
    }
    for name in [ai_a, ai_b] {
        if !strategy_names().contains(&name.trim().to_ascii_lowercase().as_str()) {
            let msg = format!(
                "unknown strategy '{}' (expected one of {})",
                name,
                strategy_names().join(", ")
            );
            ui::write_error(err, &msg)?;
            return Err(CliError::InvalidInput(msg));
        }
    }

    let cfg = config::load()?;
    let base_seed = seed.or(cfg.seed).unwrap_or_else(rand::random);
    let pace = Duration::from_millis(cfg.ai_delay_ms);
    let build = |name: &str, seed: u64| {
        let options = StrategyOptions {
            seed: Some(seed),
            remote_url: Some(cfg.remote_url.clone()),
        };
        TurnOrchestrator::new(create_strategy(name, &options)).with_pace(pace)
    };

    writeln!(
        out,
        "eval: {} vs {} games={} seed={}",
        ai_a, ai_b, games, base_seed
    )?;

    let rt = runtime()?;
    let mut stats = [EvalStats::default(), EvalStats::default()];
    let mut unfinished = 0u32;

    for i in 0..games {
        let game_seed = base_seed.wrapping_add(u64::from(i));
        // side[seat] is the index into `stats` of the strategy in that seat
        let side = if i % 2 == 0 { [0, 1] } else { [1, 0] };
        let names = [ai_a, ai_b];
        let seats = vec![
            build(names[side[0]], game_seed),
            build(names[side[1]], game_seed.wrapping_add(1)),
        ];

        let mut state = GameState::new(2, cfg.game_options(Some(game_seed), 0))?;
        let report = rt.block_on(play_ai_game(&mut state, &seats, |_, end| {
            if let RoundEnd::Finished(summary) = end {
                stats[side[summary.winner]].rounds_won += 1;
                for (seat, points) in &summary.penalties {
                    stats[side[*seat]].penalty_points += u64::from(*points);
                }
                for s in stats.iter_mut() {
                    s.rounds_played += 1;
                }
            }
            Ok(())
        }))?;

        if report.finished {
            stats[side[game_winner(&state)]].games_won += 1;
        } else {
            unfinished += 1;
        }
    }

    writeln!(out, "Games: {} (unfinished: {})", games, unfinished)?;
    for (name, s) in [ai_a, ai_b].iter().zip(&stats) {
        writeln!(
            out,
            "{}: wins {} ({:.1}%), rounds won {}, avg penalty {:.2}/round",
            name,
            s.games_won,
            s.win_rate(games),
            s.rounds_won,
            s.avg_penalty()
        )?;
    }
    Ok(())
}
