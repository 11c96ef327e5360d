//! Shared driver for games where every seat is computer-controlled (`sim`
//! and `eval`), plus the runtime the commands use to drive the async turn
//! orchestrator.

use loba_ai::orchestrator::{Silent, TurnOrchestrator, TurnOutcome};
use loba_engine::game::{GameState, TurnPhase};
use loba_engine::logger::RoundSummary;

use crate::error::CliError;

/// Turns after which a round that nobody can finish is abandoned.
pub const MAX_TURNS_PER_ROUND: u32 = 1_000;

/// Abandoned rounds after which the game is given up as unfinished.
pub const MAX_ABANDONED_ROUNDS: u32 = 10;

/// How a round ended, as reported to [`play_ai_game`]'s callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEnd<'a> {
    Finished(&'a RoundSummary),
    /// Stalled on an empty deck or ran past [`MAX_TURNS_PER_ROUND`]
    Abandoned,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameReport {
    pub rounds: u32,
    pub abandoned: u32,
    pub stalls: u32,
    pub turns: u32,
    /// False when the game was given up after too many abandoned rounds
    pub finished: bool,
}

/// Single-threaded runtime for the orchestrator; one logical thread of
/// control matches the engine's ownership model.
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Io)
}

/// Play `state` to game over with one orchestrator per seat. `on_round`
/// runs once for every finished or abandoned round, before the next deal.
pub async fn play_ai_game<F>(
    state: &mut GameState,
    seats: &[TurnOrchestrator],
    mut on_round: F,
) -> Result<GameReport, CliError>
where
    F: FnMut(&GameState, RoundEnd<'_>) -> Result<(), CliError>,
{
    if seats.len() != state.players().len() {
        return Err(CliError::InvalidInput(format!(
            "{} strategies for {} seats",
            seats.len(),
            state.players().len()
        )));
    }

    let mut report = GameReport::default();
    let mut round_turns = 0u32;
    loop {
        match state.phase() {
            TurnPhase::RoundOver | TurnPhase::GameOver => {
                report.rounds += 1;
                if let Some(summary) = state.last_round() {
                    on_round(state, RoundEnd::Finished(summary))?;
                }
                if state.phase() == TurnPhase::GameOver {
                    report.finished = true;
                    return Ok(report);
                }
                state.start_new_round()?;
                round_turns = 0;
                continue;
            }
            TurnPhase::Draw | TurnPhase::Play => {}
        }

        if round_turns >= MAX_TURNS_PER_ROUND {
            tracing::warn!(round = state.round(), turns = round_turns, "round abandoned");
            if abandon(state, &mut report, &mut on_round)? {
                return Ok(report);
            }
            round_turns = 0;
            continue;
        }

        let seat = state.current_player_id();
        let outcome = seats[seat].play_turn(state, &mut Silent).await?;
        report.turns += 1;
        round_turns += 1;
        if outcome == TurnOutcome::Stalled {
            // Nothing can be drawn and the engine keeps the turn, so the
            // round cannot progress any further.
            report.stalls += 1;
            if abandon(state, &mut report, &mut on_round)? {
                return Ok(report);
            }
            round_turns = 0;
        }
    }
}

/// Record an abandoned round and redeal. Returns `true` when the game should
/// be given up.
fn abandon<F>(state: &mut GameState, report: &mut GameReport, on_round: &mut F) -> Result<bool, CliError>
where
    F: FnMut(&GameState, RoundEnd<'_>) -> Result<(), CliError>,
{
    report.abandoned += 1;
    on_round(state, RoundEnd::Abandoned)?;
    if report.abandoned >= MAX_ABANDONED_ROUNDS {
        return Ok(true);
    }
    state.start_new_round()?;
    Ok(false)
}
