//! # Play Command
//!
//! Interactive Loba at the terminal.
//!
//! - **Human vs AI** (`--vs human`): seat 1 is yours and is played by typing
//!   commands (see [`crate::validation::HELP`]); every other seat is driven
//!   by the turn orchestrator with the configured strategy.
//! - **AI only** (`--vs ai`): every seat is computer-controlled and the game
//!   is narrated to stdout.
//!
//! Rounds follow each other until the game-over threshold is reached. A
//! round in which the current player can neither draw from the deck nor
//! pick up the discard is abandoned and redealt.

use std::io::{BufRead, Write};
use std::time::Duration;

use crate::cli::Vs;
use crate::config;
use crate::error::CliError;
use crate::formatters::{
    displayed_hand, format_event, format_round_summary, game_winner, render_table,
};
use crate::io_utils::read_stdin_line;
use crate::session::{runtime, MAX_ABANDONED_ROUNDS};
use crate::ui;
use crate::validation::{parse_command, resolve_positions, Command, ParseResult, HELP};
use loba_ai::moves::discard_pickups;
use loba_ai::orchestrator::{TurnOrchestrator, TurnOutcome};
use loba_ai::{create_strategy, strategy_names, StrategyOptions};
use loba_engine::engine::ActionOutcome;
use loba_engine::game::{GameMode, GameState, TurnPhase};
use loba_engine::player::TurnAction;

/// Options of the play command; `None` falls back to the configuration.
#[derive(Debug, Clone)]
pub struct PlayArgs {
    pub vs: Vs,
    pub players: Option<usize>,
    pub seed: Option<u64>,
    pub mode: Option<String>,
    pub strategy: Option<String>,
}

/// How a human turn ended.
enum HumanTurn {
    Passed,
    Quit,
}

/// Handle the play command.
///
/// # Errors
///
/// - `CliError::InvalidInput` for an unknown mode or strategy
/// - `CliError::Interrupted` when stdin closes before the game is over
/// - `CliError::Engine` / `CliError::Turn` if the game cannot continue
pub fn handle_play_command(
    args: PlayArgs,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let cfg = config::load()?;
    let players = args.players.unwrap_or(cfg.players);
    let mode: GameMode = match args.mode.as_deref() {
        Some(m) => m.parse().map_err(CliError::InvalidInput)?,
        None => cfg.mode,
    };
    let strategy = args
        .strategy
        .unwrap_or_else(|| cfg.strategy.clone())
        .trim()
        .to_ascii_lowercase();
    if !strategy_names().contains(&strategy.as_str()) {
        let msg = format!(
            "unknown strategy '{}' (expected one of {})",
            strategy,
            strategy_names().join(", ")
        );
        ui::write_error(err, &msg)?;
        return Err(CliError::InvalidInput(msg));
    }
    let seed = args.seed.or(cfg.seed).unwrap_or_else(rand::random);
    let humans = match args.vs {
        Vs::Human => 1,
        Vs::Ai => 0,
    };

    let mut options = cfg.game_options(Some(seed), humans);
    options.mode = mode;
    let mut state = GameState::new(players, options)?;

    let orchestrator = TurnOrchestrator::new(create_strategy(
        &strategy,
        &StrategyOptions {
            seed: Some(seed),
            remote_url: Some(cfg.remote_url.clone()),
        },
    ))
    .with_pace(Duration::from_millis(cfg.ai_delay_ms));
    let rt = runtime()?;

    writeln!(
        out,
        "play: vs={} players={} mode={} strategy={} seed={}",
        args.vs.as_str(),
        players,
        mode_label(mode),
        orchestrator.strategy_name(),
        seed
    )?;
    if humans > 0 {
        writeln!(out, "You are P1. Type h for help.")?;
    }
    ui::heading(out, &format!("Round {}", state.round()))?;

    let mut abandoned = 0u32;
    loop {
        match state.phase() {
            TurnPhase::RoundOver | TurnPhase::GameOver => {
                if let Some(summary) = state.last_round() {
                    for line in format_round_summary(summary) {
                        writeln!(out, "{}", line)?;
                    }
                }
                if state.phase() == TurnPhase::GameOver {
                    break;
                }
                state.start_new_round()?;
                ui::heading(out, &format!("Round {}", state.round()))?;
                continue;
            }
            TurnPhase::Draw | TurnPhase::Play => {}
        }

        let seat = state.current_player_id();
        let stalled = if state.current_player().is_ai() {
            let mut events = Vec::new();
            let mut collect = |_: &GameState, o: &ActionOutcome| events.push(o.event.clone());
            let outcome = rt.block_on(orchestrator.play_turn(&mut state, &mut collect))?;
            for event in &events {
                writeln!(out, "{}", format_event(event, &state, humans == 0))?;
            }
            outcome == TurnOutcome::Stalled
        } else if cannot_draw(&state) {
            true
        } else {
            match human_turn(&mut state, out, err, stdin)? {
                HumanTurn::Passed => false,
                HumanTurn::Quit => {
                    writeln!(out, "Session ended by player in round {}.", state.round())?;
                    return Ok(());
                }
            }
        };

        if stalled {
            abandoned += 1;
            writeln!(
                out,
                "P{} cannot draw: round {} abandoned.",
                seat + 1,
                state.round()
            )?;
            if abandoned >= MAX_ABANDONED_ROUNDS {
                writeln!(out, "Too many abandoned rounds, game stopped.")?;
                return Ok(());
            }
            state.start_new_round()?;
            ui::heading(out, &format!("Round {}", state.round()))?;
        }
    }

    let winner = game_winner(&state);
    writeln!(out, "Game over after {} rounds: P{} wins.", state.round(), winner + 1)?;
    Ok(())
}

fn mode_label(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Points => "points",
        GameMode::Rounds => "rounds",
    }
}

/// The current player is in the draw phase with an empty deck, no discard
/// reshuffle to fall back on, and no discard pick-up available.
fn cannot_draw(state: &GameState) -> bool {
    let reshuffle = state.settings().reshuffle_discard && state.discard_pile().len() > 1;
    state.phase() == TurnPhase::Draw
        && state.deck_remaining() == 0
        && !reshuffle
        && discard_pickups(state).is_empty()
}

/// Read and apply commands until the human's turn passes or the round ends.
fn human_turn(
    state: &mut GameState,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<HumanTurn, CliError> {
    let seat = state.current_player_id();
    let round = state.round();
    let mut show_table = true;

    while state.current_player_id() == seat
        && state.round() == round
        && matches!(state.phase(), TurnPhase::Draw | TurnPhase::Play)
    {
        if show_table {
            for line in render_table(state, seat) {
                writeln!(out, "{}", line)?;
            }
            show_table = false;
        }
        write!(out, "[{}] > ", state.phase())?;
        out.flush()?;

        let Some(input) = read_stdin_line(stdin) else {
            return Err(CliError::Interrupted("input closed".to_string()));
        };
        let command = match parse_command(&input) {
            ParseResult::Command(Command::Help) => {
                writeln!(out, "{}", HELP)?;
                continue;
            }
            ParseResult::Command(c) => c,
            ParseResult::Quit => return Ok(HumanTurn::Quit),
            ParseResult::Invalid(msg) => {
                ui::write_error(err, &msg)?;
                continue;
            }
        };

        match apply_command(state, command) {
            Ok(Some(outcome)) => {
                writeln!(out, "{}", format_event(&outcome.event, state, true))?;
                show_table = true;
            }
            Ok(None) => show_table = true,
            Err(msg) => ui::write_error(err, &msg)?,
        }
    }
    Ok(HumanTurn::Passed)
}

/// Translate a typed command into engine calls. `Ok(None)` for commands
/// that only change the view or the selection.
fn apply_command(state: &mut GameState, command: Command) -> Result<Option<ActionOutcome>, String> {
    let seat = state.current_player_id();
    let hand: Vec<_> = state
        .player(seat)
        .map(displayed_hand)
        .unwrap_or_default()
        .iter()
        .map(|c| c.id)
        .collect();
    let ids = |positions: &[usize]| resolve_positions(positions, &hand);
    let meld_index = |meld: usize| {
        meld.checked_sub(1)
            .ok_or_else(|| "Meld numbers start at 1".to_string())
    };

    let result = match command {
        Command::Draw => state.draw_from_deck(),
        Command::PickUp(p) if p.is_empty() => state.draw_from_discard(),
        Command::PickUp(p) => state.apply_action(&TurnAction::DrawFromDiscard { cards: ids(&p)? }),
        Command::Meld(p) if p.is_empty() => state.meld_selected_cards(),
        Command::Meld(p) => state.apply_action(&TurnAction::Meld { cards: ids(&p)? }),
        Command::LayOff { meld, cards } if cards.is_empty() => {
            state.lay_off_cards(meld_index(meld)?)
        }
        Command::LayOff { meld, cards } => state.apply_action(&TurnAction::LayOff {
            meld_index: meld_index(meld)?,
            cards: ids(&cards)?,
        }),
        Command::Discard(p) => {
            let card = ids(&[p])?
                .first()
                .copied()
                .ok_or_else(|| "Discard requires one card".to_string())?;
            state.apply_action(&TurnAction::Discard { card })
        }
        Command::Select(p) => {
            for id in ids(&p)? {
                state.toggle_card(id).map_err(|e| e.to_string())?;
            }
            return Ok(None);
        }
        Command::Sort => {
            if let Some(player) = state.players_mut().get_mut(seat) {
                let on = player.auto_sort();
                player.set_auto_sort(!on);
            }
            return Ok(None);
        }
        Command::Help => return Ok(None),
    };
    result.map(Some).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loba_engine::cards::CardFace;
    use loba_engine::engine::TurnEvent;
    use loba_engine::game::{GameOptions, TableLayout};

    fn faces(s: &str) -> Vec<CardFace> {
        s.split_whitespace().map(|f| f.parse().unwrap()).collect()
    }

    fn table() -> GameState {
        let layout = TableLayout {
            hands: vec![faces("KD 5H 9S 5C 5D"), faces("3H 8C 8D QS")],
            discard: faces("JH"),
            melds: vec![],
            deck_top: faces("2C"),
        };
        let options = GameOptions {
            seed: Some(4),
            ..GameOptions::default()
        };
        GameState::from_layout(layout, options).unwrap()
    }

    #[test]
    fn positions_follow_the_sorted_view() {
        let mut state = table();
        let drew = apply_command(&mut state, Command::Draw).unwrap().unwrap();
        assert!(matches!(drew.event, TurnEvent::Drew { player: 0, .. }));

        // Sorted view: 2C 5H 5D 5C 9S KD
        apply_command(&mut state, Command::Select(vec![2, 3, 4])).unwrap();
        assert_eq!(state.selection().len(), 3);
        let melded = apply_command(&mut state, Command::Meld(vec![])).unwrap().unwrap();
        assert!(matches!(melded.event, TurnEvent::Melded { meld_index: 0, .. }));
        assert_eq!(state.melds()[0].cards.len(), 3);

        let discarded = apply_command(&mut state, Command::Discard(1)).unwrap().unwrap();
        assert!(matches!(discarded.event, TurnEvent::Discarded { player: 0, .. }));
        assert_eq!(state.discard_top().unwrap().face(), "2C".parse().unwrap());
        assert_eq!(state.current_player_id(), 1);
    }

    #[test]
    fn engine_rejections_become_messages() {
        let mut state = table();
        let msg = apply_command(&mut state, Command::Meld(vec![1, 2, 3])).unwrap_err();
        assert!(msg.contains("phase draw"));
        let msg = apply_command(&mut state, Command::Discard(6)).unwrap_err();
        assert!(msg.contains("No card at position 6"));
        assert_eq!(state.players()[0].hand().len(), 5);
    }

    #[test]
    fn sort_toggle_switches_to_dealt_order() {
        let mut state = table();
        assert!(apply_command(&mut state, Command::Sort).unwrap().is_none());
        assert!(!state.players()[0].auto_sort());
        let first = displayed_hand(&state.players()[0])[0];
        assert_eq!(first.face(), "KD".parse().unwrap());
    }

    #[test]
    fn a_fresh_deal_can_always_draw() {
        assert!(!cannot_draw(&table()));
    }
}
