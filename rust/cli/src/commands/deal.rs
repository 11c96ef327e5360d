//! Deal command handler: shuffle, deal one round and print it.

use crate::error::CliError;
use crate::formatters::{format_card, format_cards};
use loba_engine::cards::sort_for_display;
use loba_engine::game::{GameOptions, GameState};
use std::io::Write;

/// Deals a fresh round for `players` seats and prints every hand (sorted for
/// display), the discard top and the deck size. The same seed always deals
/// the same cards.
pub fn handle_deal_command(
    seed: Option<u64>,
    players: usize,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let options = GameOptions {
        seed: Some(seed.unwrap_or_else(rand::random)),
        human_players: 0,
        ..GameOptions::default()
    };
    let state = GameState::new(players, options)?;

    writeln!(out, "Seed: {}", state.seed())?;
    for p in state.players() {
        writeln!(
            out,
            "Hand P{}: {}",
            p.id() + 1,
            format_cards(&sort_for_display(p.hand()))
        )?;
    }
    let top = state
        .discard_top()
        .ok_or(loba_engine::errors::GameError::DiscardPileEmpty)?;
    writeln!(out, "Discard: {}", format_card(&top))?;
    writeln!(out, "Deck: {} cards", state.deck_remaining())?;
    Ok(())
}
