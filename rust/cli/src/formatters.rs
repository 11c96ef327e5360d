//! Card, table and event formatters for terminal display.
//!
//! Cards render with Unicode suit symbols (`7♥`, `10♠`, `🃏`) and fall back to
//! letters (`7h`, `10s`, `JK`) on Windows consoles that are not known to
//! handle them. Everything here is a pure function of the game state.
//!
//! ## Example
//!
//! ```rust
//! use loba_engine::cards::full_deck;
//! use loba_cli::formatters::format_card;
//!
//! let deck = full_deck();
//! let first = format_card(&deck[0]);
//! assert!(first == "A♥" || first == "Ah");
//! ```

use loba_engine::cards::{sort_for_display, Card, CardId, Suit};
use loba_engine::engine::TurnEvent;
use loba_engine::game::{GameMode, GameState};
use loba_engine::logger::RoundSummary;
use loba_engine::melds::MeldKind;
use loba_engine::player::{Player, PlayerId};

/// Check if the terminal supports Unicode card symbols by detecting modern terminal environments.
///
/// On Windows, checks for Windows Terminal (WT_SESSION), modern terminals (TERM_PROGRAM),
/// or VS Code (VSCODE_INJECTION). On Unix-like systems, assumes Unicode support.
pub fn supports_unicode() -> bool {
    if cfg!(windows) {
        std::env::var("WT_SESSION").is_ok()
            || std::env::var("TERM_PROGRAM").is_ok()
            || std::env::var("VSCODE_INJECTION").is_ok()
    } else {
        true
    }
}

fn ascii_suit(suit: Suit) -> &'static str {
    match suit {
        Suit::Hearts => "h",
        Suit::Diamonds => "d",
        Suit::Clubs => "c",
        Suit::Spades => "s",
        Suit::Joker => "",
    }
}

pub fn format_card(card: &Card) -> String {
    if supports_unicode() {
        card.to_string()
    } else if card.is_joker() {
        "JK".to_string()
    } else {
        format!("{}{}", card.rank.label(), ascii_suit(card.suit))
    }
}

/// Space-separated cards, no numbering.
pub fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(format_card)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The hand in the order the player sees it: sorted when the player's
/// auto-sort preference is on, dealt order otherwise. Positions typed by a
/// human refer to this order.
pub fn displayed_hand(player: &Player) -> Vec<Card> {
    if player.auto_sort() {
        sort_for_display(player.hand())
    } else {
        player.hand().to_vec()
    }
}

/// Numbered hand, marking selected cards with `*` and the card just drawn
/// with `+`.
pub fn format_hand(hand: &[Card], selected: &[CardId], just_drawn: Option<CardId>) -> String {
    hand.iter()
        .enumerate()
        .map(|(i, c)| {
            let mark = if selected.contains(&c.id) {
                "*"
            } else if just_drawn == Some(c.id) {
                "+"
            } else {
                ""
            };
            format!("{}:{}{}", i + 1, format_card(c), mark)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn meld_kind_label(kind: MeldKind) -> &'static str {
    match kind {
        MeldKind::Triplet => "triplet",
        MeldKind::Run => "run",
    }
}

/// Lines describing the table as seen from `viewer`: scores, deck and
/// discard, table melds and the viewer's own hand.
pub fn render_table(state: &GameState, viewer: PlayerId) -> Vec<String> {
    let mut lines = Vec::new();
    let scores = state
        .players()
        .iter()
        .map(|p| {
            let tag = if p.id() == viewer { " (you)" } else { "" };
            format!(
                "P{}{}: {} pts, {} won, {} cards",
                p.id() + 1,
                tag,
                p.score(),
                p.rounds_won(),
                p.hand().len()
            )
        })
        .collect::<Vec<_>>()
        .join(" | ");
    lines.push(scores);

    let top = state
        .discard_top()
        .map(|c| format_card(&c))
        .unwrap_or_else(|| "-".to_string());
    lines.push(format!(
        "Deck: {}  Discard: {} ({} cards)",
        state.deck_remaining(),
        top,
        state.discard_pile().len()
    ));

    if state.melds().is_empty() {
        lines.push("Melds: none".to_string());
    } else {
        lines.push("Melds:".to_string());
        for (i, meld) in state.melds().iter().enumerate() {
            lines.push(format!(
                "  {}. {} {}",
                i + 1,
                meld_kind_label(meld.kind),
                format_cards(&meld.cards)
            ));
        }
    }

    if let Some(player) = state.player(viewer) {
        let selected = if state.current_player_id() == viewer {
            state.selection()
        } else {
            &[]
        };
        lines.push(format!(
            "Hand: {}",
            format_hand(&displayed_hand(player), selected, state.just_drawn())
        ));
    }
    lines
}

/// Find a card anywhere on the table by id.
fn locate(state: &GameState, id: CardId) -> Option<Card> {
    state
        .players()
        .iter()
        .flat_map(|p| p.hand().iter())
        .chain(state.discard_pile().iter())
        .chain(state.melds().iter().flat_map(|m| m.cards.iter()))
        .copied()
        .find(|c| c.id == id)
}

/// One line describing a committed action. `reveal_draws` controls whether
/// a deck draw shows the card (only for the drawing human).
pub fn format_event(event: &TurnEvent, state: &GameState, reveal_draws: bool) -> String {
    let card = |id: CardId| {
        locate(state, id)
            .map(|c| format_card(&c))
            .unwrap_or_else(|| id.to_string())
    };
    let meld = |i: usize| {
        state
            .melds()
            .get(i)
            .map(|m| format!("{} {}", meld_kind_label(m.kind), format_cards(&m.cards)))
            .unwrap_or_default()
    };
    match event {
        TurnEvent::Drew { player, card: id } if reveal_draws => {
            format!("P{} drew {} from the deck", player + 1, card(*id))
        }
        TurnEvent::Drew { player, .. } => format!("P{} drew from the deck", player + 1),
        TurnEvent::PickedUpDiscard { player, meld_index } => format!(
            "P{} picked up the discard into meld {}: {}",
            player + 1,
            meld_index + 1,
            meld(*meld_index)
        ),
        TurnEvent::Melded { player, meld_index } => format!(
            "P{} melded {}: {}",
            player + 1,
            meld_index + 1,
            meld(*meld_index)
        ),
        TurnEvent::LaidOff { player, meld_index } => format!(
            "P{} laid off onto meld {}: {}",
            player + 1,
            meld_index + 1,
            meld(*meld_index)
        ),
        TurnEvent::Sopo { player, card: id } => {
            format!("P{} sopo'd {} onto the discard pile", player + 1, card(*id))
        }
        TurnEvent::Discarded { player, card: id } => {
            format!("P{} discarded {}", player + 1, card(*id))
        }
    }
}

pub fn format_round_summary(summary: &RoundSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Round {} won by P{}",
        summary.round,
        summary.winner + 1
    )];
    for (player, points) in &summary.penalties {
        lines.push(format!("  P{} +{} pts", player + 1, points));
    }
    let totals = summary
        .scores
        .iter()
        .zip(&summary.rounds_won)
        .enumerate()
        .map(|(i, (score, won))| format!("P{}={} pts/{} won", i + 1, score, won))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("  Totals: {}", totals));
    lines
}

/// Overall game winner: the lowest penalty score in points mode, the most
/// rounds won in rounds mode. Ties go to the lower seat.
pub fn game_winner(state: &GameState) -> PlayerId {
    let players = state.players();
    let best = match state.mode() {
        GameMode::Points => players
            .iter()
            .min_by_key(|p| (p.score(), p.id()))
            .map(|p| p.id()),
        GameMode::Rounds => players
            .iter()
            .max_by_key(|p| (p.rounds_won(), std::cmp::Reverse(p.id())))
            .map(|p| p.id()),
    };
    best.unwrap_or(0)
}
