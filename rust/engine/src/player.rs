use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId};

/// Seat index into `GameState::players`; turn order follows this index.
pub type PlayerId = usize;

/// Cards dealt to each player at the start of a round.
pub const HAND_SIZE: usize = 9;

/// Supported table sizes.
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

/// One step of a turn, naming cards by identity.
///
/// This is the intent vocabulary shared by the human front end and the
/// strategies; `GameState::apply_action` turns it into a selection plus the
/// matching action-engine call.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnAction {
    /// Take the top card of the deck
    DrawFromDeck,
    /// Take the discard top, melding it immediately with these hand cards
    DrawFromDiscard { cards: Vec<CardId> },
    /// Put these hand cards on the table as a new meld
    Meld { cards: Vec<CardId> },
    /// Add these hand cards to an existing table meld
    LayOff { meld_index: usize, cards: Vec<CardId> },
    /// Discard one card and end the turn
    Discard { card: CardId },
}

impl TurnAction {
    pub fn cards(&self) -> Vec<CardId> {
        match self {
            TurnAction::DrawFromDeck => Vec::new(),
            TurnAction::DrawFromDiscard { cards }
            | TurnAction::Meld { cards }
            | TurnAction::LayOff { cards, .. } => cards.clone(),
            TurnAction::Discard { card } => vec![*card],
        }
    }
}

/// A seat at the table. Score and rounds won persist across rounds; the hand
/// is an unordered multiset rebuilt every round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    hand: Vec<Card>,
    score: u32,
    rounds_won: u32,
    is_ai: bool,
    auto_sort: bool,
}

impl Player {
    pub fn new(id: PlayerId, is_ai: bool) -> Self {
        Self {
            id,
            hand: Vec::with_capacity(HAND_SIZE + 1),
            score: 0,
            rounds_won: 0,
            is_ai,
            auto_sort: true,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }
    pub fn score(&self) -> u32 {
        self.score
    }
    pub fn rounds_won(&self) -> u32 {
        self.rounds_won
    }
    pub fn is_ai(&self) -> bool {
        self.is_ai
    }
    pub fn auto_sort(&self) -> bool {
        self.auto_sort
    }
    pub fn set_auto_sort(&mut self, on: bool) {
        self.auto_sort = on;
    }

    pub fn holds(&self, id: CardId) -> bool {
        self.hand.iter().any(|c| c.id == id)
    }

    pub fn card(&self, id: CardId) -> Option<Card> {
        self.hand.iter().copied().find(|c| c.id == id)
    }

    pub(crate) fn give_card(&mut self, c: Card) {
        self.hand.push(c);
    }

    /// Remove the cards with the given ids. Callers validate membership first.
    pub(crate) fn remove_cards(&mut self, ids: &[CardId]) {
        self.hand.retain(|c| !ids.contains(&c.id));
    }

    pub(crate) fn take_hand(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.hand)
    }

    pub(crate) fn add_penalty(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub(crate) fn record_round_win(&mut self) {
        self.rounds_won += 1;
    }
}
