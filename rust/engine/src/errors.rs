use thiserror::Error;

use crate::cards::{CardFace, CardId};
use crate::game::TurnPhase;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Action not allowed in phase {actual} (expected {expected})")]
    WrongPhase {
        expected: TurnPhase,
        actual: TurnPhase,
    },
    #[error("Selection has {actual} card(s), {expected} required")]
    SelectionSize { expected: &'static str, actual: usize },
    #[error("Card {0} is not in the current player's hand")]
    CardNotInHand(CardId),
    #[error("Card {0} selected twice")]
    DuplicateSelection(CardId),
    #[error("Selected cards do not form a triplet or a run")]
    NotAMeld,
    #[error("No meld at table index {0}")]
    MeldNotFound(usize),
    #[error("Illegal lay-off: {0}")]
    IllegalLayOff(&'static str),
    #[error("Cannot displace the joker standing in for {0}")]
    JokerDisplacement(CardFace),
    #[error("The deck is empty")]
    DeckEmpty,
    #[error("The discard pile is empty")]
    DiscardPileEmpty,
    #[error("The game is over")]
    GameOver,
    #[error("Loba is played with 2 to 5 players, got {0}")]
    InvalidPlayerCount(usize),
    #[error("Unknown rank: {0}")]
    UnknownRank(String),
    #[error("Unknown suit: {0}")]
    UnknownSuit(String),
    #[error("Invalid card: rank {rank} with suit {suit}")]
    InvalidCardFace { rank: String, suit: String },
    #[error("No unused {0} left in the supply")]
    CardUnavailable(CardFace),
    #[error("Card conservation violated: {0}")]
    Conservation(String),
}

impl GameError {
    /// Recoverable rejections of an attempted move. Everything else is a
    /// structural failure (bad construction input or a broken invariant).
    pub fn is_illegal_move(&self) -> bool {
        matches!(
            self,
            GameError::WrongPhase { .. }
                | GameError::SelectionSize { .. }
                | GameError::CardNotInHand(_)
                | GameError::DuplicateSelection(_)
                | GameError::NotAMeld
                | GameError::MeldNotFound(_)
                | GameError::IllegalLayOff(_)
                | GameError::JokerDisplacement(_)
                | GameError::DeckEmpty
                | GameError::DiscardPileEmpty
                | GameError::GameOver
        )
    }
}
