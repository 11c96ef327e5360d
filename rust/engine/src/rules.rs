use crate::cards::{Card, CardFace};
use crate::errors::GameError;
use crate::melds::{canonical_run_order, is_run, joker_stand_in, Meld, MeldKind};

/// What a legal lay-off does to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayOffPlan {
    /// The run's new card list, canonically ordered
    ExtendRun(Vec<Card>),
    /// Triplet "sopo": the card goes from the hand to the discard pile
    Sopo(Card),
}

/// Validates a set of hand cards as a new meld.
///
/// # Errors
///
/// - [`GameError::SelectionSize`] with fewer than three cards
/// - [`GameError::NotAMeld`] when the cards are neither a triplet nor a run
pub fn validate_meld(cards: &[Card]) -> Result<Meld, GameError> {
    if cards.len() < 3 {
        return Err(GameError::SelectionSize {
            expected: "at least 3",
            actual: cards.len(),
        });
    }
    Meld::from_cards(cards).ok_or(GameError::NotAMeld)
}

/// Validates laying `cards` off onto `meld`.
///
/// Runs accept any cards that keep the union a valid run. When the run
/// already holds a joker only a single natural card of the run's suit is
/// accepted, and never one that would take the rank the joker fills in the
/// middle of the run.
///
/// Triplets accept exactly one card of the triplet's rank whose suit is
/// already present; that card is discarded rather than added ("sopo").
///
/// # Examples
///
/// ```
/// use loba_engine::cards::{full_deck, Rank, Suit};
/// use loba_engine::melds::Meld;
/// use loba_engine::rules::{validate_lay_off, LayOffPlan};
///
/// let deck = full_deck();
/// let pick = |r, s| *deck.iter().find(|c| c.rank == r && c.suit == s).unwrap();
/// let run = Meld::from_cards(&[
///     pick(Rank::Five, Suit::Clubs),
///     pick(Rank::Six, Suit::Clubs),
///     pick(Rank::Seven, Suit::Clubs),
/// ])
/// .unwrap();
///
/// let plan = validate_lay_off(&run, &[pick(Rank::Eight, Suit::Clubs)]).unwrap();
/// assert!(matches!(plan, LayOffPlan::ExtendRun(cards) if cards.len() == 4));
/// assert!(validate_lay_off(&run, &[pick(Rank::Nine, Suit::Clubs)]).is_err());
/// ```
pub fn validate_lay_off(meld: &Meld, cards: &[Card]) -> Result<LayOffPlan, GameError> {
    if cards.is_empty() {
        return Err(GameError::SelectionSize {
            expected: "at least 1",
            actual: 0,
        });
    }
    match meld.kind {
        MeldKind::Run => validate_run_lay_off(meld, cards),
        MeldKind::Triplet => validate_sopo(meld, cards),
    }
}

fn validate_run_lay_off(meld: &Meld, cards: &[Card]) -> Result<LayOffPlan, GameError> {
    if meld.has_joker() {
        let [card] = cards else {
            return Err(GameError::SelectionSize {
                expected: "exactly 1",
                actual: cards.len(),
            });
        };
        if card.is_joker() {
            return Err(GameError::IllegalLayOff("the run already has a joker"));
        }
        if meld.suit() != Some(card.suit) {
            return Err(GameError::IllegalLayOff("card suit does not match the run"));
        }
        if let Some(rank) = joker_stand_in(&meld.cards) {
            if card.rank == rank {
                return Err(GameError::JokerDisplacement(CardFace {
                    rank,
                    suit: card.suit,
                }));
            }
        }
    }

    let mut union = meld.cards.clone();
    union.extend_from_slice(cards);
    if !is_run(&union) {
        return Err(GameError::IllegalLayOff("cards do not extend the run"));
    }
    Ok(LayOffPlan::ExtendRun(canonical_run_order(&union)))
}

fn validate_sopo(meld: &Meld, cards: &[Card]) -> Result<LayOffPlan, GameError> {
    let [card] = cards else {
        return Err(GameError::SelectionSize {
            expected: "exactly 1",
            actual: cards.len(),
        });
    };
    let suit_present = meld.cards.iter().any(|c| c.suit == card.suit);
    if meld.rank() == Some(card.rank) && !card.is_joker() && suit_present {
        Ok(LayOffPlan::Sopo(*card))
    } else {
        Err(GameError::IllegalLayOff(
            "card must match the triplet's rank and one of its suits",
        ))
    }
}
