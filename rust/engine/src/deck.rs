use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card, CardFace};

/// The face-down draw supply. The top of the deck is the last element.
///
/// The deck owns its RNG so that a seeded game replays identically across
/// rounds: every reshuffle continues the same ChaCha stream.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        // Keep build order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            rng,
        }
    }

    /// Rebuild the full 108-card supply and shuffle it.
    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
    }

    /// Replace the contents with `cards` and shuffle them (discard reshuffle).
    pub fn refill(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        self.cards.shuffle(&mut self.rng);
    }

    /// Pop the top card.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Remove the first card (from the top) matching `face`, if any.
    pub fn take_face(&mut self, face: CardFace) -> Option<Card> {
        let idx = self.cards.iter().rposition(|c| c.face() == face)?;
        Some(self.cards.remove(idx))
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub(crate) fn push_top(&mut self, card: Card) {
        self.cards.push(card);
    }
}
