//! Random strategy: a uniformly random legal action, seedable for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha20Rng;

use loba_engine::game::{GameState, TurnPhase};
use loba_engine::player::TurnAction;

use crate::moves::{discard_pickups, hand_melds, lay_offs};
use crate::{Strategy, StrategyError};

/// Chooses among every legal action of the current phase with equal weight.
///
/// The RNG sits behind a `Mutex` because [`Strategy`] methods take `&self`.
pub struct RandomStrategy {
    rng: Mutex<ChaCha20Rng>,
}

impl RandomStrategy {
    pub const NAME: &'static str = "random";

    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha20Rng::seed_from_u64(s),
            None => ChaCha20Rng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn candidates(state: &GameState) -> Result<Vec<TurnAction>, StrategyError> {
        let mut out = Vec::new();
        match state.phase() {
            TurnPhase::Draw => {
                let can_reshuffle =
                    state.settings().reshuffle_discard && state.discard_pile().len() > 1;
                if state.deck_remaining() > 0 || can_reshuffle {
                    out.push(TurnAction::DrawFromDeck);
                }
                out.extend(
                    discard_pickups(state)
                        .into_iter()
                        .map(|cards| TurnAction::DrawFromDiscard { cards }),
                );
            }
            TurnPhase::Play => {
                let hand = state.current_player().hand();
                out.extend(
                    hand_melds(hand)
                        .into_iter()
                        .map(|cards| TurnAction::Meld { cards }),
                );
                out.extend(
                    lay_offs(state)
                        .into_iter()
                        .map(|(meld_index, card)| TurnAction::LayOff {
                            meld_index,
                            cards: vec![card],
                        }),
                );
                out.extend(hand.iter().map(|c| TurnAction::Discard { card: c.id }));
            }
            phase => return Err(StrategyError::NotPlaying(phase)),
        }
        Ok(out)
    }
}

#[async_trait]
impl Strategy for RandomStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn next_action(&self, state: &GameState) -> Result<TurnAction, StrategyError> {
        let candidates = Self::candidates(state)?;
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| StrategyError::Internal(format!("RNG lock poisoned: {e}")))?;
        candidates
            .choose(&mut *rng)
            .cloned()
            .ok_or(StrategyError::NoMove)
    }
}
