//! Legal-move enumeration shared by the strategies.
//!
//! Everything here is read-only over the state; candidates are listed in a
//! stable order (discovery order for melds, table index then hand order for
//! lay-offs) so strategies that pick "the first" are deterministic.

use loba_engine::cards::{Card, CardId};
use loba_engine::game::GameState;
use loba_engine::melds::find_all_melds;
use loba_engine::rules::validate_lay_off;

/// Hand subsets that, together with the discard top, form a meld.
pub fn discard_pickups(state: &GameState) -> Vec<Vec<CardId>> {
    let Some(top) = state.discard_top() else {
        return Vec::new();
    };
    let mut pool: Vec<Card> = state.current_player().hand().to_vec();
    pool.push(top);
    find_all_melds(&pool)
        .iter()
        .filter(|meld| meld.iter().any(|c| c.id == top.id))
        .map(|meld| {
            meld.iter()
                .filter(|c| c.id != top.id)
                .map(|c| c.id)
                .collect()
        })
        .collect()
}

/// Melds that can be laid down straight from the hand.
pub fn hand_melds(hand: &[Card]) -> Vec<Vec<CardId>> {
    find_all_melds(hand)
        .iter()
        .map(|meld| meld.iter().map(|c| c.id).collect())
        .collect()
}

/// Single-card lay-offs onto the table, as `(meld_index, card)`.
pub fn lay_offs(state: &GameState) -> Vec<(usize, CardId)> {
    let hand = state.current_player().hand();
    let mut out = Vec::new();
    for (index, meld) in state.melds().iter().enumerate() {
        for card in hand {
            if validate_lay_off(meld, std::slice::from_ref(card)).is_ok() {
                out.push((index, card.id));
            }
        }
    }
    out
}
