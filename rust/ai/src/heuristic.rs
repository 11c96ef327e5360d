//! Heuristic strategy: the local, deterministic turn policy.
//!
//! Draw: pick up the discard top when it completes a meld with some hand
//! cards, otherwise draw from the deck.
//!
//! Play, one action per call:
//! 1. lay down the first meld discoverable in the hand;
//! 2. otherwise make the first legal single-card lay-off;
//! 3. otherwise discard the least desirable card.
//!
//! Desirability of a card `c` in hand `h`:
//! - minus its penalty points,
//! - plus 10 when `c` belongs to any meld discoverable in `h`,
//! - plus `5 - d` for every other card of the same suit at rank distance
//!   `d` in 1..=2.
//!
//! The lowest score is discarded; ties go to the card earliest in the hand.

use async_trait::async_trait;
use loba_engine::cards::{Card, CardId};
use loba_engine::game::{GameState, TurnPhase};
use loba_engine::melds::find_all_melds;
use loba_engine::player::TurnAction;
use loba_engine::scoring::card_points;

use crate::moves::{discard_pickups, hand_melds, lay_offs};
use crate::{Strategy, StrategyError};

const MELD_BONUS: i32 = 10;
const PROXIMITY_BASE: i32 = 5;
const PROXIMITY_RANGE: u8 = 2;

#[derive(Debug, Clone, Default)]
pub struct HeuristicStrategy;

impl HeuristicStrategy {
    pub const NAME: &'static str = "heuristic";

    pub fn new() -> Self {
        Self
    }

    pub fn choose_draw(state: &GameState) -> TurnAction {
        match discard_pickups(state).into_iter().next() {
            Some(cards) => TurnAction::DrawFromDiscard { cards },
            None => TurnAction::DrawFromDeck,
        }
    }

    pub fn choose_play(state: &GameState) -> Option<TurnAction> {
        let hand = state.current_player().hand();
        if let Some(cards) = hand_melds(hand).into_iter().next() {
            return Some(TurnAction::Meld { cards });
        }
        if let Some((meld_index, card)) = lay_offs(state).into_iter().next() {
            return Some(TurnAction::LayOff {
                meld_index,
                cards: vec![card],
            });
        }
        Self::choose_discard(hand).map(|card| TurnAction::Discard { card })
    }

    /// The least desirable card of `hand`.
    pub fn choose_discard(hand: &[Card]) -> Option<CardId> {
        let in_meld: Vec<CardId> = find_all_melds(hand)
            .iter()
            .flat_map(|m| m.iter().map(|c| c.id))
            .collect();
        let mut best: Option<(i32, CardId)> = None;
        for card in hand {
            let score = desirability(card, hand, in_meld.contains(&card.id));
            // strict less-than keeps the earliest card on ties
            if best.is_none_or(|(s, _)| score < s) {
                best = Some((score, card.id));
            }
        }
        best.map(|(_, id)| id)
    }
}

/// Keep-value of `card` within `hand`; see the module docs for the formula.
pub fn desirability(card: &Card, hand: &[Card], in_meld: bool) -> i32 {
    let mut score = -(card_points(card.rank) as i32);
    if in_meld {
        score += MELD_BONUS;
    }
    let Some(value) = card.rank.value() else {
        return score;
    };
    for other in hand {
        if other.id == card.id || other.suit != card.suit {
            continue;
        }
        let Some(v) = other.rank.value() else {
            continue;
        };
        let d = value.abs_diff(v);
        if (1..=PROXIMITY_RANGE).contains(&d) {
            score += PROXIMITY_BASE - i32::from(d);
        }
    }
    score
}

#[async_trait]
impl Strategy for HeuristicStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn next_action(&self, state: &GameState) -> Result<TurnAction, StrategyError> {
        match state.phase() {
            TurnPhase::Draw => Ok(Self::choose_draw(state)),
            TurnPhase::Play => Self::choose_play(state).ok_or(StrategyError::NoMove),
            phase => Err(StrategyError::NotPlaying(phase)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loba_engine::cards::CardFace;
    use loba_engine::game::{GameOptions, TableLayout};

    fn state(hand: &[&str], discard: &[&str], melds: &[&[&str]]) -> GameState {
        let f = |s: &&str| s.parse::<CardFace>().unwrap();
        let layout = TableLayout {
            hands: vec![hand.iter().map(f).collect(), vec![f(&"KC")]],
            discard: discard.iter().map(f).collect(),
            melds: melds.iter().map(|m| m.iter().map(f).collect()).collect(),
            deck_top: vec![f(&"2D")],
        };
        GameState::from_layout(layout, GameOptions::default()).unwrap()
    }

    fn face(state: &GameState, id: CardId) -> String {
        state.current_player().card(id).unwrap().to_string()
    }

    #[test]
    fn picks_up_discard_that_completes_a_meld() {
        let gs = state(&["7H", "7D", "KS"], &["7C"], &[]);
        match HeuristicStrategy::choose_draw(&gs) {
            TurnAction::DrawFromDiscard { cards } => {
                let mut faces: Vec<String> = cards.iter().map(|&id| face(&gs, id)).collect();
                faces.sort();
                assert_eq!(faces, vec!["7♥", "7♦"]);
            }
            other => panic!("expected a pickup, got {:?}", other),
        }
    }

    #[test]
    fn draws_from_deck_otherwise() {
        let gs = state(&["7H", "9D", "KS"], &["7C"], &[]);
        assert_eq!(HeuristicStrategy::choose_draw(&gs), TurnAction::DrawFromDeck);
    }

    #[test]
    fn desirability_formula() {
        let gs = state(&["5H", "6H", "7H", "KD", "3S"], &["2C"], &[]);
        let hand = gs.current_player().hand();
        // 6H: -6 + 10 (run) + (5-1) for 5H + (5-1) for 7H
        assert_eq!(desirability(&hand[1], hand, true), 12);
        // 5H: -5 + 10 + 4 (6H) + 3 (7H)
        assert_eq!(desirability(&hand[0], hand, true), 12);
        // KD: isolated
        assert_eq!(desirability(&hand[3], hand, false), -10);
        // 3S: isolated
        assert_eq!(desirability(&hand[4], hand, false), -3);
    }

    #[test]
    fn discards_the_lowest_score_first_in_hand_on_ties() {
        let gs = state(&["QD", "5H", "6H", "7H", "KS"], &["2C"], &[]);
        let hand = gs.current_player().hand();
        let pick = HeuristicStrategy::choose_discard(hand).unwrap();
        assert_eq!(face(&gs, pick), "Q♦");
    }

    #[test]
    fn jokers_score_without_proximity() {
        let gs = state(&["JK", "5H"], &["2C"], &[]);
        let hand = gs.current_player().hand();
        assert_eq!(desirability(&hand[0], hand, false), -10);
    }

    #[tokio::test]
    async fn play_prefers_meld_then_lay_off_then_discard() {
        let mut gs = state(&["5H", "6H", "7H", "4S", "KD"], &["2C"], &[&["5S", "6S", "7S"]]);
        let ai = HeuristicStrategy::new();

        gs.apply_action(&ai.next_action(&gs).await.unwrap()).unwrap();
        assert_eq!(gs.phase(), TurnPhase::Play);

        let meld = ai.next_action(&gs).await.unwrap();
        assert!(matches!(meld, TurnAction::Meld { ref cards } if cards.len() == 3));
        gs.apply_action(&meld).unwrap();

        let lay = ai.next_action(&gs).await.unwrap();
        assert!(matches!(lay, TurnAction::LayOff { meld_index: 0, .. }));
        gs.apply_action(&lay).unwrap();

        let discard = ai.next_action(&gs).await.unwrap();
        assert!(matches!(discard, TurnAction::Discard { .. }));
    }

    #[tokio::test]
    async fn refuses_outside_of_a_turn() {
        // picking up 7H melds the whole hand and ends the round
        let mut gs = state(&["5H", "6H"], &["7H"], &[]);
        let ai = HeuristicStrategy::new();
        let pickup = ai.next_action(&gs).await.unwrap();
        let out = gs.apply_action(&pickup).unwrap();
        assert!(out.round_end.is_some());
        assert_eq!(
            ai.next_action(&gs).await.unwrap_err(),
            StrategyError::NotPlaying(TurnPhase::RoundOver)
        );
    }
}
