//! The action engine: every mutation a turn consists of.
//!
//! Each operation checks legality first and only then commits, so a rejected
//! call returns `Err` and leaves the [`GameState`] exactly as it was. The
//! reason is also reported on the `tracing` diagnostic channel, which makes
//! the API safe to call speculatively from a UI.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId};
use crate::errors::GameError;
use crate::game::{GameMode, GameState, TurnPhase};
use crate::logger::{ActionRecord, RoundSummary};
use crate::player::{PlayerId, TurnAction};
use crate::rules::{validate_lay_off, validate_meld, LayOffPlan};
use crate::scoring::score_of;

/// What a committed action did.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnEvent {
    Drew { player: PlayerId, card: CardId },
    PickedUpDiscard { player: PlayerId, meld_index: usize },
    Melded { player: PlayerId, meld_index: usize },
    LaidOff { player: PlayerId, meld_index: usize },
    Sopo { player: PlayerId, card: CardId },
    Discarded { player: PlayerId, card: CardId },
}

/// Result of a successful action: the event, plus the round summary when
/// the action emptied the player's hand.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ActionOutcome {
    pub event: TurnEvent,
    pub round_end: Option<RoundSummary>,
}

impl GameState {
    /// Draw the top card of the deck (or the debug-forced face) into the
    /// current player's hand and move to the `play` phase.
    ///
    /// # Errors
    ///
    /// - [`GameError::WrongPhase`] outside the `draw` phase
    /// - [`GameError::DeckEmpty`] when nothing can be drawn
    pub fn draw_from_deck(&mut self) -> Result<ActionOutcome, GameError> {
        let player = self.current_player;
        self.try_draw_from_deck()
            .inspect_err(|e| log_rejection("draw_from_deck", player, e))
    }

    /// Take the discard top together with the selected hand cards as a new
    /// table meld. Only legal when the union is a valid triplet or run.
    pub fn draw_from_discard(&mut self) -> Result<ActionOutcome, GameError> {
        let player = self.current_player;
        self.try_draw_from_discard()
            .inspect_err(|e| log_rejection("draw_from_discard", player, e))
    }

    /// Put the selected cards (three or more) on the table as a new meld.
    pub fn meld_selected_cards(&mut self) -> Result<ActionOutcome, GameError> {
        let player = self.current_player;
        self.try_meld_selected()
            .inspect_err(|e| log_rejection("meld_selected_cards", player, e))
    }

    /// Lay the selected cards off onto the table meld at `meld_index`.
    pub fn lay_off_cards(&mut self, meld_index: usize) -> Result<ActionOutcome, GameError> {
        let player = self.current_player;
        self.try_lay_off(meld_index)
            .inspect_err(|e| log_rejection("lay_off_cards", player, e))
    }

    /// Discard the single selected card and pass the turn, or end the round
    /// if the hand is now empty.
    pub fn discard_card(&mut self) -> Result<ActionOutcome, GameError> {
        let player = self.current_player;
        self.try_discard()
            .inspect_err(|e| log_rejection("discard_card", player, e))
    }

    /// Select the cards named by `action` and run the matching operation.
    /// On rejection the previous selection is restored.
    pub fn apply_action(&mut self, action: &TurnAction) -> Result<ActionOutcome, GameError> {
        let previous = self.selected.clone();
        let result = self.dispatch(action);
        if result.is_err() {
            self.selected = previous;
        }
        result
    }

    fn dispatch(&mut self, action: &TurnAction) -> Result<ActionOutcome, GameError> {
        match action {
            TurnAction::DrawFromDeck => self.draw_from_deck(),
            TurnAction::DrawFromDiscard { cards } => {
                self.set_selection(cards.clone())?;
                self.draw_from_discard()
            }
            TurnAction::Meld { cards } => {
                self.set_selection(cards.clone())?;
                self.meld_selected_cards()
            }
            TurnAction::LayOff { meld_index, cards } => {
                self.set_selection(cards.clone())?;
                self.lay_off_cards(*meld_index)
            }
            TurnAction::Discard { card } => {
                self.set_selection(vec![*card])?;
                self.discard_card()
            }
        }
    }

    fn ensure_phase(&self, expected: TurnPhase) -> Result<(), GameError> {
        match self.phase {
            p if p == expected => Ok(()),
            TurnPhase::GameOver => Err(GameError::GameOver),
            actual => Err(GameError::WrongPhase { expected, actual }),
        }
    }

    fn try_draw_from_deck(&mut self) -> Result<ActionOutcome, GameError> {
        self.ensure_phase(TurnPhase::Draw)?;
        if self.deck.is_empty() {
            if self.settings.reshuffle_discard && self.discard_pile.len() > 1 {
                self.reshuffle_discard_into_deck();
            } else {
                return Err(GameError::DeckEmpty);
            }
        }

        let forced = match self.forced_next_card {
            Some(face) => {
                let found = self.deck.take_face(face);
                if found.is_none() {
                    tracing::warn!(card = %face, "forced card not in deck, drawing from top");
                }
                found
            }
            None => None,
        };
        let card = match forced {
            Some(c) => c,
            None => self.deck.draw().ok_or(GameError::DeckEmpty)?,
        };
        self.forced_next_card = None;

        let player = self.current_player;
        self.current_player_mut().give_card(card);
        self.just_drawn = Some(card.id);
        self.record(TurnAction::DrawFromDeck);
        self.phase = TurnPhase::Play;
        tracing::debug!(player, card = %card, "drew from deck");
        Ok(ActionOutcome {
            event: TurnEvent::Drew {
                player,
                card: card.id,
            },
            round_end: None,
        })
    }

    fn reshuffle_discard_into_deck(&mut self) {
        let split = self.discard_pile.len() - 1;
        let rest: Vec<Card> = self.discard_pile.drain(..split).collect();
        tracing::info!(cards = rest.len(), "deck empty, reshuffling discard pile");
        self.deck.refill(rest);
    }

    fn try_draw_from_discard(&mut self) -> Result<ActionOutcome, GameError> {
        self.ensure_phase(TurnPhase::Draw)?;
        let top = self.discard_top().ok_or(GameError::DiscardPileEmpty)?;
        let mut candidate = self.selected_cards();
        candidate.push(top);
        let meld = validate_meld(&candidate)?;

        let player = self.current_player;
        let used = std::mem::take(&mut self.selected);
        self.discard_pile.pop();
        self.current_player_mut().remove_cards(&used);
        self.melds.push(meld);
        let meld_index = self.melds.len() - 1;
        self.just_drawn = None;
        self.record(TurnAction::DrawFromDiscard { cards: used });
        self.phase = TurnPhase::Play;
        tracing::debug!(player, card = %top, meld_index, "picked up discard into meld");

        let round_end = self.end_round_if_hand_empty();
        Ok(ActionOutcome {
            event: TurnEvent::PickedUpDiscard { player, meld_index },
            round_end,
        })
    }

    fn try_meld_selected(&mut self) -> Result<ActionOutcome, GameError> {
        self.ensure_phase(TurnPhase::Play)?;
        let meld = validate_meld(&self.selected_cards())?;

        let player = self.current_player;
        let used = std::mem::take(&mut self.selected);
        self.current_player_mut().remove_cards(&used);
        tracing::debug!(player, kind = ?meld.kind, cards = meld.cards.len(), "melded");
        self.melds.push(meld);
        let meld_index = self.melds.len() - 1;
        self.record(TurnAction::Meld { cards: used });

        let round_end = self.end_round_if_hand_empty();
        Ok(ActionOutcome {
            event: TurnEvent::Melded { player, meld_index },
            round_end,
        })
    }

    fn try_lay_off(&mut self, meld_index: usize) -> Result<ActionOutcome, GameError> {
        self.ensure_phase(TurnPhase::Play)?;
        let meld = self
            .melds
            .get(meld_index)
            .ok_or(GameError::MeldNotFound(meld_index))?;
        let plan = validate_lay_off(meld, &self.selected_cards())?;

        let player = self.current_player;
        let used = std::mem::take(&mut self.selected);
        self.current_player_mut().remove_cards(&used);
        let event = match plan {
            LayOffPlan::ExtendRun(cards) => {
                self.melds[meld_index].cards = cards;
                tracing::debug!(player, meld_index, "laid off onto run");
                TurnEvent::LaidOff { player, meld_index }
            }
            LayOffPlan::Sopo(card) => {
                self.discard_pile.push(card);
                tracing::debug!(player, meld_index, card = %card, "sopo onto triplet");
                TurnEvent::Sopo {
                    player,
                    card: card.id,
                }
            }
        };
        self.record(TurnAction::LayOff {
            meld_index,
            cards: used,
        });

        let round_end = self.end_round_if_hand_empty();
        Ok(ActionOutcome { event, round_end })
    }

    fn try_discard(&mut self) -> Result<ActionOutcome, GameError> {
        self.ensure_phase(TurnPhase::Play)?;
        let [id] = self.selected[..] else {
            return Err(GameError::SelectionSize {
                expected: "exactly 1",
                actual: self.selected.len(),
            });
        };
        let card = self
            .current_player()
            .card(id)
            .ok_or(GameError::CardNotInHand(id))?;

        let player = self.current_player;
        self.current_player_mut().remove_cards(&[id]);
        self.discard_pile.push(card);
        self.selected.clear();
        self.record(TurnAction::Discard { card: id });
        tracing::debug!(player, card = %card, "discarded");

        let round_end = self.end_round_if_hand_empty();
        if round_end.is_none() {
            self.just_drawn = None;
            self.current_player = (self.current_player + 1) % self.players.len();
            self.phase = TurnPhase::Draw;
        }
        Ok(ActionOutcome {
            event: TurnEvent::Discarded { player, card: id },
            round_end,
        })
    }

    fn record(&mut self, action: TurnAction) {
        self.history.push(ActionRecord {
            player_id: self.current_player,
            phase: self.phase,
            action,
        });
    }

    fn end_round_if_hand_empty(&mut self) -> Option<RoundSummary> {
        if self.current_player().hand().is_empty() {
            Some(self.end_round(self.current_player))
        } else {
            None
        }
    }

    /// Score the round for `winner`, then decide between `round-over` and
    /// `game-over`. Losing hands stay where they are until the next deal.
    fn end_round(&mut self, winner: PlayerId) -> RoundSummary {
        self.players[winner].record_round_win();
        let mut penalties = Vec::with_capacity(self.players.len() - 1);
        for p in self.players.iter_mut().filter(|p| p.id() != winner) {
            let points = score_of(p.hand());
            p.add_penalty(points);
            penalties.push((p.id(), points));
        }

        let game_over = match self.mode {
            GameMode::Points => self
                .players
                .iter()
                .any(|p| p.score() >= self.settings.max_score),
            GameMode::Rounds => self.players[winner].rounds_won() >= self.settings.max_rounds,
        };
        self.phase = if game_over {
            TurnPhase::GameOver
        } else {
            TurnPhase::RoundOver
        };
        self.selected.clear();

        let summary = RoundSummary {
            round: self.round,
            winner,
            penalties,
            scores: self.players.iter().map(|p| p.score()).collect(),
            rounds_won: self.players.iter().map(|p| p.rounds_won()).collect(),
            game_over,
        };
        tracing::info!(
            round = summary.round,
            winner,
            scores = ?summary.scores,
            game_over,
            "round over"
        );
        self.last_round = Some(summary.clone());
        summary
    }
}

fn log_rejection(op: &'static str, player: PlayerId, err: &GameError) {
    tracing::debug!(op, player, reason = %err, "action rejected");
}
