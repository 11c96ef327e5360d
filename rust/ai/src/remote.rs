//! Remote strategy: asks an out-of-process move server what to do.
//!
//! The server receives `{hand, discard_top, melds, turn_phase}` as JSON and
//! answers with a directive, either the compact `{"action": [type, index]}`
//! form (0 = draw, 1 = meld, 2 = discard) or
//! `{"actionType": "draw" | "meld" | "discard", "cardIndex": n}`.
//!
//! Transport and parse failures are never surfaced: they turn into the
//! directive "discard the first hand card". A directive that makes no sense
//! in the current phase is reported as [`StrategyError::Unusable`] so the
//! orchestrator can fall back to the local heuristic.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use loba_engine::cards::Card;
use loba_engine::game::{GameState, TurnPhase};
use loba_engine::melds::Meld;
use loba_engine::player::TurnAction;

use crate::moves::{discard_pickups, hand_melds};
use crate::{Strategy, StrategyError};

pub const DEFAULT_REMOTE_URL: &str = "http://localhost:5001/get-move";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// What the move server asked for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    Draw,
    Meld,
    Discard,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub card_index: usize,
}

impl Directive {
    /// Used whenever the server cannot be reached or understood.
    pub const FALLBACK: Directive = Directive {
        kind: DirectiveKind::Discard,
        card_index: 0,
    };
}

#[derive(Serialize)]
struct MoveRequest<'a> {
    hand: &'a [Card],
    discard_top: Option<Card>,
    melds: &'a [Meld],
    turn_phase: TurnPhase,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MoveResponse {
    Compact {
        action: (u8, usize),
    },
    Named {
        #[serde(rename = "actionType")]
        action_type: DirectiveKind,
        #[serde(rename = "cardIndex", default)]
        card_index: usize,
    },
}

/// Parse a move-server response body.
pub fn parse_directive(body: &str) -> Result<Directive, StrategyError> {
    let resp: MoveResponse =
        serde_json::from_str(body).map_err(|e| StrategyError::Malformed(e.to_string()))?;
    match resp {
        MoveResponse::Compact {
            action: (code, card_index),
        } => {
            let kind = match code {
                0 => DirectiveKind::Draw,
                1 => DirectiveKind::Meld,
                2 => DirectiveKind::Discard,
                other => {
                    return Err(StrategyError::Malformed(format!(
                        "unknown action type {other}"
                    )));
                }
            };
            Ok(Directive { kind, card_index })
        }
        MoveResponse::Named {
            action_type,
            card_index,
        } => Ok(Directive {
            kind: action_type,
            card_index,
        }),
    }
}

/// Turn a directive into a concrete action for the current state.
///
/// A discard index past the end of the hand falls back to the first card.
pub fn resolve(directive: Directive, state: &GameState) -> Result<TurnAction, StrategyError> {
    let hand = state.current_player().hand();
    match (state.phase(), directive.kind) {
        (TurnPhase::Draw, DirectiveKind::Draw) => Ok(TurnAction::DrawFromDeck),
        (TurnPhase::Draw, DirectiveKind::Meld) => discard_pickups(state)
            .into_iter()
            .next()
            .map(|cards| TurnAction::DrawFromDiscard { cards })
            .ok_or_else(|| StrategyError::Unusable("no meld with the discard top".into())),
        (TurnPhase::Play, DirectiveKind::Meld) => hand_melds(hand)
            .into_iter()
            .next()
            .map(|cards| TurnAction::Meld { cards })
            .ok_or_else(|| StrategyError::Unusable("no meld in hand".into())),
        (TurnPhase::Play, DirectiveKind::Discard) => hand
            .get(directive.card_index)
            .or_else(|| hand.first())
            .map(|c| TurnAction::Discard { card: c.id })
            .ok_or(StrategyError::NoMove),
        (TurnPhase::Draw | TurnPhase::Play, kind) => Err(StrategyError::Unusable(format!(
            "{kind:?} during the {} phase",
            state.phase()
        ))),
        (phase, _) => Err(StrategyError::NotPlaying(phase)),
    }
}

pub struct RemoteStrategy {
    client: reqwest::Client,
    url: String,
}

impl RemoteStrategy {
    pub const NAME: &'static str = "remote";

    pub fn new(url: impl Into<String>) -> Result<Self, StrategyError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, StrategyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StrategyError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, state: &GameState) -> Result<Directive, StrategyError> {
        let body = MoveRequest {
            hand: state.current_player().hand(),
            discard_top: state.discard_top(),
            melds: state.melds(),
            turn_phase: state.phase(),
        };
        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StrategyError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StrategyError::Transport(format!("status {status}")));
        }
        let text = resp
            .text()
            .await
            .map_err(|e| StrategyError::Transport(e.to_string()))?;
        parse_directive(&text)
    }

    /// Ask the server, mapping any failure to [`Directive::FALLBACK`].
    pub async fn fetch_directive(&self, state: &GameState) -> Directive {
        match self.request(state).await {
            Ok(d) => {
                tracing::debug!(url = %self.url, directive = ?d, "remote directive");
                d
            }
            Err(e) => {
                tracing::warn!(url = %self.url, reason = %e, "move server unavailable, discarding first card");
                Directive::FALLBACK
            }
        }
    }
}

#[async_trait]
impl Strategy for RemoteStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn next_action(&self, state: &GameState) -> Result<TurnAction, StrategyError> {
        if !matches!(state.phase(), TurnPhase::Draw | TurnPhase::Play) {
            return Err(StrategyError::NotPlaying(state.phase()));
        }
        let directive = self.fetch_directive(state).await;
        resolve(directive, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loba_engine::cards::CardFace;
    use loba_engine::game::{GameOptions, TableLayout};

    fn state(hand: &[&str], discard: &[&str]) -> GameState {
        let f = |s: &&str| s.parse::<CardFace>().unwrap();
        let layout = TableLayout {
            hands: vec![hand.iter().map(f).collect(), vec![f(&"KC")]],
            discard: discard.iter().map(f).collect(),
            melds: Vec::new(),
            deck_top: vec![f(&"2D")],
        };
        GameState::from_layout(layout, GameOptions::default()).unwrap()
    }

    #[test]
    fn parses_compact_and_named_forms() {
        assert_eq!(
            parse_directive(r#"{"action":[2,3]}"#).unwrap(),
            Directive {
                kind: DirectiveKind::Discard,
                card_index: 3
            }
        );
        assert_eq!(
            parse_directive(r#"{"actionType":"meld"}"#).unwrap().kind,
            DirectiveKind::Meld
        );
        assert_eq!(
            parse_directive(r#"{"actionType":"discard","cardIndex":1}"#)
                .unwrap()
                .card_index,
            1
        );
    }

    #[test]
    fn rejects_malformed_bodies() {
        for body in ["", "{}", r#"{"action":[7,0]}"#, r#"{"error":"Model not loaded"}"#] {
            assert!(matches!(
                parse_directive(body),
                Err(StrategyError::Malformed(_))
            ));
        }
    }

    #[test]
    fn discard_index_out_of_range_falls_back_to_first_card() {
        let mut gs = state(&["5H", "9C"], &["KD"]);
        gs.draw_from_deck().unwrap();
        let first = gs.current_player().hand()[0].id;
        let third = gs.current_player().hand()[2].id;
        let d = |i| Directive {
            kind: DirectiveKind::Discard,
            card_index: i,
        };
        assert_eq!(
            resolve(d(2), &gs).unwrap(),
            TurnAction::Discard { card: third }
        );
        assert_eq!(
            resolve(d(99), &gs).unwrap(),
            TurnAction::Discard { card: first }
        );
    }

    #[test]
    fn phase_mismatch_is_unusable() {
        let gs = state(&["5H", "9C"], &["KD"]);
        assert!(matches!(
            resolve(Directive::FALLBACK, &gs),
            Err(StrategyError::Unusable(_))
        ));
        assert_eq!(
            resolve(
                Directive {
                    kind: DirectiveKind::Draw,
                    card_index: 0
                },
                &gs
            )
            .unwrap(),
            TurnAction::DrawFromDeck
        );
    }

    #[test]
    fn request_uses_snake_case_wire_names() {
        let gs = state(&["5H"], &["KD"]);
        let body = MoveRequest {
            hand: gs.current_player().hand(),
            discard_top: gs.discard_top(),
            melds: gs.melds(),
            turn_phase: gs.phase(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["turn_phase"], "draw");
        assert_eq!(json["hand"][0]["rank"], "5");
        assert_eq!(json["hand"][0]["suit"], "hearts");
        assert_eq!(json["discard_top"]["rank"], "K");
    }
}
