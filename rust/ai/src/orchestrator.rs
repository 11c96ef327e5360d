//! Drives a computer-controlled player's turn to completion.
//!
//! The orchestrator owns `&mut GameState` for the whole turn, asks its
//! strategy for one action at a time, commits it, reports it to an observer
//! and then yields for the configured pace. Strategy failures and rejected
//! actions fall back to the local heuristic, and as a last resort to
//! discarding the first hand card, so a turn never stalls on a bad move.

use std::time::Duration;

use loba_engine::engine::{ActionOutcome, TurnEvent};
use loba_engine::errors::GameError;
use loba_engine::game::{GameState, TurnPhase};
use loba_engine::player::{PlayerId, TurnAction};
use thiserror::Error;

use crate::heuristic::HeuristicStrategy;
use crate::Strategy;

/// Upper bound on committed actions in one turn. Every play-phase action
/// shrinks the hand, so a real turn stays far below this.
pub const DEFAULT_MAX_STEPS: usize = 64;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TurnOutcome {
    /// The player discarded and the turn passed on
    Completed,
    /// The player emptied their hand
    RoundOver,
    /// The round ended and a game threshold was reached
    GameOver,
    /// Nothing could be drawn (empty deck, no usable discard)
    Stalled,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("Seat {0} is human-controlled")]
    HumanSeat(PlayerId),
    #[error("No turn in progress (phase {0})")]
    NotPlaying(TurnPhase),
    #[error("Turn could not be completed: {0}")]
    Engine(#[from] GameError),
}

/// Receives every committed action, for rendering or logging.
pub trait TurnObserver: Send {
    fn on_action(&mut self, state: &GameState, outcome: &ActionOutcome);
}

impl<F> TurnObserver for F
where
    F: FnMut(&GameState, &ActionOutcome) + Send,
{
    fn on_action(&mut self, state: &GameState, outcome: &ActionOutcome) {
        self(state, outcome)
    }
}

/// Observer that ignores everything.
pub struct Silent;

impl TurnObserver for Silent {
    fn on_action(&mut self, _state: &GameState, _outcome: &ActionOutcome) {}
}

pub struct TurnOrchestrator {
    strategy: Box<dyn Strategy>,
    fallback: HeuristicStrategy,
    pace: Duration,
    max_steps: usize,
}

impl TurnOrchestrator {
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self {
            strategy,
            fallback: HeuristicStrategy::new(),
            pace: Duration::ZERO,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Delay between committed actions.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Play the current player's turn until they discard or the round ends.
    ///
    /// # Errors
    ///
    /// - [`OrchestratorError::HumanSeat`] when the current seat is not AI
    /// - [`OrchestratorError::NotPlaying`] outside the draw/play phases
    /// - [`OrchestratorError::Engine`] only if even the last-resort discard is
    ///   rejected, which means the state itself is broken
    pub async fn play_turn(
        &self,
        state: &mut GameState,
        observer: &mut dyn TurnObserver,
    ) -> Result<TurnOutcome, OrchestratorError> {
        let player = state.current_player_id();
        if !state.current_player().is_ai() {
            return Err(OrchestratorError::HumanSeat(player));
        }
        if !matches!(state.phase(), TurnPhase::Draw | TurnPhase::Play) {
            return Err(OrchestratorError::NotPlaying(state.phase()));
        }
        tracing::debug!(player, strategy = self.strategy.name(), "turn started");

        for step in 0..self.max_steps {
            let outcome = match self.step(state).await {
                Some(outcome) => outcome,
                None if state.phase() == TurnPhase::Draw => {
                    tracing::warn!(player, "no draw possible, turn stalled");
                    return Ok(TurnOutcome::Stalled);
                }
                None => self.last_resort(state)?,
            };
            observer.on_action(state, &outcome);
            if let Some(done) = Self::finished(&outcome) {
                tracing::debug!(player, steps = step + 1, outcome = ?done, "turn finished");
                return Ok(done);
            }
            if !self.pace.is_zero() {
                tokio::time::sleep(self.pace).await;
            }
        }

        tracing::warn!(player, max_steps = self.max_steps, "step limit reached, forcing discard");
        if state.phase() == TurnPhase::Draw {
            return Ok(TurnOutcome::Stalled);
        }
        let outcome = self.last_resort(state)?;
        observer.on_action(state, &outcome);
        Ok(Self::finished(&outcome).unwrap_or(TurnOutcome::Completed))
    }

    /// One committed action: the strategy's choice, else the heuristic's.
    async fn step(&self, state: &mut GameState) -> Option<ActionOutcome> {
        match self.strategy.next_action(state).await {
            Ok(action) => match state.apply_action(&action) {
                Ok(outcome) => return Some(outcome),
                Err(e) => tracing::warn!(
                    strategy = self.strategy.name(),
                    ?action,
                    reason = %e,
                    "strategy move rejected, using heuristic"
                ),
            },
            Err(e) => tracing::warn!(
                strategy = self.strategy.name(),
                reason = %e,
                "strategy gave no usable move, using heuristic"
            ),
        }

        let action = self.fallback.next_action(state).await.ok()?;
        match state.apply_action(&action) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::debug!(?action, reason = %e, "heuristic move rejected");
                // a deck draw is the only other draw-phase option
                if state.phase() == TurnPhase::Draw && action != TurnAction::DrawFromDeck {
                    state.apply_action(&TurnAction::DrawFromDeck).ok()
                } else {
                    None
                }
            }
        }
    }

    fn last_resort(&self, state: &mut GameState) -> Result<ActionOutcome, OrchestratorError> {
        let card = state
            .current_player()
            .hand()
            .first()
            .map(|c| c.id)
            .ok_or(GameError::SelectionSize {
                expected: "exactly 1",
                actual: 0,
            })?;
        Ok(state.apply_action(&TurnAction::Discard { card })?)
    }

    fn finished(outcome: &ActionOutcome) -> Option<TurnOutcome> {
        match (&outcome.round_end, &outcome.event) {
            (Some(summary), _) if summary.game_over => Some(TurnOutcome::GameOver),
            (Some(_), _) => Some(TurnOutcome::RoundOver),
            (None, TurnEvent::Discarded { .. }) => Some(TurnOutcome::Completed),
            (None, _) => None,
        }
    }
}
