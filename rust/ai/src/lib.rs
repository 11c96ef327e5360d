//! # loba-ai: Computer Players for Loba
//!
//! Turn strategies and the orchestrator that drives an AI seat's turn.
//!
//! ## Core Components
//!
//! - [`Strategy`] - Trait deciding the next action for the current player
//! - [`heuristic`] - Local desirability-scoring strategy (the default)
//! - [`random`] - Uniformly random legal moves, seedable
//! - [`remote`] - Delegates to an external move server over HTTP
//! - [`orchestrator`] - Runs a whole AI turn with fallback and pacing
//! - [`create_strategy`] - Factory for strategies by name
//!
//! ## Quick Start
//!
//! ```rust
//! use loba_ai::orchestrator::{Silent, TurnOrchestrator, TurnOutcome};
//! use loba_ai::{create_strategy, StrategyOptions};
//! use loba_engine::game::{GameOptions, GameState};
//!
//! let mut state = GameState::new(2, GameOptions {
//!     seed: Some(42),
//!     human_players: 0,
//!     ..GameOptions::default()
//! }).unwrap();
//!
//! let orchestrator = TurnOrchestrator::new(create_strategy("heuristic", &StrategyOptions::default()));
//! let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! let outcome = rt.block_on(orchestrator.play_turn(&mut state, &mut Silent)).unwrap();
//! assert_ne!(outcome, TurnOutcome::Stalled);
//! ```

use async_trait::async_trait;
use loba_engine::game::{GameState, TurnPhase};
use loba_engine::player::TurnAction;
use thiserror::Error;

pub mod heuristic;
pub mod moves;
pub mod orchestrator;
pub mod random;
pub mod remote;

pub use heuristic::HeuristicStrategy;
pub use random::RandomStrategy;
pub use remote::RemoteStrategy;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("No legal move available")]
    NoMove,
    #[error("Not a turn phase: {0}")]
    NotPlaying(TurnPhase),
    #[error("Move server unreachable: {0}")]
    Transport(String),
    #[error("Malformed move server response: {0}")]
    Malformed(String),
    #[error("Unusable directive: {0}")]
    Unusable(String),
    #[error("Strategy internal error: {0}")]
    Internal(String),
}

/// Decides the next action for the current player of a game.
///
/// Implementations only read the state; committing the action is up to the
/// caller (usually [`orchestrator::TurnOrchestrator`]). A returned action is
/// a proposal and may still be rejected by the engine.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    async fn next_action(&self, state: &GameState) -> Result<TurnAction, StrategyError>;
}

/// Construction parameters for [`create_strategy`].
#[derive(Debug, Clone, Default)]
pub struct StrategyOptions {
    pub seed: Option<u64>,
    pub remote_url: Option<String>,
}

/// Names accepted by [`create_strategy`].
pub fn strategy_names() -> [&'static str; 3] {
    [
        HeuristicStrategy::NAME,
        RandomStrategy::NAME,
        RemoteStrategy::NAME,
    ]
}

/// Build a strategy by name. Unknown names, and a remote strategy whose
/// client cannot be built, fall back to the heuristic.
///
/// ```rust
/// use loba_ai::{create_strategy, StrategyOptions};
///
/// let ai = create_strategy("random", &StrategyOptions { seed: Some(1), ..Default::default() });
/// assert_eq!(ai.name(), "random");
/// assert_eq!(create_strategy("nope", &StrategyOptions::default()).name(), "heuristic");
/// ```
pub fn create_strategy(name: &str, options: &StrategyOptions) -> Box<dyn Strategy> {
    match name.trim().to_ascii_lowercase().as_str() {
        HeuristicStrategy::NAME => Box::new(HeuristicStrategy::new()),
        RandomStrategy::NAME => Box::new(RandomStrategy::new(options.seed)),
        RemoteStrategy::NAME => {
            let url = options
                .remote_url
                .as_deref()
                .unwrap_or(remote::DEFAULT_REMOTE_URL);
            match RemoteStrategy::new(url) {
                Ok(s) => Box::new(s),
                Err(e) => {
                    tracing::warn!(reason = %e, "remote strategy unavailable, using heuristic");
                    Box::new(HeuristicStrategy::new())
                }
            }
        }
        other => {
            tracing::warn!(strategy = other, "unknown strategy, using heuristic");
            Box::new(HeuristicStrategy::new())
        }
    }
}
