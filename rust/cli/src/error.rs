//! Error types for the CLI application.
//!
//! Every command handler returns `Result<(), CliError>`; [`crate::run`] maps
//! the variant to a process exit code.

use std::fmt;

use loba_ai::orchestrator::OrchestratorError;
use loba_engine::errors::GameError;

use crate::config::ConfigError;

/// Custom error type for CLI operations.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (stdout/stderr writes, round history files, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// The engine refused to build or advance a game
    Engine(GameError),

    /// A computer-controlled turn could not be completed
    Turn(OrchestratorError),

    /// The session ended before the game did (closed stdin)
    Interrupted(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(e) => write!(f, "Engine error: {}", e),
            CliError::Turn(e) => write!(f, "AI turn failed: {}", e),
            CliError::Interrupted(msg) => write!(f, "Interrupted: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Engine(e) => Some(e),
            CliError::Turn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<GameError> for CliError {
    fn from(error: GameError) -> Self {
        CliError::Engine(error)
    }
}

impl From<OrchestratorError> for CliError {
    fn from(error: OrchestratorError) -> Self {
        CliError::Turn(error)
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        CliError::Config(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_keep_their_message() {
        let e = CliError::from(GameError::InvalidPlayerCount(7));
        assert_eq!(
            e.to_string(),
            "Engine error: Loba is played with 2 to 5 players, got 7"
        );
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn orchestrator_errors_convert() {
        let e: CliError = OrchestratorError::HumanSeat(0).into();
        assert!(matches!(e, CliError::Turn(OrchestratorError::HumanSeat(0))));
        assert!(e.to_string().starts_with("AI turn failed"));
    }
}
