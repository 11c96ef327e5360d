//! Command-line surface, parsed with clap.

use clap::{Parser, Subcommand, ValueEnum};
use loba_engine::player::{MAX_PLAYERS, MIN_PLAYERS};

#[derive(Parser, Debug)]
#[command(name = "loba", version, about = "Loba rummy at the terminal")]
pub struct LobaCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a game against AI opponents, or watch AIs play
    Play {
        #[arg(long, value_enum, default_value_t = Vs::Human)]
        vs: Vs,
        #[arg(long, value_parser = player_count)]
        players: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Game end condition: points or rounds
        #[arg(long)]
        mode: Option<String>,
        /// Strategy for AI seats: heuristic, random or remote
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Run AI-only games and optionally record every round as JSONL
    Sim {
        #[arg(long)]
        games: u32,
        #[arg(long, value_parser = player_count)]
        players: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Compare two strategies head-to-head
    Eval {
        #[arg(long = "ai-a")]
        ai_a: String,
        #[arg(long = "ai-b")]
        ai_b: String,
        #[arg(long)]
        games: u32,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Deal one round and print it
    Deal {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_parser = player_count, default_value_t = MIN_PLAYERS)]
        players: usize,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}

/// Opponent type for the `play` command.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Vs {
    /// You play seat 1 against AI seats.
    Human,
    /// Every seat is an AI; the game is narrated.
    Ai,
}

impl Vs {
    /// Returns the string representation of the opponent type.
    ///
    /// ```
    /// # use loba_cli::Vs;
    /// assert_eq!(Vs::Ai.as_str(), "ai");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Vs::Human => "human",
            Vs::Ai => "ai",
        }
    }
}

fn player_count(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a player count", s))?;
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
        Ok(n)
    } else {
        Err(format!(
            "Loba is played with {} to {} players",
            MIN_PLAYERS, MAX_PLAYERS
        ))
    }
}
