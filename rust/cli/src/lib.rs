//! # Loba CLI Library
//!
//! Terminal front end for the Loba rules engine: play against the AI,
//! simulate and compare strategies, inspect deals and configuration.
//!
//! ## Main Entry Point
//!
//! [`run`] parses the arguments and dispatches to a subcommand; it never
//! touches the process streams itself, so tests can drive it with in-memory
//! writers. [`run_with_input`] also takes the stdin used by `play`.
//!
//! ```
//! use std::io::Cursor;
//!
//! let mut out = Vec::new();
//! let mut err = Vec::new();
//! let code = loba_cli::run_with_input(
//!     ["loba", "play", "--seed", "7"],
//!     &mut Cursor::new("q\n"),
//!     &mut out,
//!     &mut err,
//! );
//! assert_eq!(code, 0);
//! assert!(String::from_utf8(out).unwrap().contains("Session ended"));
//! ```
//!
//! ## Available Subcommands
//!
//! - `play`: Play a game against AI seats, or watch AIs play (`--vs ai`)
//! - `sim`: Run AI-only games and record round histories
//! - `eval`: Compare two strategies head-to-head
//! - `deal`: Deal one round for inspection
//! - `cfg`: Display the resolved configuration
//!
//! ## Logging
//!
//! The binary installs a `tracing` subscriber filtered by `LOBA_LOG`
//! (default `warn`); see [`logging`].

use clap::Parser;
use std::io::{BufRead, Write};

mod macros;

pub mod cli;
pub mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod logging;
pub mod session;
pub mod ui;
pub mod validation;

use cli::{Commands, LobaCli};
use commands::{
    handle_cfg_command, handle_deal_command, handle_eval_command, handle_play_command,
    handle_sim_command, PlayArgs,
};

pub use cli::Vs;
pub use error::CliError;

const COMMANDS: &[&str] = &["play", "sim", "eval", "deal", "cfg"];

/// Main entry point for the CLI application, reading `play` input from the
/// process stdin.
///
/// Returns the exit code: `0` for success, `2` for errors, `130` when the
/// input closed in the middle of a game.
///
/// ```
/// use std::io;
/// let args = vec!["loba", "deal", "--seed", "42"];
/// let code = loba_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    // Use stdin for real input (supports both TTY and piped stdin)
    let stdin = std::io::stdin();
    let mut stdin_lock = stdin.lock();
    run_with_input(args, &mut stdin_lock, out, err)
}

/// Like [`run`], with an explicit input stream for the `play` command.
pub fn run_with_input<I, S>(
    args: I,
    stdin: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match LobaCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version should print to stdout and exit 0
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                if write!(out, "{}", e).is_err() {
                    return exit_code::ERROR;
                }
                return exit_code::SUCCESS;
            }
            crate::write_or_exit!(err, "{}", e);
            crate::write_or_exit!(err, "Loba CLI");
            crate::write_or_exit!(err, "Usage: loba <command> [options]\n");
            crate::write_or_exit!(err, "Commands:");
            for c in COMMANDS {
                crate::write_or_exit!(err, "  {}", c);
            }
            crate::write_or_exit!(err, "\nFor full help, run: loba --help");
            return exit_code::ERROR;
        }
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Play {
            vs,
            players,
            seed,
            mode,
            strategy,
        } => handle_play_command(
            PlayArgs {
                vs,
                players,
                seed,
                mode,
                strategy,
            },
            out,
            err,
            stdin,
        ),
        Commands::Sim {
            games,
            players,
            seed,
            output,
        } => handle_sim_command(games, players, seed, output, out, err),
        Commands::Eval {
            ai_a,
            ai_b,
            games,
            seed,
        } => handle_eval_command(&ai_a, &ai_b, games, seed, out, err),
        Commands::Deal { seed, players } => handle_deal_command(seed, players, out),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(msg)) => {
            crate::write_or_exit!(err, "Interrupted: {}", msg);
            exit_code::INTERRUPTED
        }
        Err(e) => {
            crate::write_or_exit!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}
