//! Command handler modules for the Loba CLI.
//!
//! Each subcommand lives in its own module with the same shape:
//!
//! - Public handler function: `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`
//! - Output streams (`&mut dyn Write`) passed in, never taken from the process
//! - Errors propagated as [`crate::error::CliError`]

pub mod cfg;
pub mod deal;
pub mod eval;
pub mod play;
pub mod sim;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use eval::handle_eval_command;
pub use play::{handle_play_command, PlayArgs};
pub use sim::handle_sim_command;
