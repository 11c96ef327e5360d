//! Configuration command handler.
//!
//! Prints the resolved configuration, one entry per key with its value and
//! the layer it came from:
//!
//! ```json
//! {
//!   "players": {
//!     "value": 2,
//!     "source": "default"
//!   },
//!   "mode": {
//!     "value": "rounds",
//!     "source": "env"
//!   },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

/// Handle the cfg command.
///
/// # Errors
///
/// Returns `CliError::Config` if configuration loading fails.
/// Returns `CliError::Io` if writing to output stream fails.
pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(e.into());
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "players": { "value": config.players, "source": sources.players },
        "mode": { "value": config.mode, "source": sources.mode },
        "max_score": { "value": config.max_score, "source": sources.max_score },
        "max_rounds": { "value": config.max_rounds, "source": sources.max_rounds },
        "seed": { "value": config.seed, "source": sources.seed },
        "strategy": { "value": config.strategy, "source": sources.strategy },
        "remote_url": { "value": config.remote_url, "source": sources.remote_url },
        "ai_delay_ms": { "value": config.ai_delay_ms, "source": sources.ai_delay_ms },
        "reshuffle_discard": {
            "value": config.reshuffle_discard,
            "source": sources.reshuffle_discard,
        },
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
