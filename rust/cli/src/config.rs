//! Layered configuration: built-in defaults, then a TOML file named by
//! `LOBA_CONFIG`, then `LOBA_*` environment variables. Every resolved value
//! remembers which layer it came from so `loba cfg` can show it.

use std::fs;

use loba_ai::remote::DEFAULT_REMOTE_URL;
use loba_ai::{strategy_names, RemoteStrategy};
use loba_engine::game::{GameMode, GameOptions, GameSettings};
use loba_engine::player::{MAX_PLAYERS, MIN_PLAYERS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub players: usize,
    pub mode: GameMode,
    pub max_score: u32,
    pub max_rounds: u32,
    pub seed: Option<u64>,
    pub strategy: String,
    pub remote_url: String,
    pub ai_delay_ms: u64,
    pub reshuffle_discard: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub players: ValueSource,
    pub mode: ValueSource,
    pub max_score: ValueSource,
    pub max_rounds: ValueSource,
    pub seed: ValueSource,
    pub strategy: ValueSource,
    pub remote_url: ValueSource,
    pub ai_delay_ms: ValueSource,
    pub reshuffle_discard: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            players: ValueSource::Default,
            mode: ValueSource::Default,
            max_score: ValueSource::Default,
            max_rounds: ValueSource::Default,
            seed: ValueSource::Default,
            strategy: ValueSource::Default,
            remote_url: ValueSource::Default,
            ai_delay_ms: ValueSource::Default,
            reshuffle_discard: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        let settings = GameSettings::default();
        Self {
            players: MIN_PLAYERS,
            mode: GameMode::Rounds,
            max_score: settings.max_score,
            max_rounds: settings.max_rounds,
            seed: None,
            strategy: loba_ai::HeuristicStrategy::NAME.into(),
            remote_url: DEFAULT_REMOTE_URL.into(),
            ai_delay_ms: 0,
            reshuffle_discard: settings.reshuffle_discard,
        }
    }
}

impl Config {
    /// Engine options for a game with `human_players` human seats.
    pub fn game_options(&self, seed: Option<u64>, human_players: usize) -> GameOptions {
        GameOptions {
            mode: self.mode,
            settings: GameSettings {
                max_score: self.max_score,
                max_rounds: self.max_rounds,
                reshuffle_discard: self.reshuffle_discard,
            },
            seed: seed.or(self.seed),
            human_players,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("LOBA_CONFIG")
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.players {
            cfg.players = v;
            sources.players = ValueSource::File;
        }
        if let Some(v) = f.mode {
            cfg.mode = v;
            sources.mode = ValueSource::File;
        }
        if let Some(v) = f.max_score {
            cfg.max_score = v;
            sources.max_score = ValueSource::File;
        }
        if let Some(v) = f.max_rounds {
            cfg.max_rounds = v;
            sources.max_rounds = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.strategy {
            cfg.strategy = v;
            sources.strategy = ValueSource::File;
        }
        if let Some(v) = f.remote_url {
            cfg.remote_url = v;
            sources.remote_url = ValueSource::File;
        }
        if let Some(v) = f.ai_delay_ms {
            cfg.ai_delay_ms = v;
            sources.ai_delay_ms = ValueSource::File;
        }
        if let Some(v) = f.reshuffle_discard {
            cfg.reshuffle_discard = v;
            sources.reshuffle_discard = ValueSource::File;
        }
    }

    if let Some(v) = env_value("LOBA_PLAYERS") {
        cfg.players = parse_env(&v, "players")?;
        sources.players = ValueSource::Env;
    }
    if let Some(v) = env_value("LOBA_MODE") {
        cfg.mode = v
            .parse()
            .map_err(|e: String| ConfigError::Invalid(format!("Invalid mode: {}", e)))?;
        sources.mode = ValueSource::Env;
    }
    if let Some(v) = env_value("LOBA_MAX_SCORE") {
        cfg.max_score = parse_env(&v, "max_score")?;
        sources.max_score = ValueSource::Env;
    }
    if let Some(v) = env_value("LOBA_MAX_ROUNDS") {
        cfg.max_rounds = parse_env(&v, "max_rounds")?;
        sources.max_rounds = ValueSource::Env;
    }
    if let Some(v) = env_value("LOBA_SEED") {
        cfg.seed = Some(parse_env(&v, "seed")?);
        sources.seed = ValueSource::Env;
    }
    if let Some(v) = env_value("LOBA_STRATEGY") {
        cfg.strategy = v;
        sources.strategy = ValueSource::Env;
    }
    if let Ok(v) = std::env::var("LOBA_REMOTE_URL") {
        // An empty value is kept so that validation can reject it.
        cfg.remote_url = v;
        sources.remote_url = ValueSource::Env;
    }
    if let Some(v) = env_value("LOBA_AI_DELAY_MS") {
        cfg.ai_delay_ms = parse_env(&v, "ai_delay_ms")?;
        sources.ai_delay_ms = ValueSource::Env;
    }
    if let Some(v) = env_value("LOBA_RESHUFFLE") {
        cfg.reshuffle_discard =
            parse_bool(&v).ok_or_else(|| ConfigError::Invalid("Invalid reshuffle_discard".into()))?;
        sources.reshuffle_discard = ValueSource::Env;
    }

    cfg.strategy = cfg.strategy.trim().to_ascii_lowercase();
    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    players: Option<usize>,
    #[serde(default)]
    mode: Option<GameMode>,
    #[serde(default)]
    max_score: Option<u32>,
    #[serde(default)]
    max_rounds: Option<u32>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    remote_url: Option<String>,
    #[serde(default)]
    ai_delay_ms: Option<u64>,
    #[serde(default)]
    reshuffle_discard: Option<bool>,
}

fn env_value(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn parse_env<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("Invalid {}: {}", key, value)))
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&cfg.players) {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: players must be between {} and {}",
            MIN_PLAYERS, MAX_PLAYERS
        )));
    }
    if cfg.max_score == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: max_score must be >0".into(),
        ));
    }
    if cfg.max_rounds == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: max_rounds must be >0".into(),
        ));
    }
    if !strategy_names().contains(&cfg.strategy.as_str()) {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: unknown strategy '{}' (expected one of {})",
            cfg.strategy,
            strategy_names().join(", ")
        )));
    }
    if cfg.strategy == RemoteStrategy::NAME && cfg.remote_url.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "Invalid configuration: the remote strategy needs remote_url".into(),
        ));
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(validate(&cfg).is_ok());
        assert_eq!(cfg.players, 2);
        assert_eq!(cfg.mode, GameMode::Rounds);
        assert_eq!(cfg.strategy, "heuristic");
    }

    #[test]
    fn validation_rejects_bad_values() {
        let bad = [
            Config {
                players: 6,
                ..Config::default()
            },
            Config {
                max_rounds: 0,
                ..Config::default()
            },
            Config {
                strategy: "oracle".into(),
                ..Config::default()
            },
            Config {
                strategy: "remote".into(),
                remote_url: " ".into(),
                ..Config::default()
            },
        ];
        for cfg in bad {
            assert!(validate(&cfg).is_err(), "{:?} should be rejected", cfg);
        }
    }

    #[test]
    fn game_options_prefer_explicit_seed() {
        let cfg = Config {
            seed: Some(1),
            max_score: 50,
            ..Config::default()
        };
        let opts = cfg.game_options(Some(9), 0);
        assert_eq!(opts.seed, Some(9));
        assert_eq!(opts.settings.max_score, 50);
        assert_eq!(opts.human_players, 0);
        assert_eq!(cfg.game_options(None, 1).seed, Some(1));
    }

    #[test]
    fn file_config_accepts_partial_tables() {
        let f: FileConfig = toml::from_str("mode = \"points\"\nmax_score = 60\n").unwrap();
        assert_eq!(f.mode, Some(GameMode::Points));
        assert_eq!(f.max_score, Some(60));
        assert!(f.players.is_none());
    }

    #[test]
    fn bool_parsing() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
