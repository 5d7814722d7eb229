use crate::editor::EvictionPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default location of the bot configuration
pub const CONFIG_FILE: &str = "config/bot.yaml";

/// Errors loading the bot configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value `{value}` for {name}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Missing DISCORD_TOKEN in environment")]
    MissingToken,
}

/// Bot wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// User ids allowed to run private commands
    pub owners: Vec<u64>,
    /// Start in maintenance mode
    pub maintenance: bool,
    /// Commands answered with "currently unavailable"
    pub disabled_commands: Vec<String>,
    pub support_invite: Option<String>,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Idle minutes before a draft is evicted, 0 keeps drafts forever
    pub draft_idle_minutes: u64,
    pub draft_sweep_seconds: u64,
    /// Per-store draft cap
    pub max_drafts: Option<usize>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            owners: Vec::new(),
            maintenance: false,
            disabled_commands: Vec::new(),
            support_invite: None,
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
            draft_idle_minutes: 30,
            draft_sweep_seconds: 60,
            max_drafts: Some(10_000),
        }
    }
}

impl BotConfig {
    /// Load from `HERALD_CONFIG` (or [`CONFIG_FILE`]) and apply environment
    /// overrides. A missing file means defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file can't be read or parsed or an
    /// override is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HERALD_CONFIG").map_or_else(|_| PathBuf::from(CONFIG_FILE), PathBuf::from);
        let mut config = Self::from_path(&path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Read a YAML file; a missing file yields the defaults
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file exists but can't be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                debug!("Loaded configuration from {}", path.display());
                Self::from_yaml(&contents).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse YAML, defaulting missing fields
    ///
    /// # Errors
    ///
    /// Returns the YAML error for malformed input.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// Apply `HERALD_MAINTENANCE` and `HERALD_DRAFT_IDLE_MINUTES`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] for values that don't parse.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = lookup("HERALD_MAINTENANCE") {
            self.maintenance = crate::editor::parse_flag(&value).ok_or(ConfigError::InvalidEnv {
                name: "HERALD_MAINTENANCE",
                value,
            })?;
        }
        if let Some(value) = lookup("HERALD_DRAFT_IDLE_MINUTES") {
            self.draft_idle_minutes = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|minutes| *minutes == 0 || idle_ttl(*minutes).is_some())
                .ok_or(ConfigError::InvalidEnv {
                    name: "HERALD_DRAFT_IDLE_MINUTES",
                    value,
                })?;
        }
        Ok(())
    }

    /// Eviction policy shared by every draft store
    #[must_use]
    pub fn eviction_policy(&self) -> EvictionPolicy {
        let policy = match (self.draft_idle_minutes, idle_ttl(self.draft_idle_minutes)) {
            (0, _) => EvictionPolicy::unbounded(),
            (_, Some(ttl)) => EvictionPolicy::idle(ttl),
            (minutes, None) => {
                warn!("draft_idle_minutes {minutes} is out of range, drafts will not expire");
                EvictionPolicy::unbounded()
            }
        };
        match self.max_drafts {
            Some(max) => policy.with_max_entries(max),
            None => policy,
        }
    }

    /// How often expired drafts are swept, `None` when drafts never expire
    #[must_use]
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.draft_idle_minutes > 0 && self.draft_sweep_seconds > 0)
            .then(|| Duration::from_secs(self.draft_sweep_seconds))
    }

    #[must_use]
    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owners.contains(&user_id)
    }
}

/// Idle TTL for a minute count, `None` past what a duration can hold
fn idle_ttl(minutes: u64) -> Option<chrono::Duration> {
    i64::try_from(minutes).ok().and_then(chrono::Duration::try_minutes)
}

/// Bot token from `DISCORD_TOKEN`
///
/// # Errors
///
/// Returns [`ConfigError::MissingToken`] when unset or blank.
pub fn discord_token(lookup: impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    lookup("DISCORD_TOKEN")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(ConfigError::MissingToken)
}
