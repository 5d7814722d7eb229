use std::{
    ops::Deref,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::config::BotConfig;
use crate::editor::{DraftStore, MessageComposer};
use crate::welcome::{WelcomePanel, WelcomeRepository, WelcomeSettings};
use async_trait::async_trait;
use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};
use serenity::prelude::TypeMapKey;
use tracing::{info, warn};

/// File holding every guild configuration, inside the data dir
pub const GUILD_CONFIG_FILE: &str = "guild_configs.yaml";

/// Guild configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildConfig {
    // The ID of the guild
    pub guild_id: u64,
    // Unlocks premium commands
    pub premium: bool,
    pub welcome: WelcomeSettings,
}

impl GuildConfig {
    #[must_use]
    pub fn new(guild_id: u64) -> Self {
        Self {
            guild_id,
            ..Default::default()
        }
    }
}

/// Centralized data structure for the bot
#[derive(Clone)]
pub struct Data(pub Arc<DataInner>);

// Implement TypeMapKey for Data to allow storing it in Serenity's data map
impl TypeMapKey for Data {
    type Value = Data;
}

impl Default for Data {
    fn default() -> Self {
        Self::new(BotConfig::default())
    }
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("config", &self.config)
            .field("guild_configs", &self.guild_configs)
            .field("maintenance", &self.maintenance())
            .field("message_drafts", &self.composer.drafts().len())
            .field("welcome_drafts", &self.welcome.drafts().len())
            .finish()
    }
}

impl Deref for Data {
    type Target = DataInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Data {
    /// Create a new Data instance
    #[must_use]
    pub fn new(config: BotConfig) -> Self {
        Self(DataInner::new(config).into())
    }

    /// Load guild configurations from the data dir
    pub async fn load(config: BotConfig) -> Self {
        Self(Arc::new(DataInner::load(config).await))
    }

    /// Save data to YAML file
    /// # Errors
    /// This function will return an error if:
    /// - The data directory cannot be created
    /// - The guild configurations cannot be serialized to YAML
    /// - The YAML data cannot be written to the file
    pub async fn save(&self) -> Result<(), crate::Error> {
        self.0.save().await
    }

    /// Get the guild configuration for a specific guild
    #[must_use]
    pub fn get_guild_config(&self, guild_id: serenity::GuildId) -> Option<GuildConfig> {
        self.0
            .guild_configs
            .get(&guild_id)
            .map(|entry| entry.value().clone())
    }

    /// Change a guild's configuration and persist it
    ///
    /// # Errors
    ///
    /// Returns an error when saving fails; the in-memory change is kept.
    pub async fn update_guild_config(
        &self,
        guild_id: serenity::GuildId,
        f: impl FnOnce(&mut GuildConfig),
    ) -> Result<GuildConfig, crate::Error> {
        let config = {
            let mut entry = self
                .0
                .guild_configs
                .entry(guild_id)
                .or_insert_with(|| GuildConfig::new(guild_id.get()));
            f(entry.value_mut());
            entry.value().clone()
        };
        self.save().await?;
        Ok(config)
    }

    #[must_use]
    pub fn is_premium(&self, guild_id: serenity::GuildId) -> bool {
        self.0
            .guild_configs
            .get(&guild_id)
            .is_some_and(|entry| entry.premium)
    }

    /// Grant or revoke premium
    ///
    /// # Errors
    ///
    /// Returns an error when saving fails.
    pub async fn set_premium(&self, guild_id: serenity::GuildId, premium: bool) -> Result<(), crate::Error> {
        self.update_guild_config(guild_id, |config| config.premium = premium)
            .await?;
        info!("Premium for guild {guild_id} set to {premium}");
        Ok(())
    }

    /// Persisted welcome settings
    #[must_use]
    pub fn welcome_settings(&self, guild_id: serenity::GuildId) -> WelcomeSettings {
        self.get_guild_config(guild_id)
            .map(|config| config.welcome)
            .unwrap_or_default()
    }

    /// Remember the webhook created for welcome delivery, in the persisted
    /// settings and in an open working copy
    ///
    /// # Errors
    ///
    /// Returns an error when saving fails.
    pub async fn set_welcome_webhook(
        &self,
        guild_id: serenity::GuildId,
        webhook_id: u64,
    ) -> Result<(), crate::Error> {
        let key = crate::editor::SessionKey::guild(guild_id.get());
        if self.welcome.drafts().contains(&key) {
            self.welcome
                .drafts()
                .update(&key, |settings| settings.webhook_id = Some(webhook_id));
        }
        self.update_guild_config(guild_id, |config| {
            config.welcome.webhook_id = Some(webhook_id);
        })
        .await?;
        Ok(())
    }

    #[must_use]
    pub fn maintenance(&self) -> bool {
        self.0.maintenance.load(Ordering::Relaxed)
    }

    pub fn set_maintenance(&self, enabled: bool) {
        self.0.maintenance.store(enabled, Ordering::Relaxed);
        info!("Maintenance mode set to {enabled}");
    }
}

#[async_trait]
impl WelcomeRepository for Data {
    async fn load(&self, guild_id: u64) -> WelcomeSettings {
        self.welcome_settings(serenity::GuildId::new(guild_id))
    }

    async fn store(&self, guild_id: u64, settings: WelcomeSettings) -> Result<(), crate::Error> {
        self.update_guild_config(serenity::GuildId::new(guild_id), |config| {
            config.welcome = settings;
        })
        .await?;
        Ok(())
    }
}

/// Main centralized data structure for the bot
pub struct DataInner {
    pub config: BotConfig,
    // Map of guild_id -> guild configuration
    pub guild_configs: DashMap<serenity::GuildId, GuildConfig>,
    // Runtime maintenance flag, seeded from the config
    maintenance: AtomicBool,
    // Per member `/message` drafts
    pub composer: MessageComposer,
    // Per guild welcome working copies
    pub welcome: WelcomePanel,
}

impl DataInner {
    // Create a new Data instance
    #[must_use]
    pub fn new(config: BotConfig) -> Self {
        let policy = config.eviction_policy();
        Self {
            maintenance: AtomicBool::new(config.maintenance),
            guild_configs: DashMap::new(),
            composer: MessageComposer::new(DraftStore::new("message", policy)),
            welcome: WelcomePanel::new(DraftStore::new("welcome", policy)),
            config,
        }
    }

    fn guild_config_path(&self) -> PathBuf {
        self.config.data_dir.join(GUILD_CONFIG_FILE)
    }

    /// Load data from YAML file
    ///
    /// This method loads guild configurations from a YAML file.
    /// If the file doesn't exist or can't be parsed, it starts empty.
    pub async fn load(config: BotConfig) -> Self {
        let data = Self::new(config);
        let path = data.guild_config_path();

        match tokio::fs::read_to_string(&path).await {
            Ok(file_content) => match serde_yaml::from_str::<Vec<GuildConfig>>(&file_content) {
                Ok(configs) => {
                    for config in configs {
                        let guild_id = serenity::GuildId::new(config.guild_id);
                        data.guild_configs.insert(guild_id, config);
                    }
                    info!("Loaded {} guild configurations", data.guild_configs.len());
                }
                Err(e) => warn!("Failed to parse {}: {e}", path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to read {}: {e}", path.display()),
        }

        data
    }

    /// Save data to YAML file
    ///
    /// This method saves all guild configurations to a YAML file.
    /// It creates the data directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The data directory cannot be created
    /// - The guild configurations cannot be serialized to YAML
    /// - The YAML data cannot be written to the file
    pub async fn save(&self) -> Result<(), crate::Error> {
        tokio::fs::create_dir_all(&self.config.data_dir).await?;

        // Collect all guild configs into a Vec for serialization
        let mut configs: Vec<GuildConfig> = self
            .guild_configs
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        configs.sort_by_key(|config| config.guild_id);

        let yaml = serde_yaml::to_string(&configs)?;
        tokio::fs::write(self.guild_config_path(), yaml).await?;

        Ok(())
    }
}
