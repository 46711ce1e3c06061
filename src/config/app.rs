//! Main application configuration
//!
//! This module defines the top-level configuration for the bot population
//! service, including environment variable loading, TOML files and
//! validation.

use crate::config::bots::{BotSettings, IdentityDefaults, ModelSettings, ServerSettings};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub server: ServerSettings,
    pub bots: BotSettings,
    pub models: ModelSettings,
    pub identity: IdentityDefaults,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Root directory model listings are resolved against
    pub game_root: String,
    /// Frames between population checks
    pub population_check_frames: u64,
    /// Frames between simulated level changes; 0 disables them
    pub level_change_frames: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "bot-population".to_string(),
            log_level: "info".to_string(),
            game_root: ".".to_string(),
            population_check_frames: 20,
            level_change_frames: 0,
        }
    }
}

fn env_parse<T: FromStr>(name: &str, target: &mut T) -> Result<()> {
    if let Ok(raw) = env::var(name) {
        *target = raw
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", name, raw))?;
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(root) = env::var("GAME_ROOT") {
            config.service.game_root = root;
        }
        env_parse(
            "POPULATION_CHECK_FRAMES",
            &mut config.service.population_check_frames,
        )?;
        env_parse("LEVEL_CHANGE_FRAMES", &mut config.service.level_change_frames)?;

        // Server settings
        env_parse("MAXCLIENTS", &mut config.server.human_slots)?;
        env_parse("SV_FPS_FRAME_MS", &mut config.server.frame_time_ms)?;

        // Bot settings
        env_parse("SV_MAXBOTS", &mut config.bots.max_bots)?;
        env_parse("SV_MINPLAYERS", &mut config.bots.min_players)?;
        env_parse("SV_NUMBOTS", &mut config.bots.num_bots)?;
        if let Ok(seed) = env::var("BOT_RNG_SEED") {
            config.bots.rng_seed = Some(
                seed.parse()
                    .map_err(|_| anyhow!("Invalid BOT_RNG_SEED value: {}", seed))?,
            );
        }

        // Model listing
        if let Ok(directory) = env::var("BOT_MODEL_DIRECTORY") {
            config.models.directory = directory;
        }
        if let Ok(extension) = env::var("BOT_MODEL_EXTENSION") {
            config.models.extension = extension;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing sections use defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(raw)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Get the server frame time as Duration
    pub fn frame_time(&self) -> Duration {
        Duration::from_millis(self.server.frame_time_ms)
    }

    /// Total client table size
    pub fn total_slots(&self) -> usize {
        self.server.total_slots(&self.bots)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.population_check_frames == 0 {
        return Err(anyhow!("Population check interval must be greater than 0"));
    }

    // Validate server settings
    if config.server.frame_time_ms == 0 {
        return Err(anyhow!("Frame time must be greater than 0"));
    }
    if config.server.human_slots == 0 {
        return Err(anyhow!("At least one human slot is required"));
    }

    // Validate bot settings
    if config.bots.num_bots > config.bots.max_bots {
        return Err(anyhow!(
            "sv_numbots ({}) cannot exceed sv_maxbots ({})",
            config.bots.num_bots,
            config.bots.max_bots
        ));
    }

    // Validate model listing
    if config.models.directory.is_empty() {
        return Err(anyhow!("Model directory cannot be empty"));
    }
    if !config.models.extension.starts_with('.') {
        return Err(anyhow!(
            "Model extension must start with '.': {}",
            config.models.extension
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.total_slots(), 22);
        assert_eq!(config.frame_time(), Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.bots.num_bots = 5;
        config.bots.max_bots = 2;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.models.extension = "tik".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.server.frame_time_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [bots]
            max_bots = 8
            min_players = 4
            num_bots = 1

            [server]
            human_slots = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.bots.max_bots, 8);
        assert_eq!(config.bots.min_players, 4);
        assert_eq!(config.server.human_slots, 12);
        assert_eq!(config.server.frame_time_ms, 50);
        assert_eq!(config.identity.primary_weapon, "smg");
        assert_eq!(config.models.directory, "models/player");
    }

    #[test]
    fn test_toml_validation_applies() {
        let result = AppConfig::from_toml_str(
            r#"
            [bots]
            max_bots = 1
            num_bots = 3
            "#,
        );
        assert!(result.is_err());
    }
}
