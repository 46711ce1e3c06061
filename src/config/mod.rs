//! Configuration management for the bot population service
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values.

pub mod app;
pub mod bots;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use bots::{BotSettings, IdentityDefaults, ModelSettings, ServerSettings};
