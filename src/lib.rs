//! Bot Population - bot slot management for multiplayer game servers
//!
//! This crate allocates client slots for AI-controlled players, gives them
//! a randomized identity, keeps them balanced across teams and carries them
//! across level transitions.

pub mod bot;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod service;
pub mod types;
pub mod userinfo;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{BotError, Result};
pub use types::*;

// Re-export key components
pub use bot::{BotBatch, ModelCatalog, PopulationManager, ReconcileOutcome};
pub use engine::{GameServer, LocalServer, ModelSource};
pub use userinfo::UserInfo;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
