//! Bot population management
//!
//! This module keeps a server's bot population in line with its configured
//! targets:
//! 1. `models`: the player model catalog bots pick their looks from
//! 2. `allocator`: claiming slots and spawning bots
//! 3. `remover`: team-balanced disconnection
//! 4. `ledger`: carrying bots across level transitions
//! 5. `manager`: the population controller tying them together

pub mod allocator;
pub mod ledger;
pub mod manager;
pub mod models;
pub mod remover;

// Re-export commonly used types
pub use allocator::BotBatch;
pub use manager::{PopulationManager, PopulationStats, ReconcileOutcome};
pub use models::{
    classify_with_extension, is_allied_player_model, is_german_player_model, is_player_model,
    ModelCatalog,
};
