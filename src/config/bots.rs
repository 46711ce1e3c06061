//! Bot population configuration

use serde::{Deserialize, Serialize};

/// Server population limits (`sv_maxbots`, `sv_minplayers`, `sv_numbots`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Upper bound on bots, and on the size of a single add/remove request
    pub max_bots: usize,
    /// Bots fill the server up to this many players
    pub min_players: usize,
    /// Bots kept on the server on top of any fill-up
    pub num_bots: usize,
    /// Seed for model selection; entropy when unset
    pub rng_seed: Option<u64>,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            max_bots: 2,
            min_players: 0,
            num_bots: 0,
            rng_seed: None,
        }
    }
}

/// Client table layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Slots reserved for human clients; bot slots follow (`maxclients`)
    pub human_slots: usize,
    /// Length of one server frame in milliseconds
    pub frame_time_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            human_slots: 20,
            frame_time_ms: 50,
        }
    }
}

impl ServerSettings {
    /// Size of the whole client table, humans and bots together
    pub fn total_slots(&self, bots: &BotSettings) -> usize {
        self.human_slots + bots.max_bots
    }
}

/// Where player model descriptors are listed from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub directory: String,
    pub extension: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            directory: "models/player".to_string(),
            extension: ".tik".to_string(),
        }
    }
}

/// Connection parameters written into every fresh bot's userinfo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityDefaults {
    pub fov: u32,
    pub protocol: u32,
    pub ip: String,
    pub qport: u32,
    pub snaps: u32,
    pub rate: u32,
    pub primary_weapon: String,
}

impl Default for IdentityDefaults {
    fn default() -> Self {
        Self {
            fov: 80,
            protocol: 8,
            ip: "0.0.0.0".to_string(),
            qport: 0,
            snaps: 1,
            rate: 1,
            primary_weapon: "smg".to_string(),
        }
    }
}
