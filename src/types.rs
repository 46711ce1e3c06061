//! Common types used throughout the bot population manager

use crate::userinfo::UserInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Index of a slot in the server's client table
pub type ClientNum = usize;

/// Team a client is currently assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Team {
    #[default]
    None,
    Spectator,
    Allies,
    Axis,
}

impl Team {
    /// Whether this team takes part in team balancing
    pub fn is_playing(self) -> bool {
        matches!(self, Team::Allies | Team::Axis)
    }

    /// The opposing playing team, if any
    pub fn opponent(self) -> Option<Team> {
        match self {
            Team::Allies => Some(Team::Axis),
            Team::Axis => Some(Team::Allies),
            Team::None | Team::Spectator => None,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::None => write!(f, "none"),
            Team::Spectator => write!(f, "spectator"),
            Team::Allies => write!(f, "allies"),
            Team::Axis => write!(f, "axis"),
        }
    }
}

/// Cosmetic model faction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Allied,
    German,
}

/// Per-team player counts as reported by the roster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamCounts {
    pub allies: usize,
    pub axis: usize,
}

impl TeamCounts {
    pub fn get(&self, team: Team) -> usize {
        match team {
            Team::Allies => self.allies,
            Team::Axis => self.axis,
            Team::None | Team::Spectator => 0,
        }
    }

    pub fn get_mut(&mut self, team: Team) -> Option<&mut usize> {
        match team {
            Team::Allies => Some(&mut self.allies),
            Team::Axis => Some(&mut self.axis),
            Team::None | Team::Spectator => None,
        }
    }
}

/// State of one client table slot as seen by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotStatus {
    /// Slot is occupied by a connected client
    pub in_use: bool,
    /// Client storage exists for this slot
    pub allocated: bool,
    /// Slot is driven by the bot AI rather than a network connection
    pub is_bot: bool,
    pub team: Team,
}

impl SlotStatus {
    /// Slot can be claimed by a new bot
    pub fn is_free(&self) -> bool {
        !self.in_use && self.allocated
    }

    /// Slot currently holds a connected bot
    pub fn is_active_bot(&self) -> bool {
        self.in_use && self.allocated && self.is_bot
    }
}

/// Client state that survives level transitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistentState {
    pub userinfo: UserInfo,
    pub netname: String,
    /// Team the client last asked to join
    pub team_preference: Team,
    /// Engine-owned data carried through untouched
    pub blob: Vec<u8>,
}

/// Snapshot of one bot taken before a level transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedBot {
    pub valid: bool,
    pub persistent: PersistentState,
    pub captured_at: DateTime<Utc>,
}

/// Deferred actions posted to a player entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Join whichever team the game mode picks
    AutoJoinTeam,
    /// Select a primary weapon by name ("auto" lets the game choose)
    PrimaryWeapon(String),
}

/// Movement command produced by the bot AI for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserCmd {
    pub server_time: i32,
    pub msec: u8,
    pub buttons: u32,
    pub angles: [i16; 3],
    pub forward_move: i8,
    pub right_move: i8,
    pub up_move: i8,
}

/// View state produced by the bot AI for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EyeInfo {
    pub offset: [i8; 3],
    pub angles: [f32; 2],
}
