//! Engine collaborator interfaces
//!
//! The population manager never owns client slots, entities or files. It
//! reaches the surrounding game server through the traits defined here:
//! 1. `GameServer`: client table, connect/begin/disconnect, roster, events
//!    and the per-client simulation step
//! 2. `ModelSource`: enumerating player model descriptor files

pub mod directory;
pub mod local;

use crate::error::Result;
use crate::types::{
    ClientNum, EyeInfo, PersistentState, PlayerEvent, SlotStatus, TeamCounts, UserCmd,
};
use crate::userinfo::UserInfo;
use std::time::Duration;

// Re-export commonly used types
pub use directory::{DirectoryModelSource, StaticModelSource};
pub use local::LocalServer;

/// Client table and entity operations provided by the game server
pub trait GameServer {
    /// Size of the client table, human and bot slots together
    fn max_clients(&self) -> usize;

    /// Current state of a slot
    fn slot_status(&self, client: ClientNum) -> SlotStatus;

    /// Connect a bot client on a free slot with the given identity
    fn connect(&mut self, client: ClientNum, userinfo: &UserInfo);

    /// Spawn the connected bot into the level
    fn begin(&mut self, client: ClientNum);

    /// Drop the client and release its entity
    fn disconnect(&mut self, client: ClientNum);

    /// Persistent data of an in-use client
    fn persistent(&self, client: ClientNum) -> Option<PersistentState>;

    /// Overwrite the persistent data of a connected client
    fn restore_persistent(&mut self, client: ClientNum, state: PersistentState);

    /// Number of players on each playing team
    fn team_counts(&self) -> TeamCounts;

    /// Schedule an event on the client's player entity after `delay`
    fn post_event(&mut self, client: ClientNum, event: PlayerEvent, delay: Duration);

    /// Length of one server frame
    fn frame_time(&self) -> Duration;

    /// Let the bot AI refresh its internal state
    fn update_bot_ai(&mut self, client: ClientNum);

    /// Movement command the bot AI wants to execute this frame
    fn bot_usercmd(&self, client: ClientNum) -> UserCmd;

    /// View state the bot AI wants to use this frame
    fn bot_eye_info(&self, client: ClientNum) -> EyeInfo;

    /// Run the generic per-client simulation step
    fn client_think(&mut self, client: ClientNum, cmd: &UserCmd, eyes: &EyeInfo, msec: u32);
}

/// Source of player model descriptor filenames
#[cfg_attr(test, mockall::automock)]
pub trait ModelSource {
    /// List files with `extension` under `directory`, each as `"/<name><extension>"`
    fn list_files(&self, directory: &str, extension: &str) -> Result<Vec<String>>;
}
