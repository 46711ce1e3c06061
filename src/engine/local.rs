//! In-memory game server
//!
//! `LocalServer` keeps a plain client table and resolves the small set of
//! player events bots rely on. It backs the standalone binary and the test
//! suites.

use crate::config::AppConfig;
use crate::engine::GameServer;
use crate::types::{
    ClientNum, EyeInfo, PersistentState, PlayerEvent, SlotStatus, Team, TeamCounts, UserCmd,
};
use crate::userinfo::UserInfo;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// One slot of the local client table
#[derive(Debug, Clone, Default)]
pub struct LocalClient {
    pub status: SlotStatus,
    pub persistent: PersistentState,
    pub spawned: bool,
    pub primary_weapon: Option<String>,
    pub ai_updates: u64,
    pub frames_simulated: u64,
    pub last_cmd: Option<UserCmd>,
}

#[derive(Debug, Clone)]
struct PendingEvent {
    client: ClientNum,
    event: PlayerEvent,
    due_ms: u64,
}

/// Client table held entirely in memory
#[derive(Debug, Clone)]
pub struct LocalServer {
    clients: Vec<LocalClient>,
    frame_time: Duration,
    level_time_ms: u64,
    pending_events: Vec<PendingEvent>,
}

impl LocalServer {
    /// Create a table of `max_clients` allocated, empty slots
    pub fn new(max_clients: usize, frame_time: Duration) -> Self {
        let empty = LocalClient {
            status: SlotStatus {
                allocated: true,
                ..Default::default()
            },
            ..Default::default()
        };

        Self {
            clients: vec![empty; max_clients],
            frame_time,
            level_time_ms: 0,
            pending_events: Vec::new(),
        }
    }

    /// Create a table sized for the configured human and bot slots
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.total_slots(), config.frame_time())
    }

    /// Read access to a slot
    pub fn client(&self, client: ClientNum) -> &LocalClient {
        &self.clients[client]
    }

    /// Toggle whether client storage exists for a slot
    pub fn set_allocated(&mut self, client: ClientNum, allocated: bool) {
        self.clients[client].status.allocated = allocated;
    }

    /// Occupy a slot with a human client on the given team
    pub fn connect_human(&mut self, client: ClientNum, name: &str, team: Team) {
        let mut userinfo = UserInfo::new();
        if let Err(e) = userinfo.set("name", name) {
            warn!("Human on client {} connected without a name: {}", client, e);
        }

        let slot = &mut self.clients[client];
        slot.status = SlotStatus {
            in_use: true,
            allocated: true,
            is_bot: false,
            team,
        };
        slot.persistent = PersistentState {
            userinfo,
            netname: name.to_string(),
            team_preference: team,
            blob: Vec::new(),
        };
        slot.spawned = true;
    }

    /// Move a client to another team
    pub fn set_team(&mut self, client: ClientNum, team: Team) {
        let slot = &mut self.clients[client];
        slot.status.team = team;
        slot.persistent.team_preference = team;
    }

    /// Slots currently held by bots, in slot order
    pub fn bot_clients(&self) -> Vec<ClientNum> {
        self.clients
            .iter()
            .enumerate()
            .filter(|(_, c)| c.status.is_active_bot())
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of events scheduled but not yet delivered
    pub fn pending_event_count(&self) -> usize {
        self.pending_events.len()
    }

    /// Events scheduled for one client, in posting order
    pub fn pending_events_for(&self, client: ClientNum) -> Vec<PlayerEvent> {
        self.pending_events
            .iter()
            .filter(|e| e.client == client)
            .map(|e| e.event.clone())
            .collect()
    }

    /// Advance level time by one frame and deliver due events
    pub fn run_frame(&mut self) {
        self.level_time_ms += self.frame_time.as_millis() as u64;
        let now = self.level_time_ms;

        let (due, later): (Vec<_>, Vec<_>) = self
            .pending_events
            .drain(..)
            .partition(|e| e.due_ms <= now);
        self.pending_events = later;

        for pending in due {
            self.deliver(pending.client, pending.event);
        }
    }

    /// Tear down every bot the way a level change does, keeping humans
    pub fn teardown_level(&mut self) {
        for client in self.bot_clients() {
            self.clear_slot(client);
        }
        self.pending_events.clear();
        self.level_time_ms = 0;
        debug!("Level torn down, bot slots released");
    }

    fn deliver(&mut self, client: ClientNum, event: PlayerEvent) {
        if !self.clients[client].status.in_use {
            return;
        }

        match event {
            PlayerEvent::AutoJoinTeam => {
                let counts = self.team_counts();
                let team = if counts.axis < counts.allies {
                    Team::Axis
                } else {
                    Team::Allies
                };
                self.set_team(client, team);
                trace!("Client {} auto-joined {}", client, team);
            }
            PlayerEvent::PrimaryWeapon(weapon) => {
                self.clients[client].primary_weapon = Some(weapon);
            }
        }
    }

    fn clear_slot(&mut self, client: ClientNum) {
        let slot = &mut self.clients[client];
        let allocated = slot.status.allocated;
        *slot = LocalClient::default();
        slot.status.allocated = allocated;
    }
}

impl GameServer for LocalServer {
    fn max_clients(&self) -> usize {
        self.clients.len()
    }

    fn slot_status(&self, client: ClientNum) -> SlotStatus {
        self.clients
            .get(client)
            .map(|c| c.status)
            .unwrap_or_default()
    }

    fn connect(&mut self, client: ClientNum, userinfo: &UserInfo) {
        let slot = &mut self.clients[client];
        slot.status.in_use = true;
        slot.status.is_bot = true;
        slot.status.team = Team::None;
        slot.persistent = PersistentState {
            userinfo: userinfo.clone(),
            netname: userinfo.get("name").unwrap_or_default().to_string(),
            team_preference: Team::None,
            blob: Vec::new(),
        };
    }

    fn begin(&mut self, client: ClientNum) {
        let slot = &mut self.clients[client];
        slot.spawned = true;
        if slot.persistent.team_preference.is_playing() {
            slot.status.team = slot.persistent.team_preference;
        }
    }

    fn disconnect(&mut self, client: ClientNum) {
        self.pending_events.retain(|e| e.client != client);
        self.clear_slot(client);
    }

    fn persistent(&self, client: ClientNum) -> Option<PersistentState> {
        let slot = self.clients.get(client)?;
        slot.status.in_use.then(|| slot.persistent.clone())
    }

    fn restore_persistent(&mut self, client: ClientNum, state: PersistentState) {
        self.clients[client].persistent = state;
    }

    fn team_counts(&self) -> TeamCounts {
        let mut counts = TeamCounts::default();
        for slot in self.clients.iter().filter(|c| c.status.in_use) {
            if let Some(count) = counts.get_mut(slot.status.team) {
                *count += 1;
            }
        }
        counts
    }

    fn post_event(&mut self, client: ClientNum, event: PlayerEvent, delay: Duration) {
        self.pending_events.push(PendingEvent {
            client,
            event,
            due_ms: self.level_time_ms + delay.as_millis() as u64,
        });
    }

    fn frame_time(&self) -> Duration {
        self.frame_time
    }

    fn update_bot_ai(&mut self, client: ClientNum) {
        self.clients[client].ai_updates += 1;
    }

    fn bot_usercmd(&self, _client: ClientNum) -> UserCmd {
        UserCmd {
            server_time: self.level_time_ms as i32,
            msec: self.frame_time.as_millis().min(u8::MAX as u128) as u8,
            ..Default::default()
        }
    }

    fn bot_eye_info(&self, _client: ClientNum) -> EyeInfo {
        EyeInfo::default()
    }

    fn client_think(&mut self, client: ClientNum, cmd: &UserCmd, _eyes: &EyeInfo, _msec: u32) {
        let slot = &mut self.clients[client];
        slot.frames_simulated += 1;
        slot.last_cmd = Some(*cmd);
    }
}
