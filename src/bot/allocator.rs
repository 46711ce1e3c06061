//! Bot slot allocation
//!
//! Claims free client slots past the human boundary, gives each new bot an
//! identity and hands it to the engine's connect and spawn routines.

use crate::bot::manager::PopulationManager;
use crate::engine::GameServer;
use crate::metrics::BotOrigin;
use crate::types::{ClientNum, Faction, PlayerEvent, SavedBot};
use crate::userinfo::UserInfo;
use tracing::{debug, info, warn};

/// Result of one allocation request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotBatch {
    /// Slots given to bots, in allocation order
    pub added: Vec<ClientNum>,
    /// The request stopped early because every bot slot was taken
    pub slots_exhausted: bool,
}

impl BotBatch {
    pub fn len(&self) -> usize {
        self.added.len()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}

fn set_field(userinfo: &mut UserInfo, key: &str, value: &str) {
    if let Err(e) = userinfo.set(key, value) {
        warn!("Skipping bot userinfo field: {}", e);
    }
}

impl PopulationManager {
    /// Add up to `count` bots (clamped to the bot limit). With a saved
    /// record the bots reuse its identity and persistent state.
    pub fn add_bots<S: GameServer + ?Sized>(
        &mut self,
        server: &mut S,
        count: usize,
        saved: Option<&SavedBot>,
    ) -> BotBatch {
        self.spawn_bots(server, count, saved, None)
    }

    /// Add one fresh bot with an explicit name
    pub fn add_named_bot<S: GameServer + ?Sized>(&mut self, server: &mut S, name: &str) -> BotBatch {
        self.spawn_bots(server, 1, None, Some(name))
    }

    fn spawn_bots<S: GameServer + ?Sized>(
        &mut self,
        server: &mut S,
        count: usize,
        saved: Option<&SavedBot>,
        name: Option<&str>,
    ) -> BotBatch {
        let count = count.min(self.config.bots.max_bots);
        let mut batch = BotBatch::default();

        for _ in 0..count {
            let Some(client) = self.find_free_slot(server) else {
                warn!(
                    "No free slot for a bot ({} of {} added)",
                    batch.len(),
                    count
                );
                batch.slots_exhausted = true;
                self.stats.slot_exhaustions += 1;
                self.metrics.record_slot_exhausted();
                break;
            };

            let bot_number = client - self.bot_slot_start() + 1;
            let userinfo = match saved {
                Some(record) => record.persistent.userinfo.clone(),
                None => {
                    let default_name = format!("bot{}", bot_number);
                    self.build_userinfo(name.unwrap_or(default_name.as_str()), bot_number)
                }
            };

            // Counted before connecting so a failing connect never under-counts
            self.bot_count += 1;
            server.connect(client, &userinfo);

            if let Some(record) = saved {
                server.restore_persistent(client, record.persistent.clone());
            }

            if self.first_bot.is_none() {
                self.first_bot = Some(client);
            }

            server.begin(client);

            let origin = if saved.is_some() {
                BotOrigin::Restored
            } else {
                let delay = server.frame_time();
                server.post_event(client, PlayerEvent::AutoJoinTeam, delay);
                server.post_event(client, PlayerEvent::PrimaryWeapon("auto".to_string()), delay);
                BotOrigin::Fresh
            };

            self.stats.bots_added += 1;
            self.metrics.record_bot_added(origin);
            info!(
                "Bot '{}' connected on client {} ({:?})",
                userinfo.get("name").unwrap_or_default(),
                client,
                origin
            );
            batch.added.push(client);
        }

        self.publish_population();
        batch
    }

    /// First slot past the human boundary that has storage but no client
    fn find_free_slot<S: GameServer + ?Sized>(&self, server: &S) -> Option<ClientNum> {
        (self.bot_slot_start()..server.max_clients())
            .find(|&client| server.slot_status(client).is_free())
    }

    /// Identity for a freshly created bot
    fn build_userinfo(&mut self, name: &str, bot_number: usize) -> UserInfo {
        let mut userinfo = UserInfo::new();
        set_field(&mut userinfo, "name", name);

        if let Some(model) = self.catalog.pick_random(Faction::Allied, &mut self.rng) {
            set_field(&mut userinfo, "dm_playermodel", model);
        }
        if let Some(model) = self.catalog.pick_random(Faction::German, &mut self.rng) {
            set_field(&mut userinfo, "dm_playergermanmodel", model);
        }

        let identity = &self.config.identity;
        set_field(&mut userinfo, "fov", &identity.fov.to_string());
        set_field(&mut userinfo, "protocol", &identity.protocol.to_string());
        set_field(&mut userinfo, "ip", &identity.ip);
        set_field(&mut userinfo, "qport", &identity.qport.to_string());
        set_field(&mut userinfo, "challenge", &bot_number.to_string());
        set_field(&mut userinfo, "snaps", &identity.snaps.to_string());
        set_field(&mut userinfo, "rate", &identity.rate.to_string());
        set_field(&mut userinfo, "dmprimary", &identity.primary_weapon);

        debug!("Built userinfo for bot {}: {}", bot_number, userinfo);
        userinfo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::models::ModelCatalog;
    use crate::config::AppConfig;
    use crate::engine::LocalServer;
    use crate::types::PersistentState;
    use crate::utils::current_timestamp;
    use std::collections::HashSet;

    fn setup(max_bots: usize) -> (PopulationManager, LocalServer) {
        let mut config = AppConfig::default();
        config.server.human_slots = 2;
        config.bots.max_bots = max_bots;
        config.bots.rng_seed = Some(3);
        let server = LocalServer::from_config(&config);
        (PopulationManager::new(config).unwrap(), server)
    }

    #[test]
    fn test_fresh_bot_identity() {
        let (mut manager, mut server) = setup(2);
        manager.catalog = ModelCatalog::from_listing(&[
            "/allied_airborne.tik".to_string(),
            "/german_officer.tik".to_string(),
        ]);

        let batch = manager.add_bots(&mut server, 1, None);
        assert_eq!(batch.added, vec![2]);

        let info = server.persistent(2).unwrap().userinfo;
        assert_eq!(info.get("name"), Some("bot1"));
        assert_eq!(info.get("dm_playermodel"), Some("allied_airborne"));
        assert_eq!(info.get("dm_playergermanmodel"), Some("german_officer"));
        assert_eq!(info.get("fov"), Some("80"));
        assert_eq!(info.get("protocol"), Some("8"));
        assert_eq!(info.get("ip"), Some("0.0.0.0"));
        assert_eq!(info.get("qport"), Some("0"));
        assert_eq!(info.get("challenge"), Some("1"));
        assert_eq!(info.get("snaps"), Some("1"));
        assert_eq!(info.get("rate"), Some("1"));
        assert_eq!(info.get("dmprimary"), Some("smg"));
    }

    #[test]
    fn test_empty_catalog_omits_models() {
        let (mut manager, mut server) = setup(2);
        manager.add_bots(&mut server, 1, None);

        let info = server.persistent(2).unwrap().userinfo;
        assert!(info.get("dm_playermodel").is_none());
        assert!(info.get("dm_playergermanmodel").is_none());
        assert_eq!(info.get("name"), Some("bot1"));
    }

    #[test]
    fn test_fresh_bots_get_deferred_events() {
        let (mut manager, mut server) = setup(2);
        let batch = manager.add_bots(&mut server, 1, None);
        let client = batch.added[0];

        assert_eq!(
            server.pending_events_for(client),
            vec![
                PlayerEvent::AutoJoinTeam,
                PlayerEvent::PrimaryWeapon("auto".to_string())
            ]
        );

        server.run_frame();
        assert!(server.slot_status(client).team.is_playing());
        assert_eq!(server.client(client).primary_weapon.as_deref(), Some("auto"));
    }

    #[test]
    fn test_count_clamped_and_slots_unique() {
        let (mut manager, mut server) = setup(3);
        let batch = manager.add_bots(&mut server, 10, None);

        assert_eq!(batch.len(), 3);
        assert!(!batch.slots_exhausted);
        let unique: HashSet<_> = batch.added.iter().collect();
        assert_eq!(unique.len(), 3);
        assert_eq!(manager.bot_count(), 3);
        assert_eq!(manager.first_bot(), Some(2));
    }

    #[test]
    fn test_exhaustion_keeps_earlier_bots() {
        let (mut manager, mut server) = setup(3);
        server.set_allocated(3, false);

        let batch = manager.add_bots(&mut server, 3, None);

        assert_eq!(batch.added, vec![2, 4]);
        assert!(batch.slots_exhausted);
        assert_eq!(manager.bot_count(), 2);
        assert_eq!(manager.stats().slot_exhaustions, 1);
        assert_eq!(manager.metrics().slot_exhausted_total.get(), 1);
    }

    #[test]
    fn test_named_bot() {
        let (mut manager, mut server) = setup(2);
        let batch = manager.add_named_bot(&mut server, "Sarge");

        let info = server.persistent(batch.added[0]).unwrap().userinfo;
        assert_eq!(info.get("name"), Some("Sarge"));
        assert_eq!(info.get("challenge"), Some("1"));
    }

    #[test]
    fn test_saved_record_reused_verbatim() {
        let (mut manager, mut server) = setup(2);
        let record = SavedBot {
            valid: true,
            persistent: PersistentState {
                userinfo: UserInfo::from("\\name\\veteran\\dm_playermodel\\allied_pilot"),
                netname: "veteran".to_string(),
                team_preference: crate::types::Team::Axis,
                blob: vec![1, 2, 3],
            },
            captured_at: current_timestamp(),
        };

        let batch = manager.add_bots(&mut server, 1, Some(&record));
        let client = batch.added[0];

        assert_eq!(server.persistent(client).unwrap(), record.persistent);
        assert_eq!(server.pending_event_count(), 0);
        assert_eq!(server.slot_status(client).team, crate::types::Team::Axis);
        assert_eq!(
            manager
                .metrics()
                .bots_added_total
                .with_label_values(&["restored"])
                .get(),
            1
        );
    }
}
