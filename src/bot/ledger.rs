//! Save/restore of bots across level transitions

use crate::bot::manager::PopulationManager;
use crate::engine::GameServer;
use crate::types::SavedBot;
use crate::utils::current_timestamp;
use tracing::{debug, info};

impl PopulationManager {
    /// Snapshot every active bot, replacing any snapshot not yet restored
    pub fn save_all<S: GameServer + ?Sized>(&mut self, server: &S) {
        if let Some(stale) = self.saved.take() {
            debug!("Discarding {} unrestored bot records", stale.len());
        }

        if self.bot_count == 0 {
            self.publish_population();
            return;
        }

        let captured_at = current_timestamp();
        let mut records = Vec::with_capacity(self.bot_count);
        for client in self.bot_slot_start()..server.max_clients() {
            if !server.slot_status(client).is_active_bot() {
                continue;
            }
            if let Some(persistent) = server.persistent(client) {
                records.push(SavedBot {
                    valid: true,
                    persistent,
                    captured_at,
                });
            }
        }

        debug!("Saved {} bots", records.len());
        self.saved = Some(records);
        self.publish_population();
    }

    /// Respawn one bot per saved record, in capture order, then drop the
    /// snapshot. Returns how many bots came back.
    pub fn restore_all<S: GameServer + ?Sized>(&mut self, server: &mut S) -> usize {
        let Some(records) = self.saved.take() else {
            return 0;
        };

        let valid = records.iter().filter(|r| r.valid).count();
        let mut restored = 0;
        for record in records.iter().filter(|r| r.valid) {
            restored += self.add_bots(server, 1, Some(record)).len();
        }

        if restored < valid {
            info!(
                "Restored {} of {} saved bots; the rest found no free slot",
                restored, valid
            );
        } else {
            info!("Restored {} saved bots", restored);
        }

        self.stats.bots_restored += restored as u64;
        self.publish_population();
        restored
    }
}
