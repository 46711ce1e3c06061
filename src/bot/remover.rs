//! Team-balanced bot removal
//!
//! Removal runs in two phases. The balanced phase only takes bots from a
//! team that is not behind, so shrinking the population never widens the
//! gap between teams. Whatever demand is left is then served in slot order
//! regardless of team.

use crate::bot::manager::PopulationManager;
use crate::engine::GameServer;
use crate::metrics::RemovalPhase;
use crate::types::ClientNum;
use tracing::{debug, info};

impl PopulationManager {
    /// Disconnect up to `count` bots (clamped to the bot limit), returning
    /// the freed slots in removal order
    pub fn remove_bots<S: GameServer + ?Sized>(
        &mut self,
        server: &mut S,
        count: usize,
    ) -> Vec<ClientNum> {
        let count = count.min(self.config.bots.max_bots);
        let mut removed = Vec::with_capacity(count);
        let mut teams = server.team_counts();

        // Balanced phase: repeat passes until nothing more can go
        loop {
            let mut progressed = false;

            for client in self.bot_slots(server) {
                if removed.len() >= count {
                    break;
                }

                let status = server.slot_status(client);
                if !status.is_active_bot() {
                    continue;
                }

                if let Some(opponent) = status.team.opponent() {
                    if teams.get(status.team) < teams.get(opponent) {
                        // never thin out the team that is already behind
                        continue;
                    }
                    if let Some(team_count) = teams.get_mut(status.team) {
                        *team_count = team_count.saturating_sub(1);
                    }
                    progressed = true;
                }

                self.disconnect_bot(server, client, RemovalPhase::Balanced);
                removed.push(client);
            }

            if !progressed || removed.len() >= count {
                break;
            }
        }

        // Unconditional phase
        if removed.len() < count {
            debug!(
                "Balanced removal stopped at {} of {} bots, removing the rest in slot order",
                removed.len(),
                count
            );

            for client in self.bot_slots(server) {
                if removed.len() >= count {
                    break;
                }
                if server.slot_status(client).is_active_bot() {
                    self.disconnect_bot(server, client, RemovalPhase::Unconditional);
                    removed.push(client);
                }
            }
        }

        if !removed.is_empty() {
            let remaining = server.team_counts();
            info!(
                "Removed {} bots (allies: {}, axis: {} remaining on roster)",
                removed.len(),
                remaining.allies,
                remaining.axis
            );
        }
        self.publish_population();
        removed
    }

    fn bot_slots<S: GameServer + ?Sized>(&self, server: &S) -> std::ops::Range<ClientNum> {
        self.bot_slot_start().min(server.max_clients())..server.max_clients()
    }

    fn disconnect_bot<S: GameServer + ?Sized>(
        &mut self,
        server: &mut S,
        client: ClientNum,
        phase: RemovalPhase,
    ) {
        server.disconnect(client);
        self.bot_count = self.bot_count.saturating_sub(1);
        self.stats.bots_removed += 1;
        self.metrics.record_bot_removed(phase);
        debug!("Bot on client {} disconnected ({:?})", client, phase);
    }
}
