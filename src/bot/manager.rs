//! Population controller
//!
//! `PopulationManager` is the per-session context object that owns the bot
//! counter, the model catalog and the save/restore snapshot. Slot
//! allocation, removal and the snapshot ledger are implemented as further
//! `impl` blocks in the sibling modules.

use crate::bot::models::ModelCatalog;
use crate::config::{validate_config, AppConfig};
use crate::engine::{GameServer, ModelSource};
use crate::error::{BotError, Result};
use crate::metrics::MetricsCollector;
use crate::types::{ClientNum, SavedBot};
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};
use uuid::Uuid;

/// Cumulative statistics about population management
#[derive(Debug, Clone, Default, Serialize)]
pub struct PopulationStats {
    /// Total bots connected, fresh and restored
    pub bots_added: u64,
    /// Total bots disconnected by the remover
    pub bots_removed: u64,
    /// Bots brought back from a snapshot
    pub bots_restored: u64,
    /// Allocation attempts that found no free slot
    pub slot_exhaustions: u64,
    /// Population checks performed
    pub reconciles: u64,
    /// Time of the last population check
    pub last_reconcile: Option<DateTime<Utc>>,
}

/// What a population check decided and did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub humans: usize,
    pub desired: usize,
    pub restored: usize,
    pub added: usize,
    pub removed: usize,
}

/// Bot population state for one server session
pub struct PopulationManager {
    pub(crate) config: AppConfig,
    pub(crate) catalog: ModelCatalog,
    pub(crate) rng: SmallRng,
    /// Authoritative count of bot-held slots
    pub(crate) bot_count: usize,
    pub(crate) first_bot: Option<ClientNum>,
    pub(crate) saved: Option<Vec<SavedBot>>,
    pub(crate) stats: PopulationStats,
    pub(crate) metrics: Arc<MetricsCollector>,
    session_id: Uuid,
}

impl PopulationManager {
    /// Create a manager with its own metrics registry
    pub fn new(config: AppConfig) -> Result<Self> {
        let metrics = Arc::new(MetricsCollector::new()?);
        Self::with_metrics(config, metrics)
    }

    /// Create a manager reporting into an existing metrics collector
    pub fn with_metrics(config: AppConfig, metrics: Arc<MetricsCollector>) -> Result<Self> {
        validate_config(&config).map_err(|e| BotError::ConfigurationError {
            message: e.to_string(),
        })?;

        let rng = match config.bots.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let session_id = Uuid::new_v4();
        info!(
            "Bot population session {} started (max bots: {}, min players: {}, bots: {})",
            session_id, config.bots.max_bots, config.bots.min_players, config.bots.num_bots
        );

        Ok(Self {
            config,
            catalog: ModelCatalog::new(),
            rng,
            bot_count: 0,
            first_bot: None,
            saved: None,
            stats: PopulationStats::default(),
            metrics,
            session_id,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Number of slots currently held by bots
    pub fn bot_count(&self) -> usize {
        self.bot_count
    }

    /// First slot ever given to a bot in this session
    pub fn first_bot(&self) -> Option<ClientNum> {
        self.first_bot
    }

    /// Whether a snapshot is waiting to be restored
    pub fn pending_restore(&self) -> bool {
        self.saved.is_some()
    }

    /// Records in the pending snapshot, in capture order
    pub fn saved_bots(&self) -> &[SavedBot] {
        self.saved.as_deref().unwrap_or_default()
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn stats(&self) -> PopulationStats {
        self.stats.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// First slot index available to bots
    pub(crate) fn bot_slot_start(&self) -> usize {
        self.config.server.human_slots
    }

    pub(crate) fn publish_population(&self) {
        self.metrics
            .set_population(self.bot_count, self.saved_bots().len());
    }

    /// Human clients currently playing; spectators and unassigned clients
    /// do not count
    pub fn count_human_clients<S: GameServer + ?Sized>(&self, server: &S) -> usize {
        let human_slots = self.bot_slot_start().min(server.max_clients());
        (0..human_slots)
            .map(|client| server.slot_status(client))
            .filter(|status| status.in_use && status.allocated && !status.is_bot)
            .filter(|status| status.team.is_playing())
            .count()
    }

    /// Bots the server should carry for a given number of humans
    pub fn desired_bot_count(&self, humans: usize) -> usize {
        let bots = &self.config.bots;
        if humans < bots.min_players {
            bots.min_players - humans + bots.num_bots
        } else {
            bots.num_bots
        }
    }

    /// Bring the bot population in line with the configured targets
    pub fn reconcile<S: GameServer + ?Sized>(
        &mut self,
        server: &mut S,
        models: &dyn ModelSource,
    ) -> ReconcileOutcome {
        let start = Instant::now();
        let mut outcome = ReconcileOutcome::default();

        self.catalog.refresh(models, &self.config.models);

        if self.pending_restore() {
            outcome.restored = self.restore_all(server);
        }

        outcome.humans = self.count_human_clients(server);
        outcome.desired = self.desired_bot_count(outcome.humans);

        match outcome.desired.cmp(&self.bot_count) {
            Ordering::Greater => {
                let missing = outcome.desired - self.bot_count;
                debug!(
                    "Population below target ({} of {} bots), adding {}",
                    self.bot_count, outcome.desired, missing
                );
                outcome.added = self.add_bots(server, missing, None).len();
            }
            Ordering::Less => {
                let surplus = self.bot_count - outcome.desired;
                debug!(
                    "Population above target ({} of {} bots), removing {}",
                    self.bot_count, outcome.desired, surplus
                );
                outcome.removed = self.remove_bots(server, surplus).len();
            }
            Ordering::Equal => {
                trace!("Population at target ({} bots)", self.bot_count);
            }
        }

        self.stats.reconciles += 1;
        self.stats.last_reconcile = Some(current_timestamp());
        self.metrics.record_reconcile(start.elapsed());
        self.publish_population();

        outcome
    }

    /// Snapshot every bot ahead of a level transition and forget the live
    /// population; the engine tears the slots down itself
    pub fn reset<S: GameServer + ?Sized>(&mut self, server: &S) {
        self.save_all(server);
        self.bot_count = 0;
        self.publish_population();

        info!(
            "Bot population reset, {} bots saved for restore",
            self.saved_bots().len()
        );
    }

    /// Run one simulation step for a bot using the commands its AI produced
    pub fn think<S: GameServer + ?Sized>(
        &self,
        server: &mut S,
        client: ClientNum,
        msec: u32,
    ) -> Result<()> {
        if !server.slot_status(client).is_active_bot() {
            return Err(BotError::NotABot { client }.into());
        }

        server.update_bot_ai(client);
        let cmd = server.bot_usercmd(client);
        let eyes = server.bot_eye_info(client);
        server.client_think(client, &cmd, &eyes, msec);

        Ok(())
    }
}
