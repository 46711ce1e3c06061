//! Server frame driver
//!
//! `ServerRuntime` owns the session's population manager next to an
//! in-memory game server and advances both one frame at a time: bot think,
//! event delivery, periodic population checks and optional level changes.

use crate::bot::{PopulationManager, ReconcileOutcome};
use crate::config::AppConfig;
use crate::engine::{DirectoryModelSource, GameServer, LocalServer, ModelSource};
use crate::metrics::MetricsCollector;
use crate::types::Team;
use crate::utils::format_millis;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Bot simulation error: {message}")]
    Simulation { message: String },
}

/// One server session: game server, model source and bot population
pub struct ServerRuntime {
    config: AppConfig,
    server: LocalServer,
    models: Box<dyn ModelSource + Send>,
    manager: PopulationManager,
    frame: u64,
    running: Arc<AtomicBool>,
}

impl ServerRuntime {
    /// Create a runtime listing models from the configured game root
    pub fn new(config: AppConfig) -> Result<Self, ServiceError> {
        let models = DirectoryModelSource::new(&config.service.game_root);
        Self::with_model_source(config, Box::new(models))
    }

    /// Create a runtime with a custom model source
    pub fn with_model_source(
        config: AppConfig,
        models: Box<dyn ModelSource + Send>,
    ) -> Result<Self, ServiceError> {
        let metrics =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );
        let manager = PopulationManager::with_metrics(config.clone(), metrics).map_err(|e| {
            ServiceError::Initialization {
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            server: LocalServer::from_config(&config),
            config,
            models,
            manager,
            frame: 0,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn manager(&self) -> &PopulationManager {
        &self.manager
    }

    pub fn server(&self) -> &LocalServer {
        &self.server
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.manager.metrics()
    }

    /// Handle used to stop the loop from another task; clearing it before
    /// `run` starts makes `run` return without simulating a frame
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Connect `count` human clients, alternating teams, into the human slots
    pub fn seed_humans(&mut self, count: usize) -> usize {
        let human_slots = self.config.server.human_slots.min(self.server.max_clients());
        let mut seeded = 0;

        for client in 0..human_slots {
            if seeded == count {
                break;
            }
            if self.server.slot_status(client).in_use {
                continue;
            }
            let team = if seeded % 2 == 0 { Team::Allies } else { Team::Axis };
            self.server
                .connect_human(client, &format!("player{}", client + 1), team);
            seeded += 1;
        }

        if seeded < count {
            warn!("Only {} of {} human slots could be filled", seeded, count);
        }
        seeded
    }

    /// Check the bot population immediately
    pub fn reconcile(&mut self) -> ReconcileOutcome {
        self.manager
            .reconcile(&mut self.server, self.models.as_ref())
    }

    /// Simulate a level change: snapshot bots, let the engine tear them
    /// down, then restore them on the new level
    pub fn change_level(&mut self) -> ReconcileOutcome {
        info!("Changing level at frame {}", self.frame);
        self.manager.reset(&self.server);
        self.server.teardown_level();
        self.reconcile()
    }

    /// Advance the session by one server frame
    pub fn run_frame(&mut self) -> Result<(), ServiceError> {
        let start = Instant::now();
        self.frame += 1;
        self.server.run_frame();

        let msec = self.config.server.frame_time_ms as u32;
        for client in self.server.bot_clients() {
            self.manager
                .think(&mut self.server, client, msec)
                .map_err(|e| ServiceError::Simulation {
                    message: e.to_string(),
                })?;
        }

        let level_change = self.config.service.level_change_frames;
        if level_change > 0 && self.frame % level_change == 0 {
            self.change_level();
        } else if self.frame % self.config.service.population_check_frames == 0 {
            let outcome = self.reconcile();
            if outcome.added > 0 || outcome.removed > 0 {
                info!(
                    "Population check: {} humans, {} bots desired, +{} -{}",
                    outcome.humans, outcome.desired, outcome.added, outcome.removed
                );
            }
        }

        debug!("Frame {} took {}", self.frame, format_millis(start.elapsed()));
        Ok(())
    }

    /// Run frames on the configured interval until `max_frames` have run
    /// (0 means no limit) or the running flag is cleared
    pub async fn run(&mut self, max_frames: u64) -> Result<(), ServiceError> {
        let mut interval = tokio::time::interval(self.config.frame_time());

        info!(
            "Server loop started: {} human slots, {} bot slots, {} per frame",
            self.config.server.human_slots,
            self.config.bots.max_bots,
            format_millis(self.config.frame_time())
        );

        // Populate right away instead of waiting for the first check
        self.reconcile();

        while self.running.load(Ordering::SeqCst) {
            interval.tick().await;

            if let Err(e) = self.run_frame() {
                error!("Frame {} failed: {}", self.frame, e);
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }

            if max_frames > 0 && self.frame >= max_frames {
                break;
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!(
            "Server loop stopped after {} frames with {} bots",
            self.frame,
            self.manager.bot_count()
        );
        Ok(())
    }
}
