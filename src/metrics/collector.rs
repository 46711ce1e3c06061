//! Metrics collection using Prometheus
//!
//! This module tracks the bot population of a server session: how many bots
//! are live, how many are waiting in a snapshot, and how often slots ran out.

use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Where a bot came from when it was added
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotOrigin {
    Fresh,
    Restored,
}

/// Which removal pass disconnected a bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPhase {
    Balanced,
    Unconditional,
}

/// Main metrics collector for the bot population
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Bots currently occupying slots
    pub active_bots: IntGauge,

    /// Records held in the save/restore snapshot
    pub saved_bots: IntGauge,

    /// Bots added, by origin
    pub bots_added_total: IntCounterVec,

    /// Bots removed, by removal phase
    pub bots_removed_total: IntCounterVec,

    /// Allocation attempts that found no free slot
    pub slot_exhausted_total: IntCounter,

    /// Time spent in a population check
    pub reconcile_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let active_bots = IntGauge::with_opts(Opts::new(
            "bot_population_active_bots",
            "Number of bots currently occupying client slots",
        ))?;
        registry.register(Box::new(active_bots.clone()))?;

        let saved_bots = IntGauge::with_opts(Opts::new(
            "bot_population_saved_bots",
            "Number of bot records waiting to be restored",
        ))?;
        registry.register(Box::new(saved_bots.clone()))?;

        let bots_added_total = IntCounterVec::new(
            Opts::new("bot_population_bots_added_total", "Total bots added"),
            &["origin"],
        )?;
        registry.register(Box::new(bots_added_total.clone()))?;

        let bots_removed_total = IntCounterVec::new(
            Opts::new("bot_population_bots_removed_total", "Total bots removed"),
            &["phase"],
        )?;
        registry.register(Box::new(bots_removed_total.clone()))?;

        let slot_exhausted_total = IntCounter::with_opts(Opts::new(
            "bot_population_slot_exhausted_total",
            "Bot allocations aborted because no client slot was free",
        ))?;
        registry.register(Box::new(slot_exhausted_total.clone()))?;

        let reconcile_duration = Histogram::with_opts(
            HistogramOpts::new(
                "bot_population_reconcile_duration_seconds",
                "Time spent reconciling the bot population",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.01, 0.1]),
        )?;
        registry.register(Box::new(reconcile_duration.clone()))?;

        Ok(Self {
            registry,
            active_bots,
            saved_bots,
            bots_added_total,
            bots_removed_total,
            slot_exhausted_total,
            reconcile_duration,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record a bot entering a slot
    pub fn record_bot_added(&self, origin: BotOrigin) {
        let origin_str = match origin {
            BotOrigin::Fresh => "fresh",
            BotOrigin::Restored => "restored",
        };

        self.bots_added_total.with_label_values(&[origin_str]).inc();
    }

    /// Record a bot leaving its slot
    pub fn record_bot_removed(&self, phase: RemovalPhase) {
        let phase_str = match phase {
            RemovalPhase::Balanced => "balanced",
            RemovalPhase::Unconditional => "unconditional",
        };

        self.bots_removed_total.with_label_values(&[phase_str]).inc();
    }

    /// Record an allocation that ran out of slots
    pub fn record_slot_exhausted(&self) {
        self.slot_exhausted_total.inc();
    }

    /// Publish the current bot and snapshot sizes
    pub fn set_population(&self, active: usize, saved: usize) {
        self.active_bots.set(active as i64);
        self.saved_bots.set(saved as i64);
    }

    /// Record how long a population check took
    pub fn record_reconcile(&self, duration: Duration) {
        self.reconcile_duration.observe(duration.as_secs_f64());
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_gauges() {
        let metrics = MetricsCollector::new().unwrap();

        metrics.record_bot_added(BotOrigin::Fresh);
        metrics.record_bot_added(BotOrigin::Fresh);
        metrics.record_bot_added(BotOrigin::Restored);
        metrics.record_bot_removed(RemovalPhase::Balanced);
        metrics.record_slot_exhausted();
        metrics.set_population(2, 1);

        assert_eq!(
            metrics.bots_added_total.with_label_values(&["fresh"]).get(),
            2
        );
        assert_eq!(
            metrics
                .bots_added_total
                .with_label_values(&["restored"])
                .get(),
            1
        );
        assert_eq!(
            metrics
                .bots_removed_total
                .with_label_values(&["balanced"])
                .get(),
            1
        );
        assert_eq!(metrics.slot_exhausted_total.get(), 1);
        assert_eq!(metrics.active_bots.get(), 2);
        assert_eq!(metrics.saved_bots.get(), 1);
    }

    #[test]
    fn test_render_text_format() {
        let metrics = MetricsCollector::new().unwrap();
        metrics.set_population(3, 0);
        metrics.record_reconcile(Duration::from_micros(50));

        let text = metrics.render().unwrap();
        assert!(text.contains("bot_population_active_bots 3"));
        assert!(text.contains("bot_population_reconcile_duration_seconds_count 1"));
    }
}
