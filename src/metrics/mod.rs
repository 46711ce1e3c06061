//! Metrics for the bot population manager
//!
//! This module provides Prometheus metrics describing the bot population of
//! a server session.

pub mod collector;

pub use collector::{BotOrigin, MetricsCollector, RemovalPhase};
