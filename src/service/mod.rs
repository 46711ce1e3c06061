//! Service layer for the bot population binary
//!
//! This module contains the server runtime that advances frames, thinks
//! for bots and runs periodic population checks.

pub mod app;

pub use app::{ServerRuntime, ServiceError};
