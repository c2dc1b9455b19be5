//! ADRD Knowledge Graph management console library.
//!
//! This library provides the core functionality for the management console,
//! including the typed catalog API client, the session guard, and the
//! upload review workflow.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod preview;
pub mod session;
pub mod workflow;
