//! CLI command handlers

pub mod commands;

pub use commands::{import, inspect, ImportOptions};
