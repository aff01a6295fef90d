//! Top-level subcommand handlers.
pub mod apply;
pub mod version;
