//! Declarative dotfiles bootstrapper.
//!
//! Reads an ordered list of tasks from YAML or JSON configuration files and
//! reconciles the filesystem with them: links are created, repaired, or left
//! alone so that re-running the same configuration changes nothing.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: load task lists and parse each directive's typed options
//! - **[`resources`]**: the link reconciliation engine (glob expansion, state
//!   inspection, the deletion guard, link creation)
//! - **[`plugins`]**: one handler per directive, plus the registry and [`plugins::Context`]
//! - **[`dispatcher`]** and **[`commands`]**: walk the tasks and drive a run
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod plugins;
pub mod resources;
