//! Command: apply configuration files to the filesystem.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use super::version::version;
use crate::cli::ApplyOpts;
use crate::config::load_tasks;
use crate::dispatcher::Dispatcher;
use crate::error::ConfigError;
use crate::logging::{Log, Logger};
use crate::plugins::{Context, PluginRegistry};

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the base
/// directory does not exist, or any directive failed.
pub fn run(opts: &ApplyOpts, verbose: u8, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("dotlink {}", version()));

    log.stage("Loading configuration");
    let tasks = load_tasks(&opts.config_file, log.as_ref())?;
    let base_directory = resolve_base_directory(opts)?;
    log.debug(&format!("base directory: {}", base_directory.display()));
    log.info(&format!("loaded {} tasks", tasks.len()));

    let shared: Arc<dyn Log> = log.clone();
    let mut ctx = Context::new(&base_directory, shared)?
        .with_dry_run(opts.dry_run)
        .with_verbose(verbose);

    let registry = if opts.disable_built_in_plugins {
        PluginRegistry::new()
    } else {
        PluginRegistry::builtins()
    };
    let dispatcher = Dispatcher::new(registry)
        .with_only(opts.only.clone())
        .with_skip(opts.except.clone())
        .with_exit_on_failure(opts.exit_on_failure);

    let success = dispatcher.dispatch(&tasks, &mut ctx);

    log.print_summary();

    if !success || log.has_failures() {
        anyhow::bail!("{} directive(s) failed", log.failure_count().max(1));
    }
    log.info("All tasks executed successfully");
    Ok(())
}

/// The base directory: `--base-directory`, or the first config file's directory.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigFile`] when neither is available.
pub fn resolve_base_directory(opts: &ApplyOpts) -> Result<PathBuf, ConfigError> {
    if let Some(base) = &opts.base_directory {
        return Ok(base.clone());
    }
    let first = opts.config_file.first().ok_or(ConfigError::NoConfigFile)?;
    Ok(match first.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    })
}
