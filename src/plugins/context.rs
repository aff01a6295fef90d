use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::{Mapping, Value};

use crate::error::ConfigError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::resources::paths::normalize;

/// Shared context handed to every plugin.
///
/// Replaces process-wide state: the logger, the current `defaults` block,
/// and the run options all travel through this value.
pub struct Context {
    /// Absolute, literal base directory (symlinks not resolved).
    base_directory: PathBuf,
    /// Most recent `defaults` block; replaced wholesale, never merged.
    defaults: Mapping,
    /// Logger for output and directive recording.
    pub log: Arc<dyn Log>,
    /// Whether to preview changes without applying them.
    pub dry_run: bool,
    /// Verbosity level from the command line (`-v` count).
    pub verbose: u8,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Filesystem operation abstraction (injectable for testing).
    pub fs_ops: Arc<dyn FileSystemOps>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("base_directory", &self.base_directory)
            .field("defaults", &self.defaults)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("verbose", &self.verbose)
            .field("executor", &"<dyn Executor>")
            .field("fs_ops", &"<dyn FileSystemOps>")
            .finish()
    }
}

impl Context {
    /// Creates a new context rooted at `base_directory`.
    ///
    /// A relative base directory is resolved against the current working
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonexistentBaseDirectory`] if the directory does
    /// not exist.
    pub fn new(base_directory: &Path, log: Arc<dyn Log>) -> Result<Self, ConfigError> {
        let absolute = std::path::absolute(base_directory)
            .map_err(|_| ConfigError::NonexistentBaseDirectory(base_directory.to_path_buf()))?;
        let absolute = normalize(&absolute);
        if !absolute.is_dir() {
            return Err(ConfigError::NonexistentBaseDirectory(absolute));
        }
        Ok(Self {
            base_directory: absolute,
            defaults: Mapping::new(),
            log,
            dry_run: false,
            verbose: 0,
            executor: Arc::new(SystemExecutor),
            fs_ops: Arc::new(SystemFileSystemOps),
        })
    }

    /// Base directory, resolved through symlinks when `canonicalize` is set.
    ///
    /// Falls back to the literal path if resolution fails.
    #[must_use]
    pub fn base_directory(&self, canonicalize: bool) -> PathBuf {
        if canonicalize {
            self.fs_ops
                .canonicalize(&self.base_directory)
                .unwrap_or_else(|_| self.base_directory.clone())
        } else {
            self.base_directory.clone()
        }
    }

    /// The current `defaults` block.
    #[must_use]
    pub const fn defaults(&self) -> &Mapping {
        &self.defaults
    }

    /// Replace the `defaults` block.
    pub fn set_defaults(&mut self, defaults: Mapping) {
        self.defaults = defaults;
    }

    /// Default options for `directive`, if the current block names it.
    #[must_use]
    pub fn defaults_for(&self, directive: &str) -> Option<&Value> {
        self.defaults.get(directive)
    }

    /// Return this context with dry-run mode set.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Return this context with the verbosity level set.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    /// Return this context with a different [`Executor`].
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    /// Return this context with a different [`FileSystemOps`] implementation.
    ///
    /// Used in tests to record mutations or inject failures.
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        self.fs_ops = fs_ops;
        self
    }

    /// Create a copy of this context with a different logger.
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            base_directory: self.base_directory.clone(),
            defaults: self.defaults.clone(),
            log,
            dry_run: self.dry_run,
            verbose: self.verbose,
            executor: Arc::clone(&self.executor),
            fs_ops: Arc::clone(&self.fs_ops),
        }
    }
}
