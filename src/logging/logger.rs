//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET, log_file_path};
use super::types::{DirectiveEntry, DirectiveStatus, Log};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Messages go through [`tracing`]; the subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) writes them to the
/// console and to `$XDG_CACHE_HOME/dotlink/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    directives: Mutex<Vec<DirectiveEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary. The file
    /// itself is created by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            directives: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Create a logger that reports `path` as its log file.
    #[must_use]
    pub const fn with_log_file(path: PathBuf) -> Self {
        Self {
            directives: Mutex::new(Vec::new()),
            log_file: Some(path),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded directive entries.
    #[must_use]
    pub fn directive_entries(&self) -> Vec<DirectiveEntry> {
        self.directives.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a directive result for the summary.
    pub fn record_directive(&self, name: &str, status: DirectiveStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.directives.lock() {
            guard.push(DirectiveEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed directives.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.directives.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|d| d.status == DirectiveStatus::Failed)
                .count()
        })
    }

    /// Return `true` if any recorded directive has failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Log the summary of all recorded directives.
    pub fn print_summary(&self) {
        let directives = self.directive_entries();
        if directives.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut skipped = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for directive in &directives {
            let (icon, color) = match directive.status {
                DirectiveStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                DirectiveStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                DirectiveStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                DirectiveStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = directive
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", directive.name));
        }

        let total = ok + skipped + dry_run + failed;
        self.info(&format!(
            "{total} directives: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_directive(&self, name: &str, status: DirectiveStatus, message: Option<&str>) {
        self.record_directive(name, status, message);
    }
}
