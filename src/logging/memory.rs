//! In-memory log capture for tests and for embedding the engine.
use std::sync::Mutex;

use super::types::{DirectiveEntry, DirectiveStatus, Log};

/// A single captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A stage header entry.
    Stage(String),
    /// An informational entry.
    Info(String),
    /// A debug entry.
    Debug(String),
    /// A warning entry.
    Warn(String),
    /// An error entry.
    Error(String),
    /// A dry-run entry.
    DryRun(String),
}

impl LogEntry {
    /// The message text regardless of level.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Stage(m)
            | Self::Info(m)
            | Self::Debug(m)
            | Self::Warn(m)
            | Self::Error(m)
            | Self::DryRun(m) => m,
        }
    }
}

/// Implement the display methods of [`Log`] by pushing each message into
/// `self.entries` as the corresponding [`LogEntry`] variant.
macro_rules! capture_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry::$variant(msg.to_string()));
                }
            }
        )+
    };
}

/// Logger that keeps every message in memory instead of emitting it.
///
/// Nothing reaches the console or the log file; callers inspect the captured
/// entries afterwards.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
    directives: Mutex<Vec<DirectiveEntry>>,
}

impl MemoryLog {
    /// Create an empty memory log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a clone of every captured entry in order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Return the text of every captured entry in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|e| e.message().to_string())
            .collect()
    }

    /// Return the text of captured warnings.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::Warn(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Return the text of captured dry-run lines.
    #[must_use]
    pub fn dry_runs(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::DryRun(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Whether any captured entry contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.message().contains(needle))
    }

    /// Return a clone of all recorded directive entries.
    #[must_use]
    pub fn directive_entries(&self) -> Vec<DirectiveEntry> {
        self.directives.lock().map_or_else(|_| vec![], |g| g.clone())
    }
}

impl Log for MemoryLog {
    capture_log_methods!(
        stage => Stage,
        info => Info,
        debug => Debug,
        warn => Warn,
        error => Error,
        dry_run => DryRun,
    );

    fn record_directive(&self, name: &str, status: DirectiveStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.directives.lock() {
            guard.push(DirectiveEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}
