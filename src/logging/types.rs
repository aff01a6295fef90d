//! Core logging types: directive entries, status, and the [`Log`] trait.

/// Directive execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct DirectiveEntry {
    /// Directive name as written in the configuration (e.g. `link`).
    pub name: String,
    /// Final status of the directive.
    pub status: DirectiveStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveStatus {
    /// Every target of the directive succeeded.
    Ok,
    /// The directive was filtered out or its plugin cannot run in dry-run mode.
    Skipped,
    /// The directive ran in dry-run mode; no changes were applied.
    DryRun,
    /// At least one target failed, or the directive could not be processed.
    Failed,
}

/// Abstraction over logging backends.
///
/// Both [`Logger`](super::logger::Logger) (console and log file output) and
/// [`MemoryLog`](super::memory::MemoryLog) (in-memory capture) implement this
/// trait, so plugin and resource code can log without knowing where the
/// output ends up.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a directive result for the summary.
    fn record_directive(&self, name: &str, status: DirectiveStatus, message: Option<&str>);
}
