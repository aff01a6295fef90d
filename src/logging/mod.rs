//! Logging infrastructure for structured console and file output.

mod logger;
mod memory;
mod subscriber;
mod types;

pub use logger::Logger;
pub use memory::{LogEntry, MemoryLog};
pub use subscriber::{console_filter, init_subscriber};
pub use types::{DirectiveEntry, DirectiveStatus, Log};

/// Create a Logger backed by an isolated per-thread tracing subscriber
/// with a file layer, so that tracing events emitted by logger methods
/// actually reach the log file during tests.
///
/// The returned [`tracing::dispatcher::DefaultGuard`] must be kept alive
/// for the duration of the test; dropping it restores the previous
/// thread-local dispatcher.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("test.log");
    let file_layer = subscriber::FileLayer::at(&path).expect("failed to create file layer");
    let log = Logger::with_log_file(path);
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}
