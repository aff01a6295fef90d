//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::filter::{LevelFilter, Targets};

use crate::resources::paths::expand_user;

/// Tracing target used for stage headers.
pub(super) const STAGE_TARGET: &str = "dotlink::stage";
/// Tracing target used for dry-run action lines.
pub(super) const DRY_RUN_TARGET: &str = "dotlink::dry_run";

/// Log file of one `dotlink` subcommand: `<cache>/dotlink/<command>.log`.
///
/// `<cache>` is `$XDG_CACHE_HOME`, or `~/.cache` when that is unset or
/// empty. The directory is created on demand; `None` if that fails.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let cache = match std::env::var("XDG_CACHE_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(expand_user("~/.cache")),
    };
    let dir = cache.join("dotlink");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Local wall-clock time rendered with a `chrono` format string.
fn timestamp(format: &str) -> String {
    chrono::Local::now().format(format).to_string()
}

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// A [`tracing_subscriber::Layer`] that appends all events to the persistent
/// log file, one timestamped line each.
///
/// Always captures events at `DEBUG` level and above regardless of the
/// console verbosity setting.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open (or create) the log file for `command` under the cache directory.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::at(&log_file_path(command)?)
    }

    /// Truncate `path`, write a run header, and return a layer appending to it.
    pub(super) fn at(path: &Path) -> Option<Self> {
        let version =
            option_env!("DOTLINK_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "==========================================\n\
             dotlink {version} {}\n\
             ==========================================\n",
            timestamp("%Y-%m-%d %H:%M:%S"),
        );
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = extractor.message;
        let ts = timestamp("%H:%M:%S");

        let line = match (level, target) {
            (tracing::Level::INFO, STAGE_TARGET) => format!("[{ts}] ==> {msg}"),
            (tracing::Level::INFO, DRY_RUN_TARGET) => format!("[{ts}]     [dry run] {msg}"),
            (tracing::Level::ERROR, _) => format!("[{ts}]     [error] {msg}"),
            (tracing::Level::WARN, _) => format!("[{ts}]     [warn] {msg}"),
            (tracing::Level::DEBUG, _) => format!("[{ts}]     [debug] {msg}"),
            _ => format!("[{ts}]     {msg}"),
        };

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits dotlink-style
/// console output, with or without ANSI colors.
struct DotlinkFormatter {
    color: bool,
}

impl DotlinkFormatter {
    /// Wrap `text` in the SGR sequence `code` when color is enabled.
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for DotlinkFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = extractor.message;

        match level {
            tracing::Level::ERROR => writeln!(writer, "{} {msg}", self.paint("31", "ERROR")),
            tracing::Level::WARN => writeln!(writer, "{}  {msg}", self.paint("33", "WARN")),
            tracing::Level::INFO if target == STAGE_TARGET => {
                writeln!(writer, "{} {}", self.paint("1;34", "==>"), self.paint("1", &msg))
            }
            tracing::Level::INFO if target == DRY_RUN_TARGET => {
                writeln!(writer, "  {} {msg}", self.paint("33", "[DRY RUN]"))
            }
            tracing::Level::INFO => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  {}", self.paint("2", &msg)),
        }
    }
}

/// Console filter at `level`, optionally letting stage headers through.
///
/// Stage headers are `INFO` events; `keep_stages` shows them even when
/// `level` hides the rest of `INFO`.
#[must_use]
pub fn console_filter(level: LevelFilter, keep_stages: bool) -> Targets {
    let filter = Targets::new().with_default(level);
    if keep_stages && level < LevelFilter::INFO {
        filter.with_target(STAGE_TARGET, LevelFilter::INFO)
    } else {
        filter
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Sets up a console subscriber filtered by `console` (warnings and
/// errors go to stderr, everything else to stdout) and a file subscriber
/// that writes all events (including `debug`) to
/// `$XDG_CACHE_HOME/dotlink/<command>.log`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(console: Targets, color: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(DotlinkFormatter { color })
        .with_writer(make_writer)
        .with_filter(console);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
