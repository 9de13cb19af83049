//! Logging for the ksh binary.
//!
//! The kestrel crates log through `log`; those records reach this
//! subscriber through tracing's log bridge. The configured level applies to
//! kestrel's own targets only, dependencies stay at `warn`. Messages
//! matching a configured pattern are dropped.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use kestrel_shell::config::LoggingConfig;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Targets that follow the configured level.
const KESTREL_TARGETS: &[&str] = &["ksh", "kestrel_shell", "kestrel_core"];

/// Formats like the default `fmt` layer, except that lines containing a
/// suppressed pattern are not written at all.
struct SuppressingFormat {
    inner: fmt::format::Format,
    patterns: Vec<String>,
}

impl SuppressingFormat {
    fn new(patterns: Vec<String>) -> Self {
        Self {
            inner: fmt::format::Format::default(),
            patterns,
        }
    }

    fn suppresses(&self, line: &str) -> bool {
        self.patterns.iter().any(|pattern| line.contains(pattern.as_str()))
    }
}

impl<S, N> FormatEvent<S, N> for SuppressingFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let mut line = String::new();
        self.inner.format_event(ctx, Writer::new(&mut line), event)?;
        if self.suppresses(&line) {
            return Ok(());
        }
        write!(writer, "{line}")
    }
}

/// `warn` everywhere, `level` for the kestrel targets.
fn default_directives(level: &str) -> String {
    std::iter::once("warn".to_string())
        .chain(KESTREL_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

fn open_log_file(path: &Path) -> Option<File> {
    match File::create(path) {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!("Warning: cannot create log file {}: {err}", path.display());
            None
        }
    }
}

fn install<W>(filter: EnvFilter, writer: W, patterns: Vec<String>)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .event_format(SuppressingFormat::new(patterns));
    tracing_subscriber::registry().with(filter).with(layer).init();
}

/// Install the global subscriber.
///
/// `RUST_LOG` replaces the configured directives. Output goes to the
/// configured log file, or to stderr when there is none or it cannot be
/// created.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));
    let patterns = config.suppressed_patterns.clone();

    let log_file = config
        .log_file
        .as_deref()
        .and_then(|path| open_log_file(path).map(|file| (file, path)));
    match log_file {
        Some((file, path)) => {
            install(filter, Mutex::new(file), patterns);
            eprintln!("Logging to {}", path.display());
        }
        None => install(filter, io::stderr, patterns),
    }
}
