//! Append-only activity log
//!
//! Operator-visible events are recorded one per line as
//! `[YYYY-MM-DD HH:MM:SS] [LEVEL] message`. The file is never rotated or
//! truncated and is read back verbatim by the log viewer.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;
use ts_core::error::{Result, SweepError};

/// Timestamp layout of every entry
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Label written for a level
pub fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// Event formatter producing activity log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityFormat;

impl<S, N> FormatEvent<S, N> for ActivityFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        writeln!(
            writer,
            "[{}] [{}] {}",
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            level_label(event.metadata().level()),
            visitor.message
        )
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

fn is_activity(metadata: &Metadata<'_>) -> bool {
    *metadata.level() <= Level::INFO
        && (metadata.target().starts_with("ts_") || metadata.target().starts_with("tubesweep"))
}

/// Layer writing this program's INFO and above events in activity format
pub fn activity_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(ActivityFormat)
        .with_writer(writer)
        .with_filter(filter_fn(is_activity))
}

/// Open the log file for appending behind a background writer.
///
/// The guard must be held until exit so buffered entries get flushed.
pub fn open_activity_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| SweepError::Config(format!("invalid log path {}", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(dir)?;
    // Surface permission problems here; the appender panics on them.
    OpenOptions::new().create(true).append(true).open(path)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Read the whole log, or `None` when it does not exist yet
pub fn read_activity_log(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SweepError::Io(e)),
    }
}

/// Last `count` lines of `content`, keeping line endings
pub fn tail_lines(content: &str, count: usize) -> &str {
    if count == 0 {
        return "";
    }

    let trimmed = content.strip_suffix('\n').unwrap_or(content);
    match trimmed.rmatch_indices('\n').nth(count - 1) {
        Some((index, _)) => &content[index + 1..],
        None => content,
    }
}
