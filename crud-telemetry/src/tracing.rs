use crud_config::BackendMode;
use std::io::Write;
use std::sync::{Once, OnceLock};
use std::{
    backtrace::{Backtrace, BacktraceStatus},
    panic::PanicHookInfo,
};
use thiserror::Error;
use tracing::field::display;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::{LogTracer, log_tracer::SetLoggerError};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber, Registry, fmt, layer::SubscriberExt};

/// JSON field name identifying the web app in production logs.
const APP_KEY_IN_LOG: &str = "app";

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to init log tracer: {0}")]
    InitLogTracer(#[from] SetLoggerError),

    #[error("failed to set global default subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),
}

/// Handle that keeps the non-blocking log writer alive.
///
/// Production mode hands out a [`WorkerGuard`] that must live until the process
/// exits, otherwise buffered lines are lost.
#[must_use]
pub enum LogFlusher {
    Flusher(WorkerGuard),
    NullFlusher,
}

static INIT_TEST_TRACING: Once = Once::new();

/// Initializes tracing for tests.
///
/// Output is only enabled when `ENABLE_TRACING` is set:
/// ```bash
/// ENABLE_TRACING=1 cargo test test_name
/// ```
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        if std::env::var("ENABLE_TRACING").is_ok() {
            let _log_flusher = init_tracing("test", BackendMode::Development)
                .expect("Failed to initialize tracing for tests");
        }
    });
}

static APP_NAME: OnceLock<String> = OnceLock::new();

/// Writer wrapper adding the application name to every JSON log line.
///
/// Several web apps usually ship their logs to the same sink, the extra field
/// lets them be told apart.
struct AppInjectingWriter<W> {
    inner: W,
}

impl<W> AppInjectingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W> Write for AppInjectingWriter<W>
where
    W: Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Some(app_name) = APP_NAME.get()
            && let Some(line) = inject_field(buf, APP_KEY_IN_LOG, app_name)
        {
            self.inner.write_all(line.as_bytes())?;
            return Ok(buf.len());
        }

        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Returns `buf` with `key` set to `value` if it is a JSON object lacking `key`.
fn inject_field(buf: &[u8], key: &str, value: &str) -> Option<String> {
    let line = std::str::from_utf8(buf).ok()?;
    let serde_json::Value::Object(mut map) = serde_json::from_str(line).ok()? else {
        return None;
    };
    if map.contains_key(key) {
        return None;
    }

    map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    let mut out = serde_json::to_string(&map).ok()?;
    if line.ends_with('\n') {
        out.push('\n');
    }

    Some(out)
}

/// Initializes tracing for a web app or tool.
///
/// Production mode writes JSON lines to stdout through a non-blocking writer,
/// development mode pretty-prints to the terminal. The filter comes from
/// `RUST_LOG` and defaults to `info`.
pub fn init_tracing(app_name: &str, mode: BackendMode) -> Result<LogFlusher, TracingError> {
    let _ = APP_NAME.set(app_name.to_string());

    // Route records emitted through the `log` crate (e.g. by dependencies)
    // into the tracing subscriber.
    LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let log_flusher = if mode.is_prod() {
        configure_prod_tracing(filter)?
    } else {
        configure_dev_tracing(filter)?
    };

    set_tracing_panic_hook();

    Ok(log_flusher)
}

fn configure_prod_tracing(filter: EnvFilter) -> Result<LogFlusher, TracingError> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let format = fmt::format()
        .with_level(true)
        .with_ansi(false)
        .with_target(false);

    let subscriber = Registry::default().with(filter).with(
        fmt::layer()
            .event_format(format)
            .with_writer(move || AppInjectingWriter::new(writer.make_writer()))
            .json()
            .with_current_span(true)
            .with_span_list(true),
    );

    set_global_default(subscriber)?;

    Ok(LogFlusher::Flusher(guard))
}

fn configure_dev_tracing(filter: EnvFilter) -> Result<LogFlusher, TracingError> {
    let format = fmt::format()
        .with_level(true)
        .with_ansi(true)
        .pretty()
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    let subscriber = FmtSubscriber::builder()
        .event_format(format)
        .with_env_filter(filter)
        .finish();

    set_global_default(subscriber)?;

    Ok(LogFlusher::NullFlusher)
}

/// Chains a hook that reports panics through `tracing` in front of the
/// existing panic hook, so panics end up in the structured logs too.
fn set_tracing_panic_hook() {
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        log_panic(info);
        prev_hook(info);
    }));
}

fn log_panic(panic_info: &PanicHookInfo) {
    let backtrace = Backtrace::capture();
    let (backtrace, note) = match backtrace.status() {
        BacktraceStatus::Captured => (Some(backtrace), None),
        BacktraceStatus::Disabled => (None, Some("set RUST_BACKTRACE=1 to capture a backtrace")),
        _ => (None, Some("backtrace unavailable")),
    };

    let payload = panic_info
        .payload()
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic_info.payload().downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload");

    tracing::error!(
        panic.payload = payload,
        panic.location = panic_info.location().map(display),
        panic.backtrace = backtrace.map(display),
        panic.note = note,
        "a panic occurred",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_is_added_to_json_lines() {
        let line = inject_field(b"{\"level\":\"INFO\"}\n", "app", "Volumes Web App").unwrap();

        assert!(line.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["app"], "Volumes Web App");
        assert_eq!(value["level"], "INFO");
    }

    #[test]
    fn existing_field_and_plain_text_are_left_alone() {
        assert!(inject_field(b"{\"app\":\"other\"}", "app", "mine").is_none());
        assert!(inject_field(b"plain text line", "app", "mine").is_none());
    }
}
