use std::io;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit one JSON object per event instead of plain text.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// The configured directives, extended by `RUST_LOG` when it is set. Directives that do not
    /// parse fall back to `info`.
    pub fn env_filter(&self) -> EnvFilter {
        let mut directives = match self.level.trim() {
            "" => Self::default_level(),
            level => level.to_owned(),
        };
        if let Ok(env) = std::env::var("RUST_LOG") {
            let env = env.trim();
            if !env.is_empty() {
                directives.push(',');
                directives.push_str(env);
            }
        }
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(Self::default_level()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

/// A subscriber formatting the events `config` lets through into `make_writer`.
pub fn subscriber<W>(config: &LoggingConfig, make_writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let format: Box<dyn Layer<_> + Send + Sync> = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(make_writer)
            .with_ansi(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(make_writer)
            .with_ansi(false)
            .boxed()
    };
    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(format)
}

static TRACING_INSTALLED: OnceLock<bool> = OnceLock::new();

/// Installs a process-wide subscriber logging to stderr.
///
/// Only the first call has an effect. Returns whether the subscriber installed by that call is
/// the global default (another one may have been installed earlier by someone else).
pub fn init_tracing(config: &LoggingConfig) -> bool {
    *TRACING_INSTALLED.get_or_init(|| {
        let installed =
            tracing::subscriber::set_global_default(subscriber(config, io::stderr)).is_ok();
        if installed {
            tracing::debug!(target: "nbgradle.config", level = %config.level, "tracing initialized");
        }
        installed
    })
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Runs `f` with a subscriber for `config` scoped to the current thread and returns its result
/// together with everything logged meanwhile.
pub fn with_captured_logs<R>(config: &LoggingConfig, f: impl FnOnce() -> R) -> (R, String) {
    let logs = CapturedLogs::default();
    let result = tracing::subscriber::with_default(subscriber(config, logs.clone()), f);
    let text = String::from_utf8_lossy(&logs.0.lock()).into_owned();
    (result, text)
}
