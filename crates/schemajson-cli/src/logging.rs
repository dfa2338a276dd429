//! Structured logging for the schemajson binary
//!
//! stdout carries converted documents, so console logs always go to stderr.

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-line
    Pretty,
    /// One JSON object per event
    Json,
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    /// Daily rolling file under the log directory
    File,
    Both,
}

impl LogOutput {
    pub fn parse(s: &str) -> Self {
        match s {
            "file" => LogOutput::File,
            "both" => LogOutput::Both,
            _ => LogOutput::Stderr,
        }
    }
}

const LOG_FILE: &str = "schemajson.log";

/// Install the global subscriber.
///
/// `config.level` is an `EnvFilter` directive such as `info` or
/// `schemajson_convert=trace`; an unparsable one falls back to `warn`.
pub fn init(config: &LoggingConfig) {
    let format = LogFormat::parse(&config.format);
    let output = LogOutput::parse(&config.output);

    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    match output {
        LogOutput::Stderr => tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init(),
        LogOutput::File => tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer(&config.directory))
            .init(),
        LogOutput::Both => tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer(&config.directory))
            .init(),
    }

    tracing::debug!(format = ?format, output = ?output, level = %config.level, "logging initialized");
}

fn file_layer<S>(directory: &str) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    std::fs::create_dir_all(directory).ok();
    let appender = RollingFileAppender::new(Rotation::DAILY, directory, LOG_FILE);
    fmt::layer().with_writer(appender).with_ansi(false).boxed()
}
