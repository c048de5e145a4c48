//! Log subscriber setup for the CLI.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary.

use std::io;

use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::{LogConfig, Phase};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, colored.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// JSON lines for tooling.
    Json,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Option<LogFormat> {
        match name {
            "pretty" => Some(LogFormat::Pretty),
            "compact" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Per-phase filter built from the log configuration.
pub fn targets(log_config: &LogConfig) -> Targets {
    Phase::ALL.iter().fold(
        Targets::new().with_default(log_config.global),
        |targets, phase| {
            let target = phase.target();
            let level = log_config.level_for(&target);
            targets.with_target(target, level)
        },
    )
}

/// Install the global subscriber. Logs go to stderr so stdout stays usable
/// for program output.
pub fn init(log_config: &LogConfig, format: LogFormat) {
    let layer = format_layer(format).with_filter(targets(log_config));
    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::registry().with(layer).try_init();
}

fn format_layer(format: LogFormat) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync> {
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .without_time()
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(io::stderr)
            .boxed(),
    }
}
