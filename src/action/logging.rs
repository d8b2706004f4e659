//! Tracing output rendered as workflow commands
//!
//! Warnings and errors become `::warning::` / `::error::` annotations,
//! debug output only shows when step debug logging is enabled, and info
//! events are printed as plain log lines.

use std::fmt::Write as _;
use std::io::Write as _;

use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::action::commands::escape_data;

/// A tracing Layer that writes every event as a workflow command line
pub struct WorkflowCommandLayer<W> {
    make_writer: W,
}

impl<W> WorkflowCommandLayer<W>
where
    W: for<'a> MakeWriter<'a> + 'static,
{
    pub fn new(make_writer: W) -> Self {
        Self { make_writer }
    }
}

impl<S, W> Layer<S> for WorkflowCommandLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'a> MakeWriter<'a> + 'static,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let line = format_command(*event.metadata().level(), &visitor.finish());
        let mut writer = self.make_writer.make_writer();
        let _ = writeln!(writer, "{}", line);
    }
}

/// Renders one event as a workflow command line
pub fn format_command(level: Level, message: &str) -> String {
    match level {
        Level::ERROR => format!("::error::{}", escape_data(message)),
        Level::WARN => format!("::warning::{}", escape_data(message)),
        Level::INFO => message.to_string(),
        _ => format!("::debug::{}", escape_data(message)),
    }
}

/// Collects the message and appends other fields as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Default filter directive for this crate
pub fn default_directive(runner_debug: bool) -> String {
    let level = if runner_debug { "debug" } else { "info" };
    format!("setup_coolify={}", level)
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the default; otherwise debug output is enabled when
/// the runner has step debug logging turned on (`RUNNER_DEBUG=1`).
pub fn init_logging() -> Result<(), TryInitError> {
    let runner_debug = std::env::var("RUNNER_DEBUG").is_ok_and(|value| value == "1");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(runner_debug)));

    tracing_subscriber::registry()
        .with(filter)
        .with(WorkflowCommandLayer::new(std::io::stdout))
        .try_init()
}
