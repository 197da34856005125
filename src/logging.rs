// Log output: emoji, level and wall-clock time before every message

use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

pub struct CustomFormatter;

fn level_prefix(level: &Level) -> (&'static str, &'static str) {
    match *level {
        Level::TRACE => ("🔬", "TRACE"),
        Level::DEBUG => ("🐛", "DEBUG"),
        Level::INFO => ("ℹ️ ", "INFO"),
        Level::WARN => ("⚠️ ", "WARN"),
        Level::ERROR => ("❌", "ERROR"),
    }
}

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let (emoji, level) = level_prefix(event.metadata().level());
        let timestamp = Local::now().format("%H:%M:%S");

        write!(writer, "{} {} [{}]: ", emoji, level, timestamp)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Default filter directive; `RUST_LOG` wins when set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "stepreport=debug,warn"
    } else {
        "stepreport=warn,error"
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .event_format(CustomFormatter)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_prefix() {
        assert_eq!(level_prefix(&Level::WARN), ("⚠️ ", "WARN"));
        assert_eq!(level_prefix(&Level::ERROR).1, "ERROR");
    }

    #[test]
    fn test_default_filter() {
        assert!(default_filter(true).starts_with("stepreport=debug"));
        assert!(default_filter(false).starts_with("stepreport=warn"));
    }
}
