use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

use crate::terminal::spinner::SpinnerWriter;

pub struct KagecheckFormatter;

impl<S, N> FormatEvent<S, N> for KagecheckFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        // One section header per check.
        if meta.target() == "kagecheck::section" {
            write!(writer, "\n{} ", "━━━ Testing:".bright_blue().bold())?;
            ctx.field_format().format_fields(writer.by_ref(), event)?;
            writeln!(writer, " {}", "━━━".bright_blue().bold())?;
            return Ok(());
        }

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
            match (meta.target(), *meta.level()) {
                ("kagecheck::success", _) => ("[+]", |s| s.green().bold()),
                ("kagecheck::info", _) => ("[i]", |s| s.blue()),
                (_, Level::TRACE) => ("[ ]", |s| s.dimmed()),
                (_, Level::DEBUG) => ("[?]", |s| s.blue()),
                (_, Level::INFO) => ("[+]", |s| s.green().bold()),
                (_, Level::WARN) => ("[*]", |s| s.yellow().bold()),
                (_, Level::ERROR) => ("[-]", |s| s.red().bold()),
            };

        write!(writer, "{} ", color_func(symbol.into()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Installs the narration subscriber. `-q` drops informational lines,
/// `-qq` keeps only failures; `RUST_LOG` overrides both.
pub fn init(quiet: u8) {
    let default_directive = match quiet {
        0 => "info",
        1 => "warn",
        _ => "error",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(KagecheckFormatter)
        .with_writer(|| SpinnerWriter)
        .init();
}
