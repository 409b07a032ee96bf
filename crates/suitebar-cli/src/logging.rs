//! Diagnostic logging to stderr.
//!
//! `RUST_LOG` takes precedence over the `[logging]` section of `suitebar.toml`:
//! ```bash
//! RUST_LOG=debug suitebar replay run.ndjson
//! ```
//!
//! Log records share stderr with the live progress line, so every record
//! erases the current line first. The next advance redraws the bar below it.

use std::io::{self, Write};
use std::sync::Once;

use suitebar_config::LoggingConfig;
use suitebar_core::bar::ERASE_LINE;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Writer for one log record: erases the current line before the first byte.
struct ClearLine<W: Write> {
    inner: W,
    cleared: bool,
}

impl<W: Write> ClearLine<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            cleared: false,
        }
    }
}

impl<W: Write> Write for ClearLine<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.cleared && !buf.is_empty() {
            self.inner.write_all(ERASE_LINE.as_bytes())?;
            self.cleared = true;
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Install the global subscriber. Only the first call takes effect.
pub fn init(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::try_new(&config.default).unwrap_or_else(|_| EnvFilter::new("warn"))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(|| ClearLine::new(io::stderr()))
            .with_ansi(console::colors_enabled_stderr())
            .with_target(true)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        // Another subscriber may already be installed (tests); keep it.
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}
