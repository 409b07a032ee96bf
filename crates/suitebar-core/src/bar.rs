use std::io::Write;

use crate::ReporterError;
use crate::style::BarStyle;

/// Erase the whole current line, then return to column 0.
pub const ERASE_LINE: &str = "\x1b[2K\r";

/// Single-line progress indicator redrawn in place on every advance.
///
/// `current` is never clamped: finishing more units than `total` keeps
/// counting in the fraction while the bar and percentage stay at 100%.
#[derive(Debug, Clone)]
pub struct ProgressBar {
    total: u64,
    current: u64,
    frame: usize,
    style: BarStyle,
}

impl ProgressBar {
    pub fn new(total: u64, style: BarStyle) -> Self {
        Self {
            total,
            current: 0,
            frame: 0,
            style,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    /// `current` clamped to `total`; the numerator of every ratio.
    fn done(&self) -> u64 {
        self.current.min(self.total)
    }

    /// Filled cells: `round(width * current / total)`, halves rounding up.
    pub fn filled_width(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        let width = self.style.width() as u128;
        let total = u128::from(self.total);
        let filled = (2 * width * u128::from(self.done()) + total) / (2 * total);
        filled as usize
    }

    pub fn percent(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        (u128::from(self.done()) * 100 / u128::from(self.total)) as u64
    }

    pub fn advance<W: Write>(&mut self, sink: &mut W) -> Result<(), ReporterError> {
        self.current = self.current.saturating_add(1);
        self.frame = (self.frame + 1) % self.style.frame_count();
        self.render(sink)
    }

    pub fn render<W: Write>(&self, sink: &mut W) -> Result<(), ReporterError> {
        write!(sink, "{ERASE_LINE}{}", self.line())?;
        sink.flush()?;
        Ok(())
    }

    pub fn complete<W: Write>(&self, sink: &mut W) -> Result<(), ReporterError> {
        writeln!(sink)?;
        sink.flush()?;
        Ok(())
    }

    /// `⠙ ━━━━━━━━ (3/10) 30%` with the filled body, head and empty tail
    /// styled separately.
    pub fn line(&self) -> String {
        let palette = self.style.palette();
        let cell = self.style.bar_char().to_string();
        let filled = self.filled_width();
        let empty = self.style.width() - filled;

        let mut bar = String::new();
        if filled > 0 {
            if filled > 1 {
                bar.push_str(&palette.bar_body(&cell.repeat(filled - 1)));
            }
            bar.push_str(&palette.bar_head(&cell));
        }
        if empty > 0 {
            bar.push_str(&palette.bar_empty(&cell.repeat(empty)));
        }

        let spinner = palette.spinner(&self.style.frame(self.frame).to_string());
        format!(
            "{spinner} {bar} ({}/{}) {}%",
            self.current,
            self.total,
            self.percent()
        )
    }
}
