use console::Style;
use suitebar_config::{DEFAULT_BAR_CHAR, DEFAULT_FRAMES, DEFAULT_WIDTH, SuitebarConfig};

const SPINNER_COLOR: u8 = 42;
const BODY_COLOR: u8 = 178;
const HEAD_COLOR: u8 = 220;
const EMPTY_COLOR: u8 = 62;

/// Outcome category of a summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
    Pending,
}

/// Applies ANSI styles, or nothing at all when colors are off.
///
/// Styles are forced when enabled so the decision made at startup is not
/// second-guessed by `console`'s own terminal detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn colored() -> Self {
        Self { enabled: true }
    }

    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.enabled {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn spinner(&self, text: &str) -> String {
        self.paint(Style::new().color256(SPINNER_COLOR), text)
    }

    pub fn bar_body(&self, text: &str) -> String {
        self.paint(Style::new().color256(BODY_COLOR), text)
    }

    pub fn bar_head(&self, text: &str) -> String {
        self.paint(Style::new().color256(HEAD_COLOR), text)
    }

    pub fn bar_empty(&self, text: &str) -> String {
        self.paint(Style::new().color256(EMPTY_COLOR), text)
    }

    pub fn info(&self, text: &str) -> String {
        self.paint(Style::new().white(), text)
    }

    pub fn status(&self, status: Status, text: &str) -> String {
        let style = match status {
            Status::Passed => Style::new().green(),
            Status::Failed => Style::new().red(),
            Status::Pending => Style::new().cyan(),
        };
        self.paint(style, text)
    }
}

/// Everything the progress line needs to draw itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarStyle {
    width: usize,
    frames: Vec<char>,
    bar_char: char,
    palette: Palette,
}

impl BarStyle {
    /// An empty frame set falls back to the default spinner.
    pub fn new(width: usize, frames: &str, bar_char: char, palette: Palette) -> Self {
        let mut frames: Vec<char> = frames.chars().collect();
        if frames.is_empty() {
            frames = DEFAULT_FRAMES.chars().collect();
        }
        Self {
            width,
            frames,
            bar_char,
            palette,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> char {
        self.frames[index % self.frames.len()]
    }

    pub fn bar_char(&self) -> char {
        self.bar_char
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }
}

impl Default for BarStyle {
    fn default() -> Self {
        Self::new(
            DEFAULT_WIDTH,
            DEFAULT_FRAMES,
            default_bar_char(),
            Palette::colored(),
        )
    }
}

fn default_bar_char() -> char {
    DEFAULT_BAR_CHAR.chars().next().unwrap_or('=')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyphs {
    pub passed: String,
    pub failed: String,
    pub pending: String,
}

impl Glyphs {
    pub fn get(&self, status: Status) -> &str {
        match status {
            Status::Passed => &self.passed,
            Status::Failed => &self.failed,
            Status::Pending => &self.pending,
        }
    }
}

impl Default for Glyphs {
    fn default() -> Self {
        let config = suitebar_config::GlyphConfig::default();
        Self {
            passed: config.passed,
            failed: config.failed,
            pending: config.pending,
        }
    }
}

/// Injected appearance for the whole reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub bar: BarStyle,
    pub glyphs: Glyphs,
    pub palette: Palette,
}

impl Theme {
    /// Build a theme from a validated config. Color detection happens
    /// upstream; `colors` is the final answer.
    pub fn from_config(config: &SuitebarConfig, colors: bool) -> Self {
        let palette = if colors {
            Palette::colored()
        } else {
            Palette::plain()
        };
        let bar_char = config
            .bar
            .bar_char
            .chars()
            .next()
            .unwrap_or_else(default_bar_char);
        Self {
            bar: BarStyle::new(config.bar.width, &config.bar.frames, bar_char, palette),
            glyphs: Glyphs {
                passed: config.glyphs.passed.clone(),
                failed: config.glyphs.failed.clone(),
                pending: config.glyphs.pending.clone(),
            },
            palette,
        }
    }

    /// Default appearance without any escape sequences.
    pub fn plain() -> Self {
        Self::from_config(&SuitebarConfig::default(), false)
    }

    /// `✔` followed by ` 5 passing` in the status color.
    pub fn status_line(&self, status: Status, count: u64) -> String {
        let label = match status {
            Status::Passed => "passing",
            Status::Failed => "failing",
            Status::Pending => "pending",
        };
        format!(
            "{}{}",
            self.palette.status(status, self.glyphs.get(status)),
            self.palette.status(status, &format!(" {count} {label}"))
        )
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&SuitebarConfig::default(), true)
    }
}
