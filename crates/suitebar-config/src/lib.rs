use std::path::Path;

use serde::Deserialize;

pub const CONFIG_FILENAME: &str = "suitebar.toml";

pub const DEFAULT_WIDTH: usize = 40;
pub const DEFAULT_FRAMES: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
pub const DEFAULT_BAR_CHAR: &str = "━";

const MAX_WIDTH: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse suitebar.toml: {0}")]
    Parse(String),
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Full `suitebar.toml` configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SuitebarConfig {
    /// When to emit ANSI colors.
    pub color: ColorChoice,

    /// Progress line appearance.
    pub bar: BarConfig,

    /// Status glyphs used in the summary.
    pub glyphs: GlyphConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Color when the target stream is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BarConfig {
    /// Number of bar cells, independent of the suite count.
    pub width: usize,

    /// Spinner animation frames, one character per frame.
    /// `frames = "|/-\\"`
    pub frames: String,

    /// Glyph repeated for every bar cell.
    #[serde(rename = "char")]
    pub bar_char: String,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            frames: DEFAULT_FRAMES.to_string(),
            bar_char: DEFAULT_BAR_CHAR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GlyphConfig {
    pub passed: String,
    pub failed: String,
    pub pending: String,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            passed: "\u{2714}".to_string(),
            failed: "\u{2718}".to_string(),
            pending: "-".to_string(),
        }
    }
}

/// Log filter settings. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level: `error`, `warn`, `info`, `debug` or `trace`.
    pub default: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: "warn".to_string(),
        }
    }
}

/// Load `suitebar.toml` from the given directory.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but cannot be read or parsed.
pub fn load(project_root: &Path) -> Result<Option<SuitebarConfig>, ConfigError> {
    let path = project_root.join(CONFIG_FILENAME);
    if !path.exists() {
        return Ok(None);
    }
    load_file(&path).map(Some)
}

/// Load a config file at an explicit path. A missing file is an error here.
pub fn load_file(path: &Path) -> Result<SuitebarConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}

/// Parse and validate config text.
pub fn parse(content: &str) -> Result<SuitebarConfig, ConfigError> {
    let config: SuitebarConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &SuitebarConfig) -> Result<(), ConfigError> {
    let bar = &config.bar;
    if bar.width == 0 || bar.width > MAX_WIDTH {
        return Err(ConfigError::Validation(format!(
            "bar width {} is out of range; use 1..={MAX_WIDTH}",
            bar.width
        )));
    }

    if bar.frames.is_empty() {
        return Err(ConfigError::Validation(
            "bar frames must contain at least one character".to_string(),
        ));
    }

    if bar.bar_char.chars().count() != 1 {
        return Err(ConfigError::Validation(format!(
            "bar char '{}' must be exactly one character",
            bar.bar_char
        )));
    }

    for (status, glyph) in [
        ("passed", &config.glyphs.passed),
        ("failed", &config.glyphs.failed),
        ("pending", &config.glyphs.pending),
    ] {
        if glyph.is_empty() {
            return Err(ConfigError::Validation(format!(
                "glyph for '{status}' must not be empty"
            )));
        }
    }

    Ok(())
}
