pub mod bar;
pub mod duration;
pub mod reporter;
pub mod style;
pub mod summary;

pub use bar::ProgressBar;
pub use duration::{DurationBreakdown, format_duration};
pub use reporter::{ProgressReporter, Reporter, SilentReporter};
pub use style::{BarStyle, Glyphs, Palette, Status, Theme};
pub use summary::RunSummary;

#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    #[error("failed to write progress output: {0}")]
    Io(#[from] std::io::Error),
}
