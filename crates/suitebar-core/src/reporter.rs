use std::io::Write;

use crate::ReporterError;
use crate::bar::ProgressBar;
use crate::style::Theme;
use crate::summary::{RunSummary, write_banner, write_summary};

/// Lifecycle notifications a host test runner delivers, in order:
/// one run start, interleaved unit start/finish pairs, one run complete.
///
/// Implementations must tolerate out-of-order and surplus notifications.
pub trait Reporter {
    fn on_run_start(&mut self, total_suites: u64);
    fn on_unit_start(&mut self);
    fn on_unit_finish(&mut self);
    fn on_run_complete(&mut self, summary: &RunSummary);

    /// Last error captured while reporting. Nothing is ever captured, so
    /// this always answers "no error".
    fn last_error(&self) -> Option<&ReporterError> {
        None
    }
}

/// No-op reporter for tests and headless runs.
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn on_run_start(&mut self, _total_suites: u64) {}
    fn on_unit_start(&mut self) {}
    fn on_unit_finish(&mut self) {}
    fn on_run_complete(&mut self, _summary: &RunSummary) {}
}

#[derive(Debug)]
enum Phase {
    /// Run announced (or not yet); no unit has started.
    Waiting,
    Running(ProgressBar),
    Completed,
}

/// Draws the live progress line on `err` and the banner and summary on `out`.
pub struct ProgressReporter<O: Write, E: Write> {
    out: O,
    err: E,
    theme: Theme,
    total: u64,
    phase: Phase,
}

impl<O: Write, E: Write> ProgressReporter<O, E> {
    pub fn new(out: O, err: E, theme: Theme) -> Self {
        Self {
            out,
            err,
            theme,
            total: 0,
            phase: Phase::Waiting,
        }
    }

    /// Suite count recorded by the latest run start.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// The live bar, once the first unit has started.
    pub fn progress(&self) -> Option<&ProgressBar> {
        match &self.phase {
            Phase::Running(bar) => Some(bar),
            Phase::Waiting | Phase::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, Phase::Completed)
    }

    pub fn into_sinks(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> Reporter for ProgressReporter<O, E> {
    fn on_run_start(&mut self, total_suites: u64) {
        tracing::debug!(total_suites, "run started");
        emit(write_banner(&mut self.out, total_suites, &self.theme));
        self.total = total_suites;
    }

    fn on_unit_start(&mut self) {
        if let Phase::Waiting = self.phase {
            tracing::debug!(total = self.total, "first unit started");
            self.phase = Phase::Running(ProgressBar::new(self.total, self.theme.bar.clone()));
        }
    }

    fn on_unit_finish(&mut self) {
        match &mut self.phase {
            Phase::Running(bar) => emit(bar.advance(&mut self.err)),
            Phase::Waiting => tracing::debug!("unit finished before any unit started; ignored"),
            Phase::Completed => tracing::debug!("unit finished after run completed; ignored"),
        }
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        if let Phase::Running(bar) = &self.phase {
            emit(bar.complete(&mut self.err));
        }
        self.phase = Phase::Completed;
        tracing::debug!(
            passed = summary.passed,
            failed = summary.failed,
            pending = summary.pending,
            elapsed_ms = summary.elapsed_ms,
            "run completed"
        );
        emit(write_summary(&mut self.out, summary, &self.theme));
    }
}

/// Write failures are logged and dropped.
fn emit(result: Result<(), ReporterError>) {
    if let Err(e) = result {
        tracing::debug!("dropped reporter output: {e}");
    }
}
