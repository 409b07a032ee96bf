use std::io::Write;

use crate::ReporterError;
use crate::duration::format_duration;
use crate::style::{Status, Theme};

/// Final counters of a run, already normalized by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: u64,
    pub failed: u64,
    pub pending: u64,
    pub total_tests: u64,
    /// One entry per suite; `None` or empty when the suite had no failure.
    pub failure_messages: Vec<Option<String>>,
    pub elapsed_ms: u64,
    pub snapshot_failure: bool,
}

/// Blank line followed by `Found N test suites`.
pub fn write_banner<W: Write>(
    out: &mut W,
    total_suites: u64,
    theme: &Theme,
) -> Result<(), ReporterError> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        theme
            .palette
            .info(&format!("Found {total_suites} test suites"))
    )?;
    out.flush()?;
    Ok(())
}

pub fn write_summary<W: Write>(
    out: &mut W,
    summary: &RunSummary,
    theme: &Theme,
) -> Result<(), ReporterError> {
    for message in summary.failure_messages.iter().flatten() {
        if !message.is_empty() {
            writeln!(out, "{message}")?;
        }
    }

    writeln!(
        out,
        "{}",
        theme.palette.info(&format!(
            "Ran {} tests in {}",
            summary.total_tests,
            format_duration(summary.elapsed_ms)
        ))
    )?;

    if summary.snapshot_failure {
        writeln!(
            out,
            "\n{} found, run with -u flag to remove them\n",
            theme.palette.status(Status::Failed, "Obsolete snapshot(s)")
        )?;
    }

    for (status, count) in [
        (Status::Passed, summary.passed),
        (Status::Failed, summary.failed),
        (Status::Pending, summary.pending),
    ] {
        if count > 0 {
            writeln!(out, "{}", theme.status_line(status, count))?;
        }
    }

    out.flush()?;
    Ok(())
}
