//! Host runner events as newline-delimited JSON.
//!
//! Payload fields mirror what test runners hand their reporters. Counts arrive
//! untyped and are normalized here, so the core only ever sees `u64`.

use std::io::BufRead;

use serde::Deserialize;
use serde_json::Value;
use suitebar_core::{Reporter, RunSummary};

#[derive(Debug, Deserialize)]
#[serde(
    tag = "event",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum HostEvent {
    RunStart {
        #[serde(default)]
        num_total_test_suites: Option<Value>,
    },
    TestStart {
        #[serde(default)]
        path: Option<String>,
    },
    TestResult {
        #[serde(default)]
        path: Option<String>,
    },
    RunComplete(RunComplete),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunComplete {
    pub num_passed_tests: Option<Value>,
    pub num_failed_tests: Option<Value>,
    pub num_pending_tests: Option<Value>,
    pub num_total_tests: Option<Value>,
    /// Per-suite results; entries may be `null` or lack a message.
    pub test_results: Option<Vec<Value>>,
    /// Run start as epoch milliseconds.
    pub start_time: Option<Value>,
    /// Takes precedence over `start_time` when present.
    pub elapsed_ms: Option<Value>,
    pub snapshot: Option<Value>,
}

impl RunComplete {
    pub fn into_summary(self, now_ms: i64) -> RunSummary {
        let failure_messages = self
            .test_results
            .unwrap_or_default()
            .iter()
            .map(|result| result.get("failureMessage").and_then(failure_message))
            .collect();

        let elapsed_ms = match &self.elapsed_ms {
            Some(elapsed) => normalize_count(Some(elapsed)),
            None => elapsed_since(self.start_time.as_ref(), now_ms),
        };

        let snapshot_failure = self
            .snapshot
            .as_ref()
            .and_then(|s| s.get("failure"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        RunSummary {
            passed: normalize_count(self.num_passed_tests.as_ref()),
            failed: normalize_count(self.num_failed_tests.as_ref()),
            pending: normalize_count(self.num_pending_tests.as_ref()),
            total_tests: normalize_count(self.num_total_tests.as_ref()),
            failure_messages,
            elapsed_ms,
            snapshot_failure,
        }
    }
}

/// Falsy values (`null`, `false`, `0`, `""`) carry no message; anything
/// else is printed, non-strings as JSON.
fn failure_message(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Missing, non-numeric, negative or non-finite counts become 0; positive
/// fractions are floored.
pub fn normalize_count(value: Option<&Value>) -> u64 {
    match value.and_then(Value::as_f64) {
        Some(n) if n.is_finite() && n > 0.0 => n.floor() as u64,
        _ => 0,
    }
}

fn elapsed_since(start_time: Option<&Value>, now_ms: i64) -> u64 {
    match start_time.and_then(Value::as_f64) {
        Some(start) if start.is_finite() => {
            let elapsed = now_ms as f64 - start;
            if elapsed > 0.0 { elapsed as u64 } else { 0 }
        }
        _ => 0,
    }
}

/// Returns `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<HostEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

pub fn apply<R: Reporter + ?Sized>(reporter: &mut R, event: HostEvent, now_ms: i64) {
    match event {
        HostEvent::RunStart {
            num_total_test_suites,
        } => reporter.on_run_start(normalize_count(num_total_test_suites.as_ref())),
        HostEvent::TestStart { path } => {
            tracing::trace!(path = path.as_deref().unwrap_or(""), "suite started");
            reporter.on_unit_start();
        }
        HostEvent::TestResult { path } => {
            tracing::trace!(path = path.as_deref().unwrap_or(""), "suite finished");
            reporter.on_unit_finish();
        }
        HostEvent::RunComplete(payload) => reporter.on_run_complete(&payload.into_summary(now_ms)),
    }
}

/// Feed every event in `input` to `reporter`. Malformed lines, including
/// lines that are not UTF-8, are logged and skipped; only I/O errors abort.
pub fn replay<B, R, F>(input: B, reporter: &mut R, now_ms: F) -> std::io::Result<usize>
where
    B: BufRead,
    R: Reporter + ?Sized,
    F: Fn() -> i64,
{
    let mut applied = 0;
    for (index, bytes) in input.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(line = index + 1, "skipping malformed event: {e}");
                continue;
            }
        };
        match parse_line(line) {
            Ok(Some(event)) => {
                apply(reporter, event, now_ms());
                applied += 1;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(line = index + 1, "skipping malformed event: {e}"),
        }
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use suitebar_core::{ProgressReporter, SilentReporter, Theme};

    use super::*;

    fn complete(value: Value) -> RunComplete {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn normalize_valid_counts() {
        assert_eq!(normalize_count(Some(&json!(5))), 5);
        assert_eq!(normalize_count(Some(&json!(2.9))), 2);
        assert_eq!(normalize_count(Some(&json!(0))), 0);
    }

    #[test]
    fn normalize_invalid_counts_to_zero() {
        assert_eq!(normalize_count(None), 0);
        assert_eq!(normalize_count(Some(&json!(-5))), 0);
        assert_eq!(normalize_count(Some(&json!(-0.5))), 0);
        assert_eq!(normalize_count(Some(&json!("12"))), 0);
        assert_eq!(normalize_count(Some(&Value::Null)), 0);
        assert_eq!(normalize_count(Some(&json!({"n": 1}))), 0);
    }

    #[test]
    fn parse_run_start() {
        let event = parse_line(r#"{"event":"runStart","numTotalTestSuites":3}"#)
            .unwrap()
            .unwrap();
        assert!(matches!(
            event,
            HostEvent::RunStart { num_total_test_suites: Some(ref n) } if n == &json!(3)
        ));
    }

    #[test]
    fn parse_run_start_without_count() {
        let event = parse_line(r#"{"event":"runStart"}"#).unwrap().unwrap();
        assert!(matches!(
            event,
            HostEvent::RunStart {
                num_total_test_suites: None
            }
        ));
    }

    #[test]
    fn parse_test_events() {
        let start = parse_line(r#"{"event":"testStart","path":"/a.spec.js"}"#)
            .unwrap()
            .unwrap();
        assert!(matches!(start, HostEvent::TestStart { path: Some(ref p) } if p == "/a.spec.js"));
        let result = parse_line(r#"{"event":"testResult"}"#).unwrap().unwrap();
        assert!(matches!(result, HostEvent::TestResult { path: None }));
    }

    #[test]
    fn blank_line_is_none() {
        assert!(parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn unknown_event_is_error() {
        assert!(parse_line(r#"{"event":"explode"}"#).is_err());
        assert!(parse_line("not json").is_err());
    }

    #[test]
    fn summary_from_full_payload() {
        let summary = complete(json!({
            "numPassedTests": 4,
            "numFailedTests": 1,
            "numPendingTests": 0,
            "numTotalTests": 5,
            "testResults": [
                {"failureMessage": "Error: Test failed!"},
                {"failureMessage": null},
                null,
                {"failureMessage": "Another error"}
            ],
            "elapsedMs": 90000,
            "snapshot": {"failure": true}
        }))
        .into_summary(0);
        assert_eq!(summary.passed, 4);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_tests, 5);
        assert_eq!(summary.elapsed_ms, 90_000);
        assert!(summary.snapshot_failure);
        assert_eq!(
            summary.failure_messages,
            vec![
                Some("Error: Test failed!".to_string()),
                None,
                None,
                Some("Another error".to_string())
            ]
        );
    }

    #[test]
    fn truthy_non_string_failure_messages_are_kept() {
        let summary = complete(json!({
            "testResults": [
                {"failureMessage": {"code": 7}},
                {"failureMessage": 42},
                {"failureMessage": true},
                {"failureMessage": false},
                {"failureMessage": 0},
                {"failureMessage": ""},
                "not an object"
            ]
        }))
        .into_summary(0);
        assert_eq!(
            summary.failure_messages,
            vec![
                Some(r#"{"code":7}"#.to_string()),
                Some("42".to_string()),
                Some("true".to_string()),
                None,
                None,
                None,
                None
            ]
        );
    }

    #[test]
    fn elapsed_from_start_time() {
        let summary = complete(json!({"startTime": 1_000})).into_summary(2_050);
        assert_eq!(summary.elapsed_ms, 1_050);
    }

    #[test]
    fn start_time_in_future_is_zero() {
        let summary = complete(json!({"startTime": 5_000})).into_summary(1_000);
        assert_eq!(summary.elapsed_ms, 0);
    }

    #[test]
    fn missing_fields_default() {
        let summary = complete(json!({"snapshot": null})).into_summary(0);
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn replay_counts_applied_events() {
        let input = "{\"event\":\"runStart\",\"numTotalTestSuites\":1}\n\
                     \n\
                     garbage\n\
                     {\"event\":\"testStart\"}\n\
                     {\"event\":\"testResult\"}\n";
        let applied = replay(input.as_bytes(), &mut SilentReporter, || 0).unwrap();
        assert_eq!(applied, 3);
    }

    #[test]
    fn replay_skips_invalid_utf8_lines() {
        let mut input = Vec::new();
        input.extend_from_slice(b"{\"event\":\"runStart\",\"numTotalTestSuites\":2}\n");
        input.extend_from_slice(b"{\"event\":\"testStart\"}\n");
        input.extend_from_slice(b"{\"event\":\"testResult\"}\n");
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(b"{\"event\":\"testResult\"}\n");
        input.extend_from_slice(
            b"{\"event\":\"runComplete\",\"numPassedTests\":2,\"numTotalTests\":2,\"elapsedMs\":10}",
        );

        let mut reporter = ProgressReporter::new(Vec::new(), Vec::new(), Theme::plain());
        let applied = replay(input.as_slice(), &mut reporter, || 0).unwrap();
        assert_eq!(applied, 5);
        assert!(reporter.is_completed());

        let (out, err) = reporter.into_sinks();
        let out = String::from_utf8(out).unwrap();
        let err = String::from_utf8(err).unwrap();
        assert!(out.ends_with("Ran 2 tests in 0.010s\n\u{2714} 2 passing\n"));
        assert!(err.ends_with("(2/2) 100%\n"));
    }

    #[test]
    fn replay_handles_crlf_and_missing_trailing_newline() {
        let input = "{\"event\":\"runStart\",\"numTotalTestSuites\":1}\r\n{\"event\":\"testStart\"}";
        let applied = replay(input.as_bytes(), &mut SilentReporter, || 0).unwrap();
        assert_eq!(applied, 2);
    }

    #[test]
    fn replay_drives_progress_reporter() {
        let input = [
            r#"{"event":"runStart","numTotalTestSuites":-5}"#,
            r#"{"event":"testStart"}"#,
            r#"{"event":"testResult"}"#,
            r#"{"event":"runComplete","numPassedTests":2,"numTotalTests":2,"elapsedMs":5500}"#,
        ]
        .join("\n");
        let mut reporter = ProgressReporter::new(Vec::new(), Vec::new(), Theme::plain());
        replay(input.as_bytes(), &mut reporter, || 0).unwrap();
        assert_eq!(reporter.total(), 0);

        let (out, err) = reporter.into_sinks();
        let out = String::from_utf8(out).unwrap();
        let err = String::from_utf8(err).unwrap();
        insta::assert_snapshot!(out.trim_start(), @r"
        Found 0 test suites
        Ran 2 tests in 5.500s
        ✔ 2 passing
        ");
        assert!(err.ends_with("(1/0) 0%\n"));
    }
}
