//! Run-level summary manifest.
//!
//! The manifest is append-only: every call adds one entry, even for inputs
//! already recorded. Callers wanting one manifest per run pick one path per
//! run.
use crate::error::SummaryError;
use crate::hooks::required_hooks;
use crate::output::write_json;
use crate::plan::TestSuite;
use crate::runtime::Runtime;
use crate::translate::GeneratedTest;
use anyhow::Result;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub mod markdown;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryFile {
    pub run_date: String,
    pub entries: Vec<SummaryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub input: String,
    pub outputs: SummaryOutputs,
    pub tests: Vec<SummaryTest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOutputs {
    pub plan: String,
    pub test: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTest {
    pub name: String,
    pub required_test_hooks: Vec<String>,
}

/// Inputs for one `append_entry` call.
pub struct AppendRequest<'a> {
    pub summary_path: &'a Path,
    pub input: &'a str,
    pub plan_path: &'a str,
    pub test_path: &'a str,
    pub run_date: Option<&'a str>,
}

impl SummaryTest {
    /// Per-test records for a plan, hooks in first-seen order.
    pub fn for_suite(suite: &TestSuite) -> Vec<SummaryTest> {
        suite
            .tests
            .iter()
            .map(|test| SummaryTest {
                name: test.name.clone(),
                required_test_hooks: required_hooks(&test.steps),
            })
            .collect()
    }
}

impl From<&GeneratedTest> for SummaryTest {
    fn from(test: &GeneratedTest) -> Self {
        Self {
            name: test.name.clone(),
            required_test_hooks: test.required_hooks.clone(),
        }
    }
}

/// ISO-8601 timestamp in UTC with second precision, e.g. `2026-01-28T14:03:52Z`.
pub fn current_run_date(runtime: &dyn Runtime) -> String {
    runtime.now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Read and shape-check an existing summary file.
pub fn load_summary(runtime: &dyn Runtime, path: &Path) -> Result<SummaryFile, SummaryError> {
    let text = runtime
        .read_to_string(path)
        .map_err(|source| SummaryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| SummaryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    parse_summary(value, path)
}

fn parse_summary(value: Value, path: &Path) -> Result<SummaryFile, SummaryError> {
    let invalid = |reason: String| SummaryError::InvalidFormat {
        path: path.to_path_buf(),
        reason,
    };
    let Some(map) = value.as_object() else {
        return Err(invalid("expected an object".to_string()));
    };
    if !map.get("runDate").is_some_and(Value::is_string) {
        return Err(invalid("runDate must be a string".to_string()));
    }
    if !map.get("entries").is_some_and(Value::is_array) {
        return Err(invalid("entries must be an array".to_string()));
    }
    serde_json::from_value(value).map_err(|err| invalid(err.to_string()))
}

/// Append one entry, creating the manifest when it does not exist yet.
pub fn append_entry(
    runtime: &dyn Runtime,
    request: &AppendRequest<'_>,
    tests: Vec<SummaryTest>,
) -> Result<SummaryFile> {
    let mut summary = if runtime.exists(request.summary_path) {
        let mut existing = load_summary(runtime, request.summary_path)?;
        if let Some(run_date) = request.run_date {
            existing.run_date = run_date.to_string();
        }
        existing
    } else {
        SummaryFile {
            run_date: request
                .run_date
                .map(str::to_string)
                .unwrap_or_else(|| current_run_date(runtime)),
            entries: Vec::new(),
        }
    };

    summary.entries.push(SummaryEntry {
        input: request.input.to_string(),
        outputs: SummaryOutputs {
            plan: request.plan_path.to_string(),
            test: request.test_path.to_string(),
        },
        tests,
    });
    write_json(runtime, request.summary_path, &summary)?;
    tracing::debug!(
        path = %request.summary_path.display(),
        entries = summary.entries.len(),
        "appended summary entry"
    );
    Ok(summary)
}
