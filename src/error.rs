use crate::plan::ValidationIssue;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("recursive glob is not supported: {input}")]
    RecursiveGlob { input: String },

    #[error("hidden path is not allowed: {input}")]
    HiddenInput { input: String },

    #[error("invalid glob segment {segment:?}: {source}")]
    Pattern {
        segment: String,
        #[source]
        source: regex::Error,
    },

    #[error("unable to determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("unable to read plan file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in plan file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("plan file {} failed validation:\n{}", path.display(), format_issues(issues))]
    Invalid {
        path: PathBuf,
        issues: Vec<ValidationIssue>,
    },
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("unable to read summary file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse existing summary file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid summary file format: {} ({reason})", path.display())]
    InvalidFormat { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("generated suite {suite:?} is missing its source annotation")]
    MissingSourceAnnotation { suite: String },

    #[error("generated suite {suite:?} carries source annotation {found:?}, expected {expected:?}")]
    SourceAnnotationMismatch {
        suite: String,
        expected: String,
        found: String,
    },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}
