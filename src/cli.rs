//! CLI argument parsing for the plan-to-Playwright pipeline.
//!
//! Each subcommand maps to one workflow entry point; parsing stays free of
//! file-system access so the same entry points run against any `Runtime`.
use crate::resolve::DEFAULT_PLAN_ROOT;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "acpw",
    version,
    about = "Generate Playwright suites from acceptance-criteria test plans",
    after_help = "Commands:\n  generate-tests <plans...> --tests-dir <dir> --summary-dir <dir>\n  append-json-summary-entry --summary-json <path> --input <ac> --plan <plan.json> --test <spec.ts>\n  create-markdown-summary --summary-json <path> --summary-md <path>\n  validate-plan <plan.json>\n\nExamples:\n  acpw validate-plan plans/login.json\n  acpw generate-tests 'plans/*.json' --tests-dir tests --summary-dir summaries\n  acpw create-markdown-summary --summary-json summaries/run.json --summary-md summaries/run.md",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Emit debug diagnostics on stderr (overridden by ACPW_LOG)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    GenerateTests(GenerateTestsArgs),
    AppendJsonSummaryEntry(AppendSummaryArgs),
    CreateMarkdownSummary(MarkdownSummaryArgs),
    ValidatePlan(ValidatePlanArgs),
}

/// Generate Playwright test files from plan files.
#[derive(Parser, Debug)]
#[command(about = "Validate plans, write Playwright tests, and record a run summary")]
pub struct GenerateTestsArgs {
    /// Plan files or single-level globs (`plans/*.json`; `**` is rejected)
    #[arg(value_name = "PLAN")]
    pub inputs: Vec<String>,

    /// Directory receiving generated `*.spec.ts` files
    #[arg(long, value_name = "DIR")]
    pub tests_dir: PathBuf,

    /// Directory receiving the run summary JSON and Markdown
    #[arg(long, value_name = "DIR")]
    pub summary_dir: PathBuf,

    /// Run date recorded in the summary (ISO-8601; defaults to now)
    #[arg(long, value_name = "ISO", value_parser = parse_run_date)]
    pub run_date: Option<String>,

    /// Extra base directories for relative globs
    #[arg(
        long = "search-root",
        value_name = "DIR",
        env = "ACPW_SEARCH_ROOTS",
        value_delimiter = ',',
        default_value = DEFAULT_PLAN_ROOT
    )]
    pub search_roots: Vec<PathBuf>,
}

/// Append one entry to a summary manifest.
#[derive(Parser, Debug)]
#[command(about = "Append a plan's entry to a summary JSON file")]
pub struct AppendSummaryArgs {
    /// Summary JSON file (created when missing)
    #[arg(long, value_name = "PATH")]
    pub summary_json: PathBuf,

    /// Acceptance-criteria file the plan came from
    #[arg(long, value_name = "PATH")]
    pub input: String,

    /// Plan JSON file
    #[arg(long, value_name = "PATH")]
    pub plan: PathBuf,

    /// Generated Playwright test file
    #[arg(long, value_name = "PATH")]
    pub test: String,

    /// Run date for the summary (ISO-8601)
    #[arg(long, value_name = "ISO", value_parser = parse_run_date)]
    pub run_date: Option<String>,
}

/// Render a summary manifest as Markdown.
#[derive(Parser, Debug)]
#[command(about = "Render a summary JSON file as Markdown")]
pub struct MarkdownSummaryArgs {
    /// Summary JSON file to read
    #[arg(long, value_name = "PATH")]
    pub summary_json: PathBuf,

    /// Markdown file to write
    #[arg(long, value_name = "PATH")]
    pub summary_md: PathBuf,
}

/// Validate a single plan file.
#[derive(Parser, Debug)]
#[command(about = "Check a plan file against the plan schema")]
pub struct ValidatePlanArgs {
    /// Plan JSON file
    #[arg(value_name = "PLAN")]
    pub plan: PathBuf,

    /// Emit a machine-readable JSON report on stdout
    #[arg(long)]
    pub json: bool,
}

fn parse_run_date(raw: &str) -> Result<String, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|_| raw.to_string())
        .map_err(|err| format!("expected an ISO-8601 timestamp ({err})"))
}
