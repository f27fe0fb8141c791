//! Command entry points. Each one receives the runtime it reads and writes
//! through, and reports progress on stdout.
use crate::cli::{
    AppendSummaryArgs, Command, GenerateTestsArgs, MarkdownSummaryArgs, ValidatePlanArgs,
};
use crate::error::{PlanError, ResolveError};
use crate::output::{display_path, write_text};
use crate::plan::{load_plan, ValidationIssue};
use crate::resolve::{has_hidden_segment, is_glob, is_recursive_glob, resolve_input};
use crate::runtime::{lexical_absolute, Runtime};
use crate::summary::markdown::write_summary_markdown;
use crate::summary::{append_entry, current_run_date, AppendRequest, SummaryTest};
use crate::translate::translate_suite;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const SUMMARY_STEM: &str = "post-creation-summary";

pub fn run(runtime: &dyn Runtime, command: Command) -> Result<()> {
    match command {
        Command::GenerateTests(args) => run_generate_tests(runtime, &args),
        Command::AppendJsonSummaryEntry(args) => run_append_summary(runtime, &args),
        Command::CreateMarkdownSummary(args) => run_markdown_summary(runtime, &args),
        Command::ValidatePlan(args) => run_validate_plan(runtime, &args),
    }
}

/// Summary JSON and Markdown paths for one run, e.g.
/// `post-creation-summary-2026-01-28T14-03-52Z.json`.
pub fn summary_paths(summary_dir: &Path, run_date: &str) -> (PathBuf, PathBuf) {
    let stamp = run_date.replace(':', "-");
    (
        summary_dir.join(format!("{SUMMARY_STEM}-{stamp}.json")),
        summary_dir.join(format!("{SUMMARY_STEM}-{stamp}.md")),
    )
}

pub fn run_generate_tests(runtime: &dyn Runtime, args: &GenerateTestsArgs) -> Result<()> {
    let cwd = runtime
        .current_dir()
        .context("determine working directory")?;
    let plans = resolve_plan_inputs(runtime, &cwd, &args.inputs, &args.search_roots)?;

    let run_date = args
        .run_date
        .clone()
        .unwrap_or_else(|| current_run_date(runtime));
    let (summary_json, summary_md) = summary_paths(&args.summary_dir, &run_date);

    for plan_path in &plans {
        tracing::info!(plan = %plan_path.display(), "processing plan");
        let suite = load_plan(runtime, plan_path)?;
        let generated = translate_suite(&suite)?;
        let test_path = args.tests_dir.join(&generated.file_name);
        write_text(runtime, &test_path, &generated.text)?;

        let plan_display = display_path(plan_path, Some(&cwd));
        let test_display = test_path.display().to_string();
        let request = AppendRequest {
            summary_path: &summary_json,
            input: &suite.source.path,
            plan_path: &plan_display,
            test_path: &test_display,
            run_date: Some(&run_date),
        };
        let tests = generated.tests.iter().map(SummaryTest::from).collect();
        append_entry(runtime, &request, tests).context("append summary entry")?;
        write_summary_markdown(runtime, &summary_json, &summary_md)
            .context("render summary markdown")?;

        println!(
            "Generated {} from {} ({})",
            display_path(&test_path, Some(&cwd)),
            display_path(plan_path, Some(&cwd)),
            generated.source_ref
        );
    }

    println!(
        "Wrote summary {} and {}",
        display_path(&summary_json, Some(&cwd)),
        display_path(&summary_md, Some(&cwd))
    );
    Ok(())
}

/// Turn raw CLI inputs into the deduplicated list of plan files, sorted by
/// absolute path whatever order the arguments came in.
///
/// Every rejected input is reported before failing. A glob that matches no
/// file only warns, as long as some input remains.
fn resolve_plan_inputs(
    runtime: &dyn Runtime,
    cwd: &Path,
    inputs: &[String],
    search_roots: &[PathBuf],
) -> Result<Vec<PathBuf>> {
    let mut problems = Vec::new();
    let mut plans = Vec::new();
    let mut seen = HashSet::new();
    let mut push_unique = |path: PathBuf| {
        let key = lexical_absolute(cwd, &path);
        if seen.insert(key.clone()) {
            plans.push((key, path));
        } else {
            tracing::info!(path = %path.display(), "skipping duplicate input");
        }
    };

    for input in inputs {
        if is_recursive_glob(input) {
            problems.push(
                ResolveError::RecursiveGlob {
                    input: input.clone(),
                }
                .to_string(),
            );
            continue;
        }
        if has_hidden_segment(input) {
            problems.push(
                ResolveError::HiddenInput {
                    input: input.clone(),
                }
                .to_string(),
            );
            continue;
        }
        let candidates = match resolve_input(runtime, input, search_roots) {
            Ok(candidates) => candidates,
            Err(err) => {
                problems.push(err.to_string());
                continue;
            }
        };
        if is_glob(input) {
            let files: Vec<PathBuf> = candidates
                .into_iter()
                .filter(|path| runtime.is_file(path))
                .collect();
            if files.is_empty() {
                eprintln!("warning: no plan files matched {input}");
                tracing::warn!(input = input.as_str(), "glob matched nothing");
            }
            files.into_iter().for_each(&mut push_unique);
        } else {
            let path = PathBuf::from(input);
            if runtime.is_file(&path) {
                push_unique(path);
            } else {
                problems.push(format!("input not found: {input}"));
            }
        }
    }

    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("error: {problem}");
        }
        return Err(anyhow!("{} input(s) could not be used", problems.len()));
    }
    if plans.is_empty() {
        return Err(anyhow!("Missing inputs: provide at least one plan file or glob"));
    }
    plans.sort_by(|(left, _), (right, _)| left.cmp(right));
    Ok(plans.into_iter().map(|(_, path)| path).collect())
}

pub fn run_append_summary(runtime: &dyn Runtime, args: &AppendSummaryArgs) -> Result<()> {
    let suite = load_plan(runtime, &args.plan)?;
    let plan_display = args.plan.display().to_string();
    let request = AppendRequest {
        summary_path: &args.summary_json,
        input: &args.input,
        plan_path: &plan_display,
        test_path: &args.test,
        run_date: args.run_date.as_deref(),
    };
    let summary = append_entry(runtime, &request, SummaryTest::for_suite(&suite))?;
    println!(
        "Appended entry {} to {}",
        summary.entries.len(),
        args.summary_json.display()
    );
    Ok(())
}

pub fn run_markdown_summary(runtime: &dyn Runtime, args: &MarkdownSummaryArgs) -> Result<()> {
    write_summary_markdown(runtime, &args.summary_json, &args.summary_md)?;
    println!("Wrote {}", args.summary_md.display());
    Ok(())
}

#[derive(Serialize)]
struct ValidationReport<'a> {
    path: String,
    valid: bool,
    errors: &'a [ValidationIssue],
}

pub fn run_validate_plan(runtime: &dyn Runtime, args: &ValidatePlanArgs) -> Result<()> {
    let result = load_plan(runtime, &args.plan);
    if args.json {
        let issues = match &result {
            Err(PlanError::Invalid { issues, .. }) => issues.as_slice(),
            _ => &[],
        };
        if !matches!(result, Err(PlanError::Read { .. } | PlanError::Parse { .. })) {
            let report = ValidationReport {
                path: args.plan.display().to_string(),
                valid: result.is_ok(),
                errors: issues,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("serialize validation report")?
            );
        }
    }
    let suite = result?;
    if !args.json {
        println!(
            "Plan is valid: {} ({} tests)",
            args.plan.display(),
            suite.tests.len()
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
