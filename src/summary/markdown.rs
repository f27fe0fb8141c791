//! Markdown rendering of the summary manifest.
use super::{load_summary, SummaryFile};
use crate::output::write_text;
use crate::runtime::Runtime;
use anyhow::Result;
use std::path::Path;

const NONE_PLACEHOLDER: &str = "- (none)\n";

pub fn render_summary_markdown(summary: &SummaryFile) -> String {
    let mut out = String::new();
    out.push_str("# Post-creation summary\n\n");
    out.push_str(&format!("- Run date: {}\n", summary.run_date));

    out.push_str("\n## Inputs: AC files\n");
    if summary.entries.is_empty() {
        out.push_str(NONE_PLACEHOLDER);
    }
    for entry in &summary.entries {
        out.push_str(&format!("- {}\n", entry.input));
    }

    out.push_str("\n## Outputs: Playwright test files\n");
    if summary.entries.is_empty() {
        out.push_str(NONE_PLACEHOLDER);
    }
    for entry in &summary.entries {
        out.push_str(&format!("- {}\n", entry.outputs.test));
    }

    out.push_str("\n## Required test hooks\n");
    if summary.entries.is_empty() {
        out.push_str(NONE_PLACEHOLDER);
    }
    for entry in &summary.entries {
        out.push_str(&format!("- {}\n", entry.outputs.test));
        for test in &entry.tests {
            out.push_str(&format!("  - {}\n", test.name));
            for hook in &test.required_test_hooks {
                out.push_str(&format!("    - {hook}\n"));
            }
        }
    }
    out
}

/// Render `summary_json` into `summary_md`. The JSON file is only read.
pub fn write_summary_markdown(
    runtime: &dyn Runtime,
    summary_json: &Path,
    summary_md: &Path,
) -> Result<()> {
    let summary = load_summary(runtime, summary_json)?;
    write_text(runtime, summary_md, &render_summary_markdown(&summary))
}
