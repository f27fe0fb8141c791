use crate::runtime::Runtime;
use anyhow::{Context, Result};
use std::path::Path;

pub fn write_text(runtime: &dyn Runtime, path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            runtime
                .create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    runtime
        .write(path, text)
        .with_context(|| format!("write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote file");
    Ok(())
}

/// Pretty-printed JSON with a trailing newline.
pub fn write_json<T: serde::Serialize>(runtime: &dyn Runtime, path: &Path, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value).context("serialize JSON")?;
    text.push('\n');
    write_text(runtime, path, &text)
}

/// `path` relative to `base` when it lives below it, for progress output.
pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}
