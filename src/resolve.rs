//! Single-level glob expansion for plan inputs.
//!
//! Only `*` inside one path segment is supported. `**` is rejected up front,
//! and entries whose name starts with `.` never match a wildcard.
use crate::error::ResolveError;
use crate::runtime::Runtime;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Extra base directory tried for relative globs, next to the working directory.
pub const DEFAULT_PLAN_ROOT: &str = "skills/ac-to-playwright/artifacts/plans";

/// Matcher for one glob segment such as `sample-*.json`.
#[derive(Debug, Clone)]
pub struct SegmentPattern {
    regex: Regex,
}

impl SegmentPattern {
    pub fn new(segment: &str) -> Result<Self, ResolveError> {
        let body = segment
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{body}$")).map_err(|source| ResolveError::Pattern {
            segment: segment.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

pub fn is_glob(input: &str) -> bool {
    input.contains('*')
}

pub fn is_recursive_glob(input: &str) -> bool {
    input.contains("**")
}

/// True when any `/`- or `\`-separated segment starts with `.`, other than the
/// traversal markers `.` and `..`.
pub fn has_hidden_segment(path: &str) -> bool {
    path.split(['/', '\\'])
        .any(|segment| segment.starts_with('.') && segment != "." && segment != "..")
}

/// Expand `input` into candidate paths.
///
/// Inputs without `*` come back unchanged. Relative globs are expanded against
/// the working directory and every search root that exists as a directory;
/// absolute globs only against their own root. Results are absolute, sorted,
/// deduplicated, and free of hidden segments below their base. Whether each
/// candidate is a file is left to the caller.
pub fn resolve_input(
    runtime: &dyn Runtime,
    input: &str,
    search_roots: &[PathBuf],
) -> Result<Vec<PathBuf>, ResolveError> {
    if !is_glob(input) {
        return Ok(vec![PathBuf::from(input)]);
    }
    if is_recursive_glob(input) {
        return Err(ResolveError::RecursiveGlob {
            input: input.to_string(),
        });
    }

    let path = Path::new(input);
    let mut root = PathBuf::new();
    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => root.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => segments.push("..".to_string()),
            Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
        }
    }

    let bases = if path.is_absolute() {
        vec![root]
    } else {
        let cwd = runtime.current_dir().map_err(ResolveError::WorkingDir)?;
        let mut bases = vec![cwd.clone()];
        for search_root in search_roots {
            let candidate = if search_root.is_absolute() {
                search_root.clone()
            } else {
                cwd.join(search_root)
            };
            if runtime.is_dir(&candidate) && !bases.contains(&candidate) {
                bases.push(candidate);
            }
        }
        bases
    };

    let mut matches = BTreeSet::new();
    for base in &bases {
        for candidate in expand_from(runtime, base, &segments)? {
            let below_base = candidate
                .strip_prefix(base)
                .unwrap_or(candidate.as_path())
                .to_string_lossy()
                .into_owned();
            if !has_hidden_segment(&below_base) {
                matches.insert(candidate);
            }
        }
    }
    tracing::debug!(input, count = matches.len(), "expanded glob");
    Ok(matches.into_iter().collect())
}

fn expand_from(
    runtime: &dyn Runtime,
    base: &Path,
    segments: &[String],
) -> Result<Vec<PathBuf>, ResolveError> {
    let mut candidates = vec![base.to_path_buf()];
    for segment in segments {
        let mut next = BTreeSet::new();
        if is_glob(segment) {
            let pattern = SegmentPattern::new(segment)?;
            for dir in &candidates {
                if !runtime.is_dir(dir) {
                    continue;
                }
                let Ok(names) = runtime.read_dir(dir) else {
                    continue;
                };
                for name in names {
                    if !name.starts_with('.') && pattern.matches(&name) {
                        next.insert(dir.join(name));
                    }
                }
            }
        } else {
            for dir in &candidates {
                next.insert(dir.join(segment));
            }
        }
        tracing::debug!(segment = segment.as_str(), count = next.len(), "expanded segment");
        candidates = next.into_iter().collect();
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryRuntime;

    fn default_roots() -> Vec<PathBuf> {
        vec![PathBuf::from(DEFAULT_PLAN_ROOT)]
    }

    #[test]
    fn segment_pattern_escapes_literals() {
        let pattern = SegmentPattern::new("sample-*.json").expect("pattern");
        assert!(pattern.matches("sample-a.json"));
        assert!(pattern.matches("sample-.json"));
        assert!(!pattern.matches("sample-a.jsonx"));
        assert!(!pattern.matches("sample-aXjson"));
        assert!(!pattern.matches("other-sample-a.json"));

        let brackets = SegmentPattern::new("[v1]*(x)").expect("pattern");
        assert!(brackets.matches("[v1]-draft(x)"));
        assert!(!brackets.matches("v-draft(x)"));
    }

    #[test]
    fn hidden_segments_cover_both_separators() {
        assert!(has_hidden_segment(".git/config"));
        assert!(has_hidden_segment("plans/.hidden.json"));
        assert!(has_hidden_segment("/abs/.cache/plan.json"));
        assert!(has_hidden_segment(r"C:\work\.hidden\plan.json"));
        assert!(!has_hidden_segment("./plans/a.json"));
        assert!(!has_hidden_segment("../plans/a.json"));
        assert!(!has_hidden_segment(r"..\plans\a.json"));
        assert!(!has_hidden_segment("/abs/plans/a.json"));
    }

    #[test]
    fn plain_input_is_returned_unchanged() {
        let runtime = MemoryRuntime::new();
        let resolved =
            resolve_input(&runtime, "plans/missing.json", &default_roots()).expect("resolve");
        assert_eq!(resolved, vec![PathBuf::from("plans/missing.json")]);
    }

    #[test]
    fn recursive_glob_is_rejected_with_the_input() {
        let runtime = MemoryRuntime::new();
        let err = resolve_input(&runtime, "plans/**/a.json", &default_roots()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "recursive glob is not supported: plans/**/a.json"
        );
        let err = resolve_input(&runtime, "**", &default_roots()).unwrap_err();
        assert!(matches!(err, ResolveError::RecursiveGlob { input } if input == "**"));
    }

    #[test]
    fn hidden_directories_are_skipped() {
        let runtime = MemoryRuntime::new();
        runtime.add_file(".hidden/x.json", "{}");
        runtime.add_file("visible/x.json", "{}");

        let resolved = resolve_input(&runtime, "*/x.json", &[]).expect("resolve");
        assert_eq!(resolved, vec![PathBuf::from("/work/visible/x.json")]);
    }

    #[test]
    fn hidden_files_do_not_match_wildcards() {
        let runtime = MemoryRuntime::new();
        runtime.add_file("plans/.draft.json", "{}");
        runtime.add_file("plans/b.json", "{}");
        runtime.add_file("plans/a.json", "{}");

        let resolved = resolve_input(&runtime, "plans/*.json", &[]).expect("resolve");
        assert_eq!(
            resolved,
            vec![
                PathBuf::from("/work/plans/a.json"),
                PathBuf::from("/work/plans/b.json")
            ]
        );
    }

    #[test]
    fn missing_or_file_bases_contribute_nothing() {
        let runtime = MemoryRuntime::new();
        runtime.add_file("plans", "not a directory");
        let resolved = resolve_input(&runtime, "plans/*.json", &[]).expect("resolve");
        assert!(resolved.is_empty());
        let resolved = resolve_input(&runtime, "nowhere/*/a.json", &[]).expect("resolve");
        assert!(resolved.is_empty());
        runtime.add_dir("empty");
        let resolved = resolve_input(&runtime, "empty/*.json", &[]).expect("resolve");
        assert!(resolved.is_empty());
    }

    #[test]
    fn literal_segments_join_every_candidate() {
        let runtime = MemoryRuntime::new();
        runtime.add_file("suites/a/plan.json", "{}");
        runtime.add_file("suites/b/notes.md", "");

        let resolved = resolve_input(&runtime, "suites/*/plan.json", &[]).expect("resolve");
        assert_eq!(
            resolved,
            vec![
                PathBuf::from("/work/suites/a/plan.json"),
                PathBuf::from("/work/suites/b/plan.json")
            ]
        );
    }

    #[test]
    fn default_plan_root_is_searched_alongside_the_working_directory() {
        let runtime = MemoryRuntime::new();
        runtime.add_file(
            "skills/ac-to-playwright/artifacts/plans/tests/plans/sample-a.json",
            "{}",
        );
        runtime.add_file("tests/plan-old/notes.md", "");

        let resolved =
            resolve_input(&runtime, "tests/plan*/sample-*.json", &default_roots()).expect("resolve");
        assert_eq!(
            resolved,
            vec![PathBuf::from(
                "/work/skills/ac-to-playwright/artifacts/plans/tests/plans/sample-a.json"
            )]
        );
    }

    #[test]
    fn matches_from_every_base_are_merged_and_sorted() {
        let runtime = MemoryRuntime::new();
        runtime.add_file(
            "skills/ac-to-playwright/artifacts/plans/tests/plans/sample-a.json",
            "{}",
        );
        runtime.add_file("tests/plan-old/sample-b.json", "{}");

        let resolved =
            resolve_input(&runtime, "tests/plan*/sample-*.json", &default_roots()).expect("resolve");
        assert_eq!(
            resolved,
            vec![
                PathBuf::from(
                    "/work/skills/ac-to-playwright/artifacts/plans/tests/plans/sample-a.json"
                ),
                PathBuf::from("/work/tests/plan-old/sample-b.json"),
            ]
        );
    }

    #[test]
    fn absolute_globs_ignore_search_roots() {
        let runtime = MemoryRuntime::new();
        runtime.add_file("/data/plans/a.json", "{}");
        runtime.add_file(
            "skills/ac-to-playwright/artifacts/plans/data/plans/b.json",
            "{}",
        );

        let resolved =
            resolve_input(&runtime, "/data/plans/*.json", &default_roots()).expect("resolve");
        assert_eq!(resolved, vec![PathBuf::from("/data/plans/a.json")]);
    }

    #[test]
    fn parent_and_current_dir_markers_are_kept_as_traversal() {
        let runtime = MemoryRuntime::new();
        runtime.add_file("/shared/plans/a.json", "{}");

        let resolved = resolve_input(&runtime, "./../shared/plans/*.json", &[]).expect("resolve");
        assert_eq!(resolved.len(), 1);
        assert!(runtime.is_file(&resolved[0]));
    }
}
