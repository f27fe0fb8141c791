//! Required test hooks: the element identifiers a generated test depends on.
use crate::plan::Step;
use std::collections::HashSet;

/// Distinct step targets in first-seen order.
pub fn required_hooks(steps: &[Step]) -> Vec<String> {
    let mut seen = HashSet::new();
    steps
        .iter()
        .filter_map(Step::target)
        .filter(|target| seen.insert(*target))
        .map(str::to_string)
        .collect()
}
