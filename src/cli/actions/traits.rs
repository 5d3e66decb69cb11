//! Action trait definition.
//!
//! Actions convert Issues into Operations. Each Action can be implemented
//! for multiple Issue types, providing type-safe handling.

use std::collections::BTreeMap;

use anyhow::Result;

use super::operation::Operation;

/// Statistics from running an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionStats {
    /// Number of issues processed.
    pub processed: usize,
    /// Number of edits skipped (overlapping or stale).
    pub skipped: usize,
    /// Number of changes actually applied to files.
    pub changes_applied: usize,
    /// Number of files modified.
    pub files_modified: usize,
}

impl std::ops::AddAssign for ActionStats {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.changes_applied += other.changes_applied;
        self.files_modified += other.files_modified;
    }
}

/// Action trait - converts Issues into Operations and executes them.
///
/// ```ignore
/// if apply {
///     ReplaceCall::run(&issues)?;
/// } else {
///     ReplaceCall::preview(&issues);
/// }
/// ```
pub trait Action<I> {
    /// Convert issues to low-level operations.
    fn to_operations(issues: &[I]) -> Vec<Operation>;

    /// Execute the action (modify files).
    fn run(issues: &[I]) -> Result<ActionStats> {
        let ops = Self::to_operations(issues);
        execute_operations(&ops)
    }

    /// Preview the action (dry-run mode).
    fn preview(issues: &[I]) {
        let ops = Self::to_operations(issues);
        for op in &ops {
            op.preview();
        }
    }
}

/// Apply operations file by file.
///
/// A header shared by several translation units yields the same edit once
/// per unit; identical edits are applied once.
pub(crate) fn execute_operations(ops: &[Operation]) -> Result<ActionStats> {
    let mut ops_by_file: BTreeMap<&str, Vec<Operation>> = BTreeMap::new();
    for op in ops {
        let file_ops = ops_by_file.entry(op.edit.file_path.as_str()).or_default();
        if !file_ops.iter().any(|existing| existing.edit == op.edit) {
            file_ops.push(op.clone());
        }
    }

    let mut stats = ActionStats {
        processed: ops.len(),
        ..Default::default()
    };

    for (file_path, file_ops) in ops_by_file {
        let outcome = Operation::apply_to_file(file_path, &file_ops)?;
        stats.skipped += outcome.overlapping + outcome.stale;
        stats.changes_applied += outcome.applied;
        if outcome.applied > 0 {
            stats.files_modified += 1;
        }
    }

    Ok(stats)
}
