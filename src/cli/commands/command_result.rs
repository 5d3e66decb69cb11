use super::super::{actions::ActionStats, args::OutputFormat};
use crate::issues::{ConstPowIssue, Issue};

#[derive(Debug)]
pub enum CommandSummary {
    Check(CheckSummary),
    Fix(FixSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct CheckSummary {
    pub format: OutputFormat,
}

#[derive(Debug)]
pub struct FixSummary {
    /// Calls found, across all files.
    pub call_count: usize,
    pub file_count: usize,
    pub is_apply: bool,
    /// Populated only with `--apply`.
    pub stats: ActionStats,
    pub issues: Vec<ConstPowIssue>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
    pub error: Option<String>,
}

/// Result of running stdpow commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
    /// If true, exit code 1 should be returned when error_count > 0.
    pub exit_on_errors: bool,
    /// Issues to report, sorted by location.
    pub issues: Vec<Issue>,
    /// Number of files that failed to read or parse.
    pub parse_error_count: usize,
    /// Number of translation units that were checked.
    pub source_files_checked: usize,
}

impl CommandResult {
    /// A dry-run fix that found calls to rewrite.
    pub fn has_pending_work(&self) -> bool {
        matches!(
            &self.summary,
            CommandSummary::Fix(summary) if !summary.is_apply && summary.call_count > 0
        )
    }
}
