use std::process::ExitCode;

use super::commands::CommandResult;

/// Exit status for CLI commands, following common conventions for linter tools.
///
/// - `Success` (0): Command completed; warnings alone do not fail a check
/// - `Failure` (1): Files could not be parsed, or a dry-run fix has work to do
/// - `Error` (2): Command failed due to internal error (config error, I/O, etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

impl From<&CommandResult> for ExitStatus {
    fn from(result: &CommandResult) -> Self {
        if (result.exit_on_errors && result.error_count > 0) || result.has_pending_work() {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{
        actions::ActionStats,
        args::OutputFormat,
        commands::{CheckSummary, CommandSummary, FixSummary},
    };

    fn result(summary: CommandSummary, error_count: usize) -> CommandResult {
        CommandResult {
            summary,
            error_count,
            warning_count: 0,
            exit_on_errors: true,
            issues: Vec::new(),
            parse_error_count: error_count,
            source_files_checked: 1,
        }
    }

    fn fix_summary(is_apply: bool, call_count: usize) -> CommandSummary {
        CommandSummary::Fix(FixSummary {
            call_count,
            file_count: 1,
            is_apply,
            stats: ActionStats::default(),
            issues: Vec::new(),
        })
    }

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::from(ExitStatus::Success), ExitCode::from(0));
        assert_eq!(ExitCode::from(ExitStatus::Failure), ExitCode::from(1));
        assert_eq!(ExitCode::from(ExitStatus::Error), ExitCode::from(2));
    }

    #[test]
    fn check_fails_only_on_errors() {
        let check = || {
            CommandSummary::Check(CheckSummary {
                format: OutputFormat::Text,
            })
        };
        assert_eq!(ExitStatus::from(&result(check(), 0)), ExitStatus::Success);
        assert_eq!(ExitStatus::from(&result(check(), 1)), ExitStatus::Failure);
    }

    #[test]
    fn dry_run_fix_with_pending_calls_fails() {
        assert_eq!(
            ExitStatus::from(&result(fix_summary(false, 2), 0)),
            ExitStatus::Failure
        );
        assert_eq!(
            ExitStatus::from(&result(fix_summary(true, 2), 0)),
            ExitStatus::Success
        );
        assert_eq!(
            ExitStatus::from(&result(fix_summary(false, 0), 0)),
            ExitStatus::Success
        );
    }
}
