use super::{CommandResult, CommandSummary};
use crate::issues::{Issue, Severity};

pub fn finish(
    summary: CommandSummary,
    mut issues: Vec<Issue>,
    source_files_checked: usize,
    exit_on_errors: bool,
) -> CommandResult {
    issues.sort();

    let parse_error_count = issues
        .iter()
        .filter(|i| matches!(i, Issue::ParseError(_)))
        .count();

    let mut error_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count();

    let warning_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Warning)
        .count();

    if let CommandSummary::Init(ref summary) = summary
        && summary.error.is_some()
    {
        error_count += 1;
    }

    CommandResult {
        summary,
        error_count,
        warning_count,
        exit_on_errors,
        issues,
        parse_error_count,
        source_files_checked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cli::{args::OutputFormat, commands::CheckSummary},
        issues::ParseErrorIssue,
    };

    #[test]
    fn test_finish_counts_parse_errors() {
        let issues = vec![Issue::ParseError(ParseErrorIssue {
            file_path: "./broken.cpp".to_string(),
            error: "Failed to read file".to_string(),
        })];

        let result = finish(
            CommandSummary::Check(CheckSummary {
                format: OutputFormat::Text,
            }),
            issues,
            3,
            true,
        );

        assert_eq!(result.error_count, 1);
        assert_eq!(result.warning_count, 0);
        assert_eq!(result.parse_error_count, 1);
        assert_eq!(result.source_files_checked, 3);
    }
}
