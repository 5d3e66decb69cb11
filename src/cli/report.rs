//! Report formatting and printing utilities.
//!
//! Issues are displayed in cargo-style format, or as a JSON document with
//! `check --format json`.

use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use super::{
    actions::{Action, ReplaceCall},
    args::OutputFormat,
    commands::{CommandResult, CommandSummary, FixSummary, InitSummary},
};
use crate::config::CONFIG_FILE_NAME;
use crate::issues::{Issue, Report, ReportLocation, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues in cargo-style format to stdout.
pub fn report(issues: &[Issue]) {
    report_to(issues, &mut io::stdout().lock());
}

/// Print issues to a custom writer.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort();

    let max_line_width = calculate_max_line_width(&sorted);

    for issue in &sorted {
        print_issue(issue, writer, max_line_width);
    }

    print_summary(&sorted, writer);
}

/// Print a success message when no issues are found.
pub fn print_success(source_files: usize) {
    print_success_to(source_files, &mut io::stdout().lock());
}

pub fn print_success_to<W: Write>(source_files: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} source {} - no issues found",
            source_files,
            if source_files == 1 { "file" } else { "files" }
        )
        .green()
    );
}

/// Print a warning about files that could not be parsed.
pub fn print_parse_warning(count: usize, verbose: bool) {
    print_parse_warning_to(count, verbose, &mut io::stderr().lock());
}

pub fn print_parse_warning_to<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be parsed (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

// ============================================================
// Text output
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let loc = issue.location();
    let (file_path, line, col, source_line) = extract_location_info(&loc);

    let severity = issue.report_severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        issue.message(),
        issue.report_rule().to_string().dimmed().cyan()
    );

    if let Some(source_line) = source_line {
        let _ = writeln!(writer, "  {} {}:{}:{}", "-->".blue(), file_path, line, col);

        let caret_char = match severity {
            Severity::Error => "^".red(),
            Severity::Warning => "^".yellow(),
        };

        let _ = writeln!(
            writer,
            "{:>width$} {}",
            "",
            "|".blue(),
            width = max_line_width
        );
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );

        // col is 1-based
        let prefix: String = source_line.chars().take(col.saturating_sub(1)).collect();
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret_char,
            width = max_line_width,
            padding = caret_padding
        );
    } else {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), file_path);
    }

    if let Some(edit) = issue.fix() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "fix:".bold().green(),
            edit.replacement,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Warning)
        .count();
    let total_problems = total_errors + total_warnings;

    if total_problems > 0 {
        let _ = writeln!(
            writer,
            "{} {} problems ({} {}, {} {})",
            FAILURE_MARK.red(),
            total_problems,
            total_errors,
            if total_errors == 1 { "error" } else { "errors" }.red(),
            total_warnings,
            if total_warnings == 1 {
                "warning"
            } else {
                "warnings"
            }
            .yellow()
        );
    }
}

fn extract_location_info<'a>(
    loc: &'a ReportLocation<'a>,
) -> (&'a str, usize, usize, Option<&'a str>) {
    match loc {
        ReportLocation::Source(ctx) => (
            ctx.file_path(),
            ctx.line(),
            ctx.col(),
            Some(&ctx.source_line),
        ),
        ReportLocation::File { path } => (path, 0, 0, None),
    }
}

fn calculate_max_line_width(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter_map(|i| match i.location() {
            ReportLocation::Source(ctx) => Some(ctx.line()),
            ReportLocation::File { .. } => None,
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

// ============================================================
// JSON output
// ============================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    files_checked: usize,
    error_count: usize,
    warning_count: usize,
    issues: Vec<JsonIssue<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonIssue<'a> {
    rule: String,
    severity: String,
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<JsonFix<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFix<'a> {
    file: &'a str,
    start: usize,
    end: usize,
    original: &'a str,
    replacement: &'a str,
}

fn json_issue(issue: &Issue) -> JsonIssue<'_> {
    let (file, line, column) = match issue.location() {
        ReportLocation::Source(ctx) => (ctx.file_path(), Some(ctx.line()), Some(ctx.col())),
        ReportLocation::File { path } => (path, None, None),
    };
    JsonIssue {
        rule: issue.report_rule().to_string(),
        severity: issue.report_severity().to_string(),
        file,
        line,
        column,
        message: issue.message(),
        fix: issue.fix().map(|edit| JsonFix {
            file: &edit.file_path,
            start: edit.start,
            end: edit.end,
            original: &edit.original,
            replacement: &edit.replacement,
        }),
    }
}

pub fn report_json_to<W: Write>(result: &CommandResult, writer: &mut W) -> io::Result<()> {
    let report = JsonReport {
        files_checked: result.source_files_checked,
        error_count: result.error_count,
        warning_count: result.warning_count,
        issues: result.issues.iter().map(json_issue).collect(),
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)
}

// ============================================================
// Command output
// ============================================================

pub fn print(result: &CommandResult, verbose: bool) {
    match &result.summary {
        CommandSummary::Check(summary) if summary.format == OutputFormat::Json => {
            let _ = report_json_to(result, &mut io::stdout().lock());
            return;
        }
        CommandSummary::Check(_) => {
            report(&result.issues);
            if result.issues.is_empty() {
                print_success(result.source_files_checked);
            }
        }
        CommandSummary::Fix(summary) => {
            print_fix(summary);
            report(&result.issues);
            if summary.call_count == 0 && result.issues.is_empty() {
                print_success(result.source_files_checked);
            }
        }
        CommandSummary::Init(summary) => {
            print_init(summary);
        }
    }

    print_parse_warning(result.parse_error_count, verbose);
}

fn print_fix(summary: &FixSummary) {
    if summary.call_count == 0 {
        return;
    }

    if summary.is_apply {
        let stats = &summary.stats;
        println!(
            "{} {} call(s) in {} file(s).",
            "Rewrote".green().bold(),
            stats.changes_applied,
            stats.files_modified
        );
        if stats.skipped > 0 {
            println!(
                "  - skipped: {} overlapping or outdated edit(s)",
                stats.skipped
            );
        }
    } else {
        ReplaceCall::preview(&summary.issues);
        println!(
            "{} {} call(s) in {} file(s).",
            "Would rewrite".yellow().bold(),
            summary.call_count,
            summary.file_count
        );
        println!("Run with {} to rewrite these calls.", "--apply".cyan());
    }
}

fn print_init(summary: &InitSummary) {
    if summary.created {
        println!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else if let Some(error) = &summary.error {
        eprintln!("{} {}", "error:".bold().red(), error);
    }
}

// ============================================================
// Tests
// ============================================================
