use std::{cmp::Reverse, fs};

use anyhow::{Context, Result};
use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::{FileEdit, SourceContext};

/// A replacement of one byte range, located for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub context: SourceContext,
    pub edit: FileEdit,
}

/// What happened to the operations of one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOutcome {
    pub applied: usize,
    pub overlapping: usize,
    pub stale: usize,
}

impl Operation {
    /// Print the change in cargo style with `-`/`+` lines.
    pub fn preview(&self) {
        let ctx = &self.context;
        let line = ctx.line();
        let col = ctx.col();
        let source_line = &ctx.source_line;

        println!("  {} {}:{}:{}", "-->".blue(), ctx.file_path(), line, col);
        println!("     {}", "|".blue());
        println!(
            " {:>3} {} {}",
            line.to_string().blue(),
            "|".blue(),
            source_line
        );

        let prefix: String = source_line.chars().take(col.saturating_sub(1)).collect();
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        println!(
            "     {} {:>padding$}{}",
            "|".blue(),
            "",
            "^".yellow(),
            padding = caret_padding
        );
        println!("  {} {}", "-".red().bold(), self.edit.original.red());
        println!("  {} {}", "+".green().bold(), self.edit.replacement.green());
        println!();
    }

    /// Apply the operations of a single file.
    ///
    /// Edits are taken in start order, outermost first; an edit overlapping
    /// an already accepted one is skipped, as is an edit whose original text
    /// no longer matches the file. Accepted edits are applied from the end
    /// of the file backwards so earlier offsets stay valid.
    pub fn apply_to_file(file_path: &str, ops: &[Operation]) -> Result<FileOutcome> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path))?;

        let (updated, outcome) = Self::apply_to_text(&content, ops);
        if outcome.applied > 0 {
            fs::write(file_path, updated)
                .with_context(|| format!("Failed to write file: {}", file_path))?;
        }
        Ok(outcome)
    }

    pub fn apply_to_text(content: &str, ops: &[Operation]) -> (String, FileOutcome) {
        let mut outcome = FileOutcome::default();

        let mut sorted: Vec<&FileEdit> = ops.iter().map(|op| &op.edit).collect();
        sorted.sort_by_key(|edit| (edit.start, Reverse(edit.end)));

        let mut accepted: Vec<&FileEdit> = Vec::new();
        for edit in sorted {
            if accepted.iter().any(|prev| prev.overlaps(edit)) {
                tracing::debug!(
                    file = %edit.file_path,
                    start = edit.start,
                    "skipping edit overlapping an earlier one"
                );
                outcome.overlapping += 1;
                continue;
            }
            if content.get(edit.start..edit.end) != Some(edit.original.as_str()) {
                tracing::debug!(
                    file = %edit.file_path,
                    start = edit.start,
                    "skipping edit whose original text changed"
                );
                outcome.stale += 1;
                continue;
            }
            accepted.push(edit);
        }

        let mut updated = content.to_string();
        for edit in accepted.iter().rev() {
            updated.replace_range(edit.start..edit.end, &edit.replacement);
        }
        outcome.applied = accepted.len();

        (updated, outcome)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::core::SourceLocation;

    fn op(content: &str, original: &str, replacement: &str) -> Operation {
        let start = content.find(original).unwrap();
        Operation {
            context: SourceContext::new(SourceLocation::new("main.cpp", 1, start + 1), content),
            edit: FileEdit {
                file_path: "main.cpp".to_string(),
                start,
                end: start + original.len(),
                original: original.to_string(),
                replacement: replacement.to_string(),
            },
        }
    }

    #[test]
    fn test_apply_two_edits() {
        let content = "double a = std::pow(x, 2); double b = std::pow(y, 4);";
        let ops = vec![
            op(content, "std::pow(y, 4)", "utils::pow<std::pow(y, 4)>(y)"),
            op(content, "std::pow(x, 2)", "utils::pow<std::pow(x, 2)>(x)"),
        ];

        let (updated, outcome) = Operation::apply_to_text(content, &ops);

        assert_eq!(
            updated,
            "double a = utils::pow<std::pow(x, 2)>(x); double b = utils::pow<std::pow(y, 4)>(y);"
        );
        assert_eq!(outcome.applied, 2);
    }

    #[test]
    fn test_overlapping_inner_edit_is_skipped() {
        let content = "double a = std::pow(std::pow(x, 2), 3);";
        let ops = vec![
            op(
                content,
                "std::pow(x, 2)",
                "utils::pow<std::pow(x, 2)>(x)",
            ),
            op(
                content,
                "std::pow(std::pow(x, 2), 3)",
                "utils::pow<std::pow(std::pow(x, 2), 3)>(std::pow(x, 2))",
            ),
        ];

        let (updated, outcome) = Operation::apply_to_text(content, &ops);

        assert_eq!(
            updated,
            "double a = utils::pow<std::pow(std::pow(x, 2), 3)>(std::pow(x, 2));"
        );
        assert_eq!(
            outcome,
            FileOutcome {
                applied: 1,
                overlapping: 1,
                stale: 0
            }
        );
    }

    #[test]
    fn test_stale_edit_is_skipped() {
        let content = "double a = std::pow(x, 2);";
        let mut stale = op(content, "std::pow(x, 2)", "utils::pow<std::pow(x, 2)>(x)");
        stale.edit.original = "std::pow(z, 2)".to_string();

        let (updated, outcome) = Operation::apply_to_text(content, &[stale]);

        assert_eq!(updated, content);
        assert_eq!(outcome.stale, 1);
        assert_eq!(outcome.applied, 0);
    }

    #[test]
    fn test_apply_to_file_writes_only_when_changed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.cpp");
        let content = "double y = std::pow(2.0, 3);\n";
        fs::write(&path, content).unwrap();

        let mut edit = op(content, "std::pow(2.0, 3)", "utils::pow<std::pow(2.0, 3)>(2.0)");
        edit.edit.file_path = path.to_string_lossy().to_string();
        let file_path = edit.edit.file_path.clone();

        let outcome = Operation::apply_to_file(&file_path, &[edit.clone()]).unwrap();
        assert_eq!(outcome.applied, 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "double y = utils::pow<std::pow(2.0, 3)>(2.0);\n"
        );

        // Second run finds the original text gone.
        let outcome = Operation::apply_to_file(&file_path, &[edit]).unwrap();
        assert_eq!(outcome.stale, 1);
    }
}
