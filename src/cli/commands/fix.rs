//! Fix command - Rewrite power calls with integer constant exponents.
//!
//! Each call `std::pow(b, N)` is replaced by `utils::pow<std::pow(b, N)>(b)`
//! (or the configured replacement).
//!
//! Use `--apply` to actually rewrite files (default is dry-run mode).

use std::collections::BTreeSet;

use anyhow::Result;

use super::super::{
    actions::{Action, ActionStats, ReplaceCall},
    args::FixCommand,
};
use super::{CommandResult, CommandSummary, FixSummary, helper::finish};
use crate::{
    core::CheckContext,
    issues::{ConstPowIssue, Issue},
    rules::check_const_pow_issues,
};

pub fn fix(cmd: FixCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let ctx = CheckContext::new(&args.common)?;
    let apply = args.apply;

    let mut issues: Vec<ConstPowIssue> = check_const_pow_issues(&ctx);
    issues.sort_by(|a, b| {
        (a.edit.file_path.as_str(), a.edit.start).cmp(&(b.edit.file_path.as_str(), b.edit.start))
    });

    let call_count = issues.len();
    let file_count = issues
        .iter()
        .map(|issue| issue.edit.file_path.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let stats = if apply && !issues.is_empty() {
        ReplaceCall::run(&issues)?
    } else {
        ActionStats::default()
    };

    let parse_errors: Vec<Issue> = ctx
        .parse_errors()
        .iter()
        .map(|i| Issue::ParseError(i.clone()))
        .collect();

    Ok(finish(
        CommandSummary::Fix(FixSummary {
            call_count,
            file_count,
            is_apply: apply,
            stats,
            issues,
        }),
        parse_errors,
        ctx.files.len(),
        true,
    ))
}
