use anyhow::Result;

use super::super::args::CheckCommand;
use super::{CheckSummary, CommandResult, CommandSummary, helper::finish};
use crate::{core::CheckContext, issues::Issue, rules::check_const_pow_issues};

pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let ctx = CheckContext::new(&args.common)?;

    let mut all_issues: Vec<Issue> = check_const_pow_issues(&ctx)
        .into_iter()
        .map(Issue::ConstPow)
        .collect();

    let parse_errors = ctx.parse_errors();
    all_issues.extend(parse_errors.iter().map(|i| Issue::ParseError(i.clone())));

    Ok(finish(
        CommandSummary::Check(CheckSummary {
            format: args.format,
        }),
        all_issues,
        ctx.files.len(),
        true,
    ))
}
