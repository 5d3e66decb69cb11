//! ReplaceCall action.
//!
//! Rewrites `std::pow(b, N)` to the configured replacement.
//! Used by the `stdpow fix` command.

use super::operation::Operation;
use super::traits::Action;
use crate::issues::ConstPowIssue;

pub struct ReplaceCall;

impl Action<ConstPowIssue> for ReplaceCall {
    fn to_operations(issues: &[ConstPowIssue]) -> Vec<Operation> {
        issues
            .iter()
            .map(|issue| Operation {
                context: issue.context.clone(),
                edit: issue.edit.clone(),
            })
            .collect()
    }
}
