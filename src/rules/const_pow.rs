//! Integer-constant exponent rule.
//!
//! A call `std::pow(base, exp)` whose exponent is an integer constant
//! expression is rewritten to `utils::pow<CALL>(base)`, where `CALL` is the
//! exact text of the original call and `base` the exact text of its first
//! argument.

use rayon::prelude::*;

use crate::{
    core::{
        CheckContext, SourceSpan,
        frontend::{SourceText, TranslationUnit},
        matcher::{Argument, CallPattern, PowCallMatch, find_pow_calls},
        semantic::FunctionRef,
    },
    diagnostics::Emitter,
    issues::ConstPowIssue,
};

/// What to match and what to rewrite it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    pub pattern: CallPattern,
    pub replacement: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            pattern: CallPattern::default(),
            replacement: "utils::pow".to_string(),
        }
    }
}

impl RewriteOptions {
    pub fn message(&self) -> String {
        const_pow_message(&self.pattern.target, &self.replacement)
    }
}

pub fn const_pow_message(target: &FunctionRef, replacement: &str) -> String {
    format!(
        "{} is called with integer constant expression. Use {} instead.",
        target.qualified_name(),
        replacement
    )
}

/// Evidence that a call's exponent is a constant of integer type.
#[derive(Debug, Clone, Copy)]
pub struct ConstantIntegerExponent<'m> {
    exponent: &'m Argument,
}

impl<'m> ConstantIntegerExponent<'m> {
    pub fn classify(call: &'m PowCallMatch) -> Option<Self> {
        let exponent = call.exponent();
        exponent
            .facts
            .is_integer_constant()
            .then_some(Self { exponent })
    }

    pub fn span(&self) -> SourceSpan {
        self.exponent.span
    }
}

/// A replacement of a whole call, anchored at its exponent. Spans refer to
/// the translation unit it was computed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedEdit {
    pub anchor: SourceSpan,
    pub range: SourceSpan,
    pub original: String,
    pub replacement: String,
}

pub fn build_replacement(function: &str, call_text: &str, base_text: &str) -> String {
    format!("{}<{}>({})", function, call_text, base_text)
}

/// Edit for `call` if its exponent qualifies.
pub fn suggest_edit(
    call: &PowCallMatch,
    sources: &impl SourceText,
    replacement: &str,
) -> Option<SuggestedEdit> {
    let exponent = ConstantIntegerExponent::classify(call)?;
    let call_text = sources.span_text(&call.call().span)?;
    let base_text = sources.span_text(&call.base().span)?;

    Some(SuggestedEdit {
        anchor: exponent.span().start_point(),
        range: call.call().span,
        original: call_text.to_string(),
        replacement: build_replacement(replacement, call_text, base_text),
    })
}

/// All issues of one translation unit, in source order.
pub fn analyze_translation_unit(
    unit: &TranslationUnit,
    options: &RewriteOptions,
    emitter: &Emitter,
) -> Vec<ConstPowIssue> {
    find_pow_calls(unit, &options.pattern)
        .filter_map(|call| suggest_edit(&call, &unit.sources, &options.replacement))
        .map(|edit| emitter.emit(edit, &unit.sources))
        .collect()
}

pub fn check_const_pow_issues(ctx: &CheckContext) -> Vec<ConstPowIssue> {
    let units = ctx.translation_units();
    let options = ctx.rewrite_options();
    let emitter = ctx.emitter();

    units
        .par_iter()
        .flat_map_iter(|(_, unit)| analyze_translation_unit(unit, options, emitter))
        .collect()
}
