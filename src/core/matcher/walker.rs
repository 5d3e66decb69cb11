//! Pre-order traversal of a translation unit yielding the calls that match
//! a [`CallPattern`], in source order.
//!
//! The traversal keeps the [`Environment`] in step with the cursor, so each
//! call is resolved against exactly the declarations visible at its
//! position.

use tree_sitter::{Node, TreeCursor};

use super::{
    pattern::CallPattern,
    record::{Argument, CallSite, Callee, PowCallMatch},
};
use crate::core::{
    frontend::TranslationUnit,
    semantic::{
        ConstEvaluator, Environment, callee_name, declarations, resolves_to,
        syntax::{node_text, significant_children},
    },
};

enum WalkState {
    Enter,
    Leave,
    Done,
}

pub struct PowCallMatches<'t> {
    unit: &'t TranslationUnit,
    pattern: &'t CallPattern,
    env: Environment,
    cursor: TreeCursor<'t>,
    state: WalkState,
    /// Whether each node on the current path opened a scope.
    scoped: Vec<bool>,
    /// Nesting depth of template argument lists around the cursor.
    template_args: usize,
}

/// All calls in `unit` matching `pattern`.
pub fn find_pow_calls<'t>(unit: &'t TranslationUnit, pattern: &'t CallPattern) -> PowCallMatches<'t> {
    PowCallMatches {
        unit,
        pattern,
        env: Environment::new(),
        cursor: unit.tree.walk(),
        state: WalkState::Enter,
        scoped: Vec::new(),
        template_args: 0,
    }
}

impl<'t> Iterator for PowCallMatches<'t> {
    type Item = PowCallMatch;

    fn next(&mut self) -> Option<PowCallMatch> {
        loop {
            match self.state {
                WalkState::Done => return None,
                WalkState::Enter => {
                    let node = self.cursor.node();
                    let found = self.enter(node);
                    self.state = if self.cursor.goto_first_child() {
                        WalkState::Enter
                    } else {
                        WalkState::Leave
                    };
                    if found.is_some() {
                        return found;
                    }
                }
                WalkState::Leave => {
                    let node = self.cursor.node();
                    self.leave(node);
                    self.state = if self.cursor.goto_next_sibling() {
                        WalkState::Enter
                    } else if self.cursor.goto_parent() {
                        WalkState::Leave
                    } else {
                        WalkState::Done
                    };
                }
            }
        }
    }
}

impl<'t> PowCallMatches<'t> {
    fn enter(&mut self, node: Node<'t>) -> Option<PowCallMatch> {
        let src = self.unit.text();
        let pushed = declarations::enter_scope(&mut self.env, node, src);
        self.scoped.push(pushed);
        declarations::declare_on_enter(&mut self.env, node, src);
        declarations::declare_range_variable(&mut self.env, node, src);

        match node.kind() {
            "template_argument_list" => {
                self.template_args += 1;
                None
            }
            "call_expression" | "cast_expression" => self.match_call(node),
            _ => None,
        }
    }

    fn leave(&mut self, node: Node<'t>) {
        let src = self.unit.text();
        declarations::declare_on_leave(&mut self.env, node, src);
        if node.kind() == "template_argument_list" {
            self.template_args = self.template_args.saturating_sub(1);
        }
        if self.scoped.pop() == Some(true) {
            self.env.pop();
        }
    }

    fn match_call(&self, node: Node<'t>) -> Option<PowCallMatch> {
        let src = self.unit.text();
        let target = &self.pattern.target;
        let (function, args) = call_parts(node)?;
        let name = callee_name(function, src)?;
        if name.name != target.name {
            return None;
        }

        let written = node_text(function, src);
        if self.template_args > 0 {
            // Template arguments are constant-evaluated; nothing to rewrite there.
            tracing::debug!(callee = written, "skipping call inside template arguments");
            return None;
        }
        if !resolves_to(&self.env, &name, target) {
            tracing::debug!(
                callee = written,
                "callee does not resolve to {}",
                target.qualified_name()
            );
            return None;
        }

        if args.len() != 2 {
            tracing::debug!(callee = written, arity = args.len(), "skipping call with unexpected arity");
            return None;
        }

        let sources = &self.unit.sources;
        if self.pattern.main_file_only && !sources.is_in_main_file(node.start_byte()) {
            tracing::debug!(callee = written, "skipping call outside the main file");
            return None;
        }
        let Some(span) = sources.span_for(node.byte_range()) else {
            tracing::debug!(callee = written, "call spans more than one file");
            return None;
        };

        let evaluator = ConstEvaluator::new(&self.env);
        let arguments = args
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                Some(Argument {
                    index,
                    span: sources.span_for(arg.byte_range())?,
                    facts: evaluator.evaluate(*arg, src),
                })
            })
            .collect::<Option<Vec<_>>>()?;

        PowCallMatch::new(CallSite {
            span,
            callee: Callee {
                namespace: target.namespace.clone(),
                name: target.name.clone(),
                written: written.to_string(),
            },
            arguments,
        })
    }
}

/// Callee and arguments of a call. `(std::pow)(x, 2)` parses as a C-style
/// cast of the comma expression `(x, 2)`, so its arguments are the operands
/// of that comma chain.
fn call_parts(node: Node<'_>) -> Option<(Node<'_>, Vec<Node<'_>>)> {
    match node.kind() {
        "call_expression" => {
            let function = node.child_by_field_name("function")?;
            let args = significant_children(node.child_by_field_name("arguments")?);
            Some((function, args))
        }
        "cast_expression" => {
            let descriptor = node.child_by_field_name("type")?;
            if descriptor.child_by_field_name("declarator").is_some()
                || significant_children(descriptor).len() != 1
            {
                return None;
            }
            let function = descriptor.child_by_field_name("type")?;
            let value = node.child_by_field_name("value")?;
            if value.kind() != "parenthesized_expression" {
                return None;
            }
            let mut args = Vec::new();
            let mut rest = significant_children(value).into_iter().next()?;
            while rest.kind() == "comma_expression" {
                args.push(rest.child_by_field_name("left")?);
                rest = rest.child_by_field_name("right")?;
            }
            args.push(rest);
            Some((function, args))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::core::{frontend::SourceText, semantic::StaticType};

    fn unit(code: &str) -> TranslationUnit {
        TranslationUnit::from_source(Path::new("main.cpp"), code, &[]).unwrap()
    }

    fn matches(code: &str) -> Vec<PowCallMatch> {
        let unit = unit(code);
        let pattern = CallPattern::default();
        find_pow_calls(&unit, &pattern).collect()
    }

    /// `(call text, exponent is integer constant)` for each match.
    fn summary(code: &str) -> Vec<(String, bool)> {
        let unit = unit(code);
        let pattern = CallPattern::default();
        find_pow_calls(&unit, &pattern)
            .map(|m| {
                let text = unit.sources.span_text(&m.call().span).unwrap().to_string();
                (text, m.exponent().facts.is_integer_constant())
            })
            .collect()
    }

    #[test]
    fn test_qualified_call_is_matched() {
        let found = matches("#include <cmath>\ndouble y = std::pow(2.0, 3);\n");
        assert_eq!(found.len(), 1);
        let m = &found[0];
        assert_eq!(m.callee().qualified_name(), "std::pow");
        assert_eq!(m.callee().written, "std::pow");
        assert_eq!(m.base().facts.ty, StaticType::Floating);
        assert!(m.exponent().facts.is_integer_constant());
        assert_eq!(m.base().index, 0);
        assert_eq!(m.exponent().index, 1);
    }

    #[test]
    fn test_spans_are_exact() {
        let code = "double y = std::pow( 2.0 , /* e */ 3 );\n";
        let unit = unit(code);
        let pattern = CallPattern::default();
        let found: Vec<_> = find_pow_calls(&unit, &pattern).collect();

        assert_eq!(
            unit.sources.span_text(&found[0].call().span),
            Some("std::pow( 2.0 , /* e */ 3 )")
        );
        assert_eq!(unit.sources.span_text(&found[0].base().span), Some("2.0"));
        assert_eq!(unit.sources.span_text(&found[0].exponent().span), Some("3"));
    }

    #[test]
    fn test_matches_come_in_source_order() {
        let found = summary(
            "double a = std::pow(2.0, 2);\n\
             double b = std::pow(3.0, 3);\n",
        );
        assert_eq!(
            found,
            vec![
                ("std::pow(2.0, 2)".to_string(), true),
                ("std::pow(3.0, 3)".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_runtime_exponent_is_matched_but_not_constant() {
        let found = summary("double f(int n) { return std::pow(2.0, n); }\n");
        assert_eq!(found, vec![("std::pow(2.0, n)".to_string(), false)]);
    }

    #[test]
    fn test_floating_exponent_is_not_integer() {
        let found = summary("double y = std::pow(2.0, 2.0);\n");
        assert_eq!(found, vec![("std::pow(2.0, 2.0)".to_string(), false)]);
    }

    #[test]
    fn test_constant_variables_are_seen_in_order() {
        let found = summary(
            "constexpr int N = 3;\n\
             double a = std::pow(2.0, N);\n\
             void f() { int N = 4; double b = std::pow(2.0, N); }\n",
        );
        assert_eq!(
            found,
            vec![
                ("std::pow(2.0, N)".to_string(), true),
                ("std::pow(2.0, N)".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_template_parameter_is_constant() {
        let found = summary("template <int N> double f(double x) { return std::pow(x, N); }\n");
        assert_eq!(found, vec![("std::pow(x, N)".to_string(), true)]);
    }

    #[test]
    fn test_user_pow_is_not_matched() {
        let found = summary(
            "namespace mylib { double pow(double, int); }\n\
             double a = mylib::pow(2.0, 3);\n",
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_unqualified_needs_using() {
        assert!(summary("double a = pow(2.0, 3);\n").is_empty());
        assert_eq!(
            summary("using namespace std;\ndouble a = pow(2.0, 3);\n").len(),
            1
        );
        assert_eq!(
            summary("void f() { using std::pow; double a = pow(2.0, 3); }\n").len(),
            1
        );
    }

    #[test]
    fn test_namespace_alias_and_global_qualifier() {
        let found = summary(
            "namespace s = std;\n\
             double a = s::pow(2.0, 3);\n\
             double b = ::std::pow(2.0, 3);\n",
        );
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_parenthesized_callee() {
        let found = summary("double a = (std::pow)(2.0, 3);\n");
        assert_eq!(found, vec![("(std::pow)(2.0, 3)".to_string(), true)]);
        assert!(summary("double a = (std::pow)(2.0);\n").is_empty());
        assert!(summary("double a = (mylib::pow)(2.0, 3);\n").is_empty());
        assert!(summary("int a = (int)(2.0, 3);\n").is_empty());
    }

    #[test]
    fn test_parenthesized_callee_spans() {
        let code = "double a = (std::pow)(x, (1 + 2));\n";
        let unit = unit(code);
        let pattern = CallPattern::default();
        let found: Vec<_> = find_pow_calls(&unit, &pattern).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(unit.sources.span_text(&found[0].base().span), Some("x"));
        assert_eq!(unit.sources.span_text(&found[0].exponent().span), Some("(1 + 2)"));
        assert!(found[0].exponent().facts.is_integer_constant());
    }

    #[test]
    fn test_non_static_member_is_not_constant() {
        let found = summary(
            "struct S {\n\
               const int N = 3;\n\
               static constexpr int M = 2;\n\
               double f(double x) { return std::pow(x, N) + std::pow(x, M); }\n\
             };\n",
        );
        assert_eq!(
            found,
            vec![
                ("std::pow(x, N)".to_string(), false),
                ("std::pow(x, M)".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_volatile_is_not_constant() {
        let found = summary(
            "void f(double x) { volatile const int n = 3; double y = std::pow(x, n); }\n",
        );
        assert_eq!(found, vec![("std::pow(x, n)".to_string(), false)]);
    }

    #[test]
    fn test_structured_binding_shadows_constant() {
        let found = summary(
            "constexpr int a = 2;\n\
             double f(double x, Pair p) { auto [a, b] = p; return std::pow(x, a); }\n",
        );
        assert_eq!(found, vec![("std::pow(x, a)".to_string(), false)]);
    }

    #[test]
    fn test_init_capture_shadows_constant() {
        let found = summary(
            "constexpr int n = 2;\n\
             void f(int m) { auto g = [n = m](double v) { return std::pow(v, n); }; }\n",
        );
        assert_eq!(found, vec![("std::pow(v, n)".to_string(), false)]);
    }

    #[test]
    fn test_const_double_cast_to_int_is_not_constant() {
        let found = summary(
            "void f(double x) { const double d = 2; double y = std::pow(x, (int)d); }\n",
        );
        assert_eq!(found, vec![("std::pow(x, (int)d)".to_string(), false)]);
    }

    #[test]
    fn test_wrong_arity_is_ignored() {
        assert!(summary("double a = std::pow(2.0);\n").is_empty());
    }

    #[test]
    fn test_nested_calls_are_both_matched() {
        let found = summary("double a = std::pow(std::pow(2.0, 2), 3);\n");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "std::pow(std::pow(2.0, 2), 3)");
        assert_eq!(found[1].0, "std::pow(2.0, 2)");
    }

    #[test]
    fn test_call_inside_template_arguments_is_skipped() {
        assert!(summary("double a = utils::pow<std::pow(2.0, 3)>(2.0);\n").is_empty());
    }

    #[test]
    fn test_calls_in_headers_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("util.h"),
            "#include <cmath>\ninline double h() { return std::pow(2.0, 3); }\n",
        )
        .unwrap();
        let main_path = dir.path().join("main.cpp");
        fs::write(&main_path, "#include \"util.h\"\ndouble y = std::pow(3.0, 2);\n").unwrap();

        let unit = TranslationUnit::from_file(&main_path, &[]).unwrap();
        let pattern = CallPattern::default();
        let found: Vec<_> = find_pow_calls(&unit, &pattern).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(
            unit.sources.span_text(&found[0].call().span),
            Some("std::pow(3.0, 2)")
        );

        let all = CallPattern {
            main_file_only: false,
            ..CallPattern::default()
        };
        assert_eq!(find_pow_calls(&unit, &all).count(), 2);
    }

    #[test]
    fn test_header_constants_are_visible() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("cfg.h"), "constexpr int EXP = 3;\n").unwrap();
        let main_path = dir.path().join("main.cpp");
        fs::write(&main_path, "#include \"cfg.h\"\ndouble y = std::pow(3.0, EXP);\n").unwrap();

        let unit = TranslationUnit::from_file(&main_path, &[]).unwrap();
        let pattern = CallPattern::default();
        let found: Vec<_> = find_pow_calls(&unit, &pattern).collect();
        assert_eq!(found.len(), 1);
        assert!(found[0].exponent().facts.is_integer_constant());
    }

    #[test]
    fn test_custom_target() {
        let unit = unit("double y = mylib::power(2.0, 3);\n");
        let pattern = CallPattern::new("mylib", "power", true);
        assert_eq!(find_pow_calls(&unit, &pattern).count(), 1);
    }
}
