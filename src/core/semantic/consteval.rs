//! Static facts about expressions: their type and whether they are
//! constant expressions.
//!
//! Values are never computed. An expression is constant when it is built
//! only from literals, constant variables, enumerators, non-type template
//! parameters, `sizeof`/`alignof`, arithmetic casts and calls to
//! `constexpr` functions whose arguments are themselves constant.

use tree_sitter::Node;

use super::{
    scope::{Environment, Symbol},
    syntax::{QualifiedName, node_text, significant_children},
    types::StaticType,
};
use crate::core::frontend::new_parser;

const MAX_MACRO_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprFacts {
    pub constant: bool,
    pub ty: StaticType,
}

impl ExprFacts {
    pub fn constant(ty: StaticType) -> Self {
        Self { constant: true, ty }
    }

    pub fn runtime(ty: StaticType) -> Self {
        Self {
            constant: false,
            ty,
        }
    }

    pub fn unknown() -> Self {
        Self::runtime(StaticType::Unknown)
    }

    /// Integer constant expression.
    pub fn is_integer_constant(&self) -> bool {
        self.constant && self.ty.is_integer()
    }

    fn from_symbol(symbol: &Symbol) -> Self {
        match symbol {
            Symbol::Variable { ty, constant } => Self {
                constant: *constant,
                ty: ty.clone(),
            },
            Symbol::Enumerator { ty } => Self::constant(ty.clone()),
            _ => Self::unknown(),
        }
    }
}

pub struct ConstEvaluator<'e> {
    env: &'e Environment,
    macro_depth: usize,
}

impl<'e> ConstEvaluator<'e> {
    pub fn new(env: &'e Environment) -> Self {
        Self {
            env,
            macro_depth: 0,
        }
    }

    pub fn evaluate(&self, node: Node<'_>, src: &[u8]) -> ExprFacts {
        match node.kind() {
            "number_literal" => ExprFacts::constant(literal_type(node_text(node, src))),
            "char_literal" => ExprFacts::constant(StaticType::Char),
            "true" | "false" => ExprFacts::constant(StaticType::Bool),
            "nullptr" | "string_literal" | "raw_string_literal" | "concatenated_string" => {
                ExprFacts::constant(StaticType::Pointer)
            }
            "sizeof_expression" | "alignof_expression" | "offsetof_expression" => {
                ExprFacts::constant(StaticType::Integer)
            }
            "parenthesized_expression" => self.first_operand(node, src),
            "initializer_list" => {
                let elements = significant_children(node);
                match elements.as_slice() {
                    [single] => self.evaluate(*single, src),
                    _ => ExprFacts::unknown(),
                }
            }
            "unary_expression" => self.unary(node, src),
            "binary_expression" => self.binary(node, src),
            "conditional_expression" => self.conditional(node, src),
            "comma_expression" => self.comma(node, src),
            "cast_expression" => self.cast(node, src),
            "call_expression" => self.call(node, src),
            "identifier" => self.identifier(node, src),
            "qualified_identifier" => self.qualified(node, src),
            _ => ExprFacts::unknown(),
        }
    }

    fn first_operand(&self, node: Node<'_>, src: &[u8]) -> ExprFacts {
        significant_children(node)
            .first()
            .map(|inner| self.evaluate(*inner, src))
            .unwrap_or_else(ExprFacts::unknown)
    }

    fn operand(&self, node: Node<'_>, field: &str, src: &[u8]) -> ExprFacts {
        node.child_by_field_name(field)
            .map(|child| self.evaluate(child, src))
            .unwrap_or_else(ExprFacts::unknown)
    }

    fn operator<'s>(node: Node<'_>, src: &'s [u8]) -> &'s str {
        node.child_by_field_name("operator")
            .map(|op| node_text(op, src))
            .unwrap_or_default()
    }

    fn unary(&self, node: Node<'_>, src: &[u8]) -> ExprFacts {
        let arg = self.operand(node, "argument", src);
        let ty = match Self::operator(node, src) {
            "!" => StaticType::Bool,
            "-" | "+" if arg.ty.is_floating() => StaticType::Floating,
            "-" | "+" | "~" if arg.ty.is_integer() => StaticType::Integer,
            _ => return ExprFacts::unknown(),
        };
        ExprFacts {
            constant: arg.constant,
            ty,
        }
    }

    fn binary(&self, node: Node<'_>, src: &[u8]) -> ExprFacts {
        let left = self.operand(node, "left", src);
        let right = self.operand(node, "right", src);
        let ty = match Self::operator(node, src) {
            "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" | "and" | "or" => {
                StaticType::Bool
            }
            "+" | "-" | "*" | "/" => arithmetic_conversion(&left.ty, &right.ty),
            "%" | "<<" | ">>" | "&" | "|" | "^" | "bitand" | "bitor" | "xor" => {
                if left.ty.is_integer() && right.ty.is_integer() {
                    StaticType::Integer
                } else {
                    StaticType::Unknown
                }
            }
            _ => StaticType::Unknown,
        };
        if ty == StaticType::Unknown {
            return ExprFacts::unknown();
        }
        ExprFacts {
            constant: left.constant && right.constant,
            ty,
        }
    }

    fn conditional(&self, node: Node<'_>, src: &[u8]) -> ExprFacts {
        let condition = self.operand(node, "condition", src);
        let consequence = match node.child_by_field_name("consequence") {
            Some(child) => self.evaluate(child, src),
            None => condition.clone(),
        };
        let alternative = self.operand(node, "alternative", src);

        let ty = if consequence.ty == alternative.ty {
            consequence.ty.clone()
        } else {
            arithmetic_conversion(&consequence.ty, &alternative.ty)
        };
        ExprFacts {
            constant: condition.constant
                && consequence.constant
                && alternative.constant
                && ty != StaticType::Unknown,
            ty,
        }
    }

    fn comma(&self, node: Node<'_>, src: &[u8]) -> ExprFacts {
        let left = self.operand(node, "left", src);
        let right = self.operand(node, "right", src);
        ExprFacts {
            constant: left.constant && right.constant,
            ty: right.ty,
        }
    }

    fn cast(&self, node: Node<'_>, src: &[u8]) -> ExprFacts {
        let ty = node
            .child_by_field_name("type")
            .map(|t| self.type_of(t, src))
            .unwrap_or(StaticType::Unknown);
        let value = self.operand(node, "value", src);
        cast_to(ty, &value)
    }

    fn call(&self, node: Node<'_>, src: &[u8]) -> ExprFacts {
        let Some(function) = node.child_by_field_name("function") else {
            return ExprFacts::unknown();
        };
        let args: Vec<ExprFacts> = node
            .child_by_field_name("arguments")
            .map(|list| {
                significant_children(list)
                    .into_iter()
                    .map(|arg| self.evaluate(arg, src))
                    .collect()
            })
            .unwrap_or_default();

        match function.kind() {
            "primitive_type" | "sized_type_specifier" => {
                return self.functional_cast(self.type_of(function, src), &args);
            }
            "template_function" if is_static_cast(function, src) => {
                let ty = function
                    .child_by_field_name("arguments")
                    .and_then(|targs| significant_children(targs).into_iter().next())
                    .map(|t| self.type_of(t, src))
                    .unwrap_or(StaticType::Unknown);
                return self.functional_cast(ty, &args);
            }
            _ => {}
        }

        let Some(name) = QualifiedName::parse(function, src) else {
            return ExprFacts::unknown();
        };
        let symbols = if name.is_unqualified() {
            self.env.lookup(&name.name)
        } else {
            self.env
                .lookup_qualified(&name.qualifier, name.global, &name.name)
        };
        let Some(symbols) = symbols else {
            return ExprFacts::unknown();
        };

        if let Some(Symbol::TypeAlias(ty)) = symbols
            .iter()
            .rev()
            .find(|s| matches!(s, Symbol::TypeAlias(_)))
        {
            return self.functional_cast(ty.clone(), &args);
        }

        // Overloads are not ranked: the call is constant only if every
        // visible overload is constexpr and agrees on the return type.
        let functions: Vec<(&StaticType, bool)> = symbols
            .iter()
            .filter_map(|s| match s {
                Symbol::Function { ret, constexpr, .. } => Some((ret, *constexpr)),
                _ => None,
            })
            .collect();
        let Some(&(ret, _)) = functions.first() else {
            return ExprFacts::unknown();
        };
        let ty = if functions.iter().all(|(r, _)| *r == ret) {
            ret.clone()
        } else {
            StaticType::Unknown
        };
        let constexpr = functions.iter().all(|(_, c)| *c);
        ExprFacts {
            constant: constexpr && ty != StaticType::Unknown && args.iter().all(|a| a.constant),
            ty,
        }
    }

    fn functional_cast(&self, ty: StaticType, args: &[ExprFacts]) -> ExprFacts {
        match args {
            [value] => cast_to(ty, value),
            [] if ty.is_arithmetic() => ExprFacts::constant(ty),
            _ => ExprFacts::unknown(),
        }
    }

    fn identifier(&self, node: Node<'_>, src: &[u8]) -> ExprFacts {
        let name = node_text(node, src);
        if let Some(body) = self.env.macro_body(name) {
            return self.expand_macro(body);
        }
        self.env
            .lookup(name)
            .and_then(|symbols| symbols.last())
            .map(ExprFacts::from_symbol)
            .unwrap_or_else(ExprFacts::unknown)
    }

    fn qualified(&self, node: Node<'_>, src: &[u8]) -> ExprFacts {
        QualifiedName::parse(node, src)
            .and_then(|name| {
                self.env
                    .lookup_qualified(&name.qualifier, name.global, &name.name)
            })
            .and_then(|symbols| symbols.last())
            .map(ExprFacts::from_symbol)
            .unwrap_or_else(ExprFacts::unknown)
    }

    /// Evaluate an object-like macro body as an expression.
    fn expand_macro(&self, body: &str) -> ExprFacts {
        if self.macro_depth >= MAX_MACRO_DEPTH {
            tracing::debug!(body, "macro expansion too deep");
            return ExprFacts::unknown();
        }
        let snippet = format!("auto __stdpow_macro = ({body});");
        let tree = match new_parser() {
            Ok(mut parser) => parser.parse(&snippet, None),
            Err(err) => {
                tracing::warn!("{err:#}");
                None
            }
        };
        let Some(tree) = tree else {
            return ExprFacts::unknown();
        };
        if tree.root_node().has_error() {
            return ExprFacts::unknown();
        }

        let value = tree
            .root_node()
            .named_child(0)
            .and_then(|decl| decl.child_by_field_name("declarator"))
            .and_then(|init| init.child_by_field_name("value"));
        let nested = ConstEvaluator {
            env: self.env,
            macro_depth: self.macro_depth + 1,
        };
        value
            .map(|value| nested.evaluate(value, snippet.as_bytes()))
            .unwrap_or_else(ExprFacts::unknown)
    }

    /// Static type named by a type node.
    pub fn type_of(&self, node: Node<'_>, src: &[u8]) -> StaticType {
        match node.kind() {
            "primitive_type" => {
                StaticType::from_builtin(node_text(node, src)).unwrap_or(StaticType::Unknown)
            }
            "sized_type_specifier" => StaticType::from_specifiers(node_text(node, src)),
            "type_identifier" | "identifier" => {
                let name = node_text(node, src);
                self.alias(self.env.lookup(name))
                    .or_else(|| StaticType::from_builtin(name))
                    .unwrap_or_else(|| StaticType::Class(name.to_string()))
            }
            "qualified_identifier" => {
                let text = node_text(node, src);
                QualifiedName::parse(node, src)
                    .and_then(|name| {
                        self.alias(self.env.lookup_qualified(
                            &name.qualifier,
                            name.global,
                            &name.name,
                        ))
                    })
                    .or_else(|| StaticType::from_builtin(text))
                    .unwrap_or_else(|| StaticType::Class(text.to_string()))
            }
            "type_descriptor" => {
                if node
                    .child_by_field_name("declarator")
                    .is_some_and(|d| d.kind().contains("pointer"))
                {
                    return StaticType::Pointer;
                }
                node.child_by_field_name("type")
                    .map(|t| self.type_of(t, src))
                    .unwrap_or(StaticType::Unknown)
            }
            "decltype" => self.first_operand(node, src).ty,
            "enum_specifier" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| node_text(n, src))
                    .unwrap_or_default();
                self.alias(self.env.lookup(name))
                    .unwrap_or(StaticType::Unknown)
            }
            "struct_specifier" | "class_specifier" | "union_specifier" | "template_type" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| node_text(n, src))
                    .unwrap_or_default();
                StaticType::Class(name.to_string())
            }
            _ => StaticType::Unknown,
        }
    }

    fn alias(&self, symbols: Option<&[Symbol]>) -> Option<StaticType> {
        symbols?.iter().rev().find_map(|symbol| match symbol {
            Symbol::TypeAlias(ty) => Some(ty.clone()),
            _ => None,
        })
    }
}

/// Integer literals have no `.`, exponent or hex-float `p` exponent.
fn literal_type(text: &str) -> StaticType {
    let lower = text.to_ascii_lowercase();
    let lower = lower.trim_start_matches(['-', '+']);
    let is_float = if lower.starts_with("0x") {
        lower.contains('p')
    } else {
        lower.contains('.') || lower.contains('e')
    };
    if is_float {
        StaticType::Floating
    } else {
        StaticType::Integer
    }
}

/// Usual arithmetic conversions, collapsed to the integer/floating split.
fn arithmetic_conversion(left: &StaticType, right: &StaticType) -> StaticType {
    if !left.is_arithmetic() || !right.is_arithmetic() {
        StaticType::Unknown
    } else if left.is_floating() || right.is_floating() {
        StaticType::Floating
    } else {
        StaticType::Integer
    }
}

fn cast_to(ty: StaticType, value: &ExprFacts) -> ExprFacts {
    let literal_target = ty.is_arithmetic() || matches!(ty, StaticType::Enum { .. });
    ExprFacts {
        constant: value.constant && literal_target,
        ty,
    }
}

fn is_static_cast(function: Node<'_>, src: &[u8]) -> bool {
    function
        .child_by_field_name("name")
        .is_some_and(|name| node_text(name, src) == "static_cast")
}
