//! Registration of declarations into the [`Environment`] as the tree is
//! walked.

use tree_sitter::Node;

use super::{
    consteval::ConstEvaluator,
    scope::{Environment, ScopeKind, Symbol},
    syntax::{QualifiedName, has_keyword, node_text, significant_children},
    types::StaticType,
};

/// `namespace a::b {` gives `["a", "b"]`; anonymous namespaces give `[]`.
pub fn namespace_names(node: Node<'_>, src: &[u8]) -> Vec<String> {
    node.child_by_field_name("name")
        .map(|name| split_path(node_text(name, src)))
        .unwrap_or_default()
}

fn split_path(text: &str) -> Vec<String> {
    text.split("::")
        .map(|part| {
            let part = part.trim();
            part.strip_prefix("inline ").unwrap_or(part).trim()
        })
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Name of the class owning a `field_declaration_list`.
pub fn class_name(body: Node<'_>, src: &[u8]) -> Vec<String> {
    body.parent()
        .and_then(|class| class.child_by_field_name("name"))
        .and_then(|name| QualifiedName::parse(name, src))
        .map(|name| vec![name.name])
        .unwrap_or_default()
}

/// Innermost declared name of a declarator.
pub fn declarator_name<'s>(node: Node<'_>, src: &'s [u8]) -> Option<&'s str> {
    match node.kind() {
        "identifier" | "field_identifier" | "type_identifier" => Some(node_text(node, src)),
        "init_declarator" | "pointer_declarator" | "array_declarator" | "function_declarator"
        | "attributed_declarator" | "parenthesized_declarator" | "reference_declarator" => {
            let inner = node
                .child_by_field_name("declarator")
                .or_else(|| significant_children(node).into_iter().next())?;
            declarator_name(inner, src)
        }
        _ => None,
    }
}

/// Names introduced by `auto [a, b] = ...`, also behind `&` or `&&`.
fn structured_binding_names(node: Node<'_>, src: &[u8]) -> Vec<String> {
    match node.kind() {
        "structured_binding_declarator" => significant_children(node)
            .into_iter()
            .filter(|child| child.kind() == "identifier")
            .map(|child| node_text(child, src).to_string())
            .collect(),
        "reference_declarator" => significant_children(node)
            .into_iter()
            .next()
            .map(|inner| structured_binding_names(inner, src))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn runtime_variable() -> Symbol {
    Symbol::Variable {
        ty: StaticType::Unknown,
        constant: false,
    }
}

fn find_function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "function_declarator" => Some(node),
        "pointer_declarator" | "reference_declarator" | "attributed_declarator"
        | "parenthesized_declarator" => {
            let inner = node
                .child_by_field_name("declarator")
                .or_else(|| significant_children(node).into_iter().next())?;
            find_function_declarator(inner)
        }
        _ => None,
    }
}

fn is_constexpr(node: Node<'_>, src: &[u8]) -> bool {
    has_keyword(node, src, "constexpr") || has_keyword(node, src, "consteval")
}

/// Declare the function of a `function_definition`. Called before its
/// scope is opened so the function is visible to its own body.
pub fn declare_function_definition(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    let Some(declarator) = node
        .child_by_field_name("declarator")
        .and_then(find_function_declarator)
    else {
        return;
    };
    let ret = node
        .child_by_field_name("type")
        .map(|t| ConstEvaluator::new(env).type_of(t, src))
        .unwrap_or(StaticType::Unknown);
    declare_function(env, declarator, ret, is_constexpr(node, src), src);
}

fn declare_function(
    env: &mut Environment,
    declarator: Node<'_>,
    ret: StaticType,
    constexpr: bool,
    src: &[u8],
) {
    let Some(name) = declarator
        .child_by_field_name("declarator")
        .and_then(|name| QualifiedName::parse(name, src))
    else {
        return;
    };
    // Out-of-line definitions of already declared members.
    if !name.is_unqualified() {
        return;
    }
    let symbol = Symbol::Function {
        namespace: env.current_path().to_vec(),
        ret,
        constexpr,
    };
    env.declare(&name.name, symbol);
}

/// Declare the parameters of the function or lambda whose declarator is
/// `declarator` in the current scope.
pub fn declare_parameters(env: &mut Environment, declarator: Node<'_>, src: &[u8]) {
    let Some(params) = find_function_declarator(declarator)
        .or(Some(declarator))
        .and_then(|d| d.child_by_field_name("parameters"))
    else {
        return;
    };
    let mut declared = Vec::new();
    {
        let evaluator = ConstEvaluator::new(env);
        for param in significant_children(params) {
            if !matches!(
                param.kind(),
                "parameter_declaration" | "optional_parameter_declaration"
            ) {
                continue;
            }
            let Some(target) = param.child_by_field_name("declarator") else {
                continue;
            };
            let Some(name) = declarator_name(target, src) else {
                continue;
            };
            let ty = if target.kind() == "pointer_declarator" {
                StaticType::Pointer
            } else {
                param
                    .child_by_field_name("type")
                    .map(|t| evaluator.type_of(t, src))
                    .unwrap_or(StaticType::Unknown)
            };
            declared.push((
                name.to_string(),
                Symbol::Variable {
                    ty,
                    constant: false,
                },
            ));
        }
    }
    for (name, symbol) in declared {
        env.declare(&name, symbol);
    }
}

/// Template parameters go into the template scope itself. Non-type
/// parameters are constant within the template.
pub fn declare_template_parameters(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    let Some(params) = node.child_by_field_name("parameters") else {
        return;
    };
    let mut declared = Vec::new();
    {
        let evaluator = ConstEvaluator::new(env);
        for param in significant_children(params) {
            match param.kind() {
                "parameter_declaration" | "optional_parameter_declaration" => {
                    let Some(name) = param
                        .child_by_field_name("declarator")
                        .and_then(|d| declarator_name(d, src))
                    else {
                        continue;
                    };
                    let ty = param
                        .child_by_field_name("type")
                        .map(|t| evaluator.type_of(t, src))
                        .unwrap_or(StaticType::Unknown);
                    declared.push((name.to_string(), Symbol::Variable { ty, constant: true }));
                }
                "type_parameter_declaration" | "optional_type_parameter_declaration" => {
                    let name = param.child_by_field_name("name").or_else(|| {
                        significant_children(param)
                            .into_iter()
                            .find(|c| c.kind() == "type_identifier")
                    });
                    if let Some(name) = name {
                        declared.push((
                            node_text(name, src).to_string(),
                            Symbol::TypeAlias(StaticType::Unknown),
                        ));
                    }
                }
                _ => {}
            }
        }
    }
    for (name, symbol) in declared {
        env.declare_local(&name, symbol);
    }
}

/// Variables and function prototypes of a `declaration` or
/// `field_declaration`.
pub fn declare_declaration(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    let Some(type_node) = node.child_by_field_name("type") else {
        return;
    };
    let constexpr = is_constexpr(node, src);
    let is_const = constexpr || has_keyword(node, src, "const");
    // A non-static data member is read through `this`; volatile objects are
    // never usable in constant expressions.
    let usable = !has_keyword(node, src, "volatile")
        && (node.kind() != "field_declaration" || has_keyword(node, src, "static"));
    let is_auto =
        type_node.kind() == "placeholder_type_specifier" || node_text(type_node, src) == "auto";

    let mut declared = Vec::new();
    let mut prototypes = Vec::new();
    {
        let evaluator = ConstEvaluator::new(env);
        let base_ty = evaluator.type_of(type_node, src);

        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            let (target, value) = match declarator.kind() {
                "init_declarator" => (
                    declarator.child_by_field_name("declarator"),
                    declarator.child_by_field_name("value"),
                ),
                _ => (Some(declarator), node.child_by_field_name("default_value")),
            };
            let Some(target) = target else {
                continue;
            };

            let bindings = structured_binding_names(target, src);
            if !bindings.is_empty() {
                declared.extend(bindings.into_iter().map(|name| (name, runtime_variable())));
                continue;
            }
            if let Some(function) = find_function_declarator(target) {
                prototypes.push((function, base_ty.clone()));
                continue;
            }
            let Some(name) = declarator_name(target, src) else {
                continue;
            };

            let init = value.map(|value| {
                let value = match value.kind() {
                    "argument_list" => significant_children(value)
                        .into_iter()
                        .next()
                        .unwrap_or(value),
                    _ => value,
                };
                evaluator.evaluate(value, src)
            });
            let ty = match target.kind() {
                "pointer_declarator" => StaticType::Pointer,
                "array_declarator" => StaticType::Unknown,
                _ if is_auto => init
                    .as_ref()
                    .map(|facts| facts.ty.clone())
                    .unwrap_or(StaticType::Unknown),
                _ => base_ty.clone(),
            };
            let constant = usable
                && target.kind() != "reference_declarator"
                && (constexpr
                    || (is_const
                        && ty.is_integer()
                        && init.as_ref().is_some_and(|facts| facts.constant)));

            declared.push((name.to_string(), Symbol::Variable { ty, constant }));
        }
    }

    for (function, ret) in prototypes {
        declare_function(env, function, ret, constexpr, src);
    }
    for (name, symbol) in declared {
        env.declare(&name, symbol);
    }
}

/// Enumeration type and its enumerators. Unscoped enumerators are visible
/// in the enclosing scope; all enumerators are reachable as `E::name`.
pub fn declare_enum(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, src).to_string())
        .unwrap_or_default();
    let scoped = has_keyword(node, src, "class") || has_keyword(node, src, "struct");
    let ty = StaticType::Enum {
        name: name.clone(),
        scoped,
    };

    if !name.is_empty() {
        env.declare(&name, Symbol::TypeAlias(ty.clone()));
    }
    for enumerator in significant_children(body) {
        if enumerator.kind() != "enumerator" {
            continue;
        }
        let Some(enumerator_name) = enumerator.child_by_field_name("name") else {
            continue;
        };
        let enumerator_name = node_text(enumerator_name, src);
        let symbol = Symbol::Enumerator { ty: ty.clone() };
        if !scoped {
            env.declare(enumerator_name, symbol.clone());
        }
        if !name.is_empty() {
            env.declare_member(&name, enumerator_name, symbol);
        }
    }
}

/// Class name as a type, for functional casts and member lookups.
pub fn declare_class(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    if node.child_by_field_name("body").is_none() {
        return;
    }
    if let Some(name) = node
        .child_by_field_name("name")
        .and_then(|name| QualifiedName::parse(name, src))
        .filter(QualifiedName::is_unqualified)
    {
        let ty = StaticType::Class(name.name.clone());
        env.declare(&name.name, Symbol::TypeAlias(ty));
    }
}

/// `using Index = int;`
pub fn declare_alias(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    let (Some(name), Some(ty)) = (
        node.child_by_field_name("name"),
        node.child_by_field_name("type"),
    ) else {
        return;
    };
    let ty = ConstEvaluator::new(env).type_of(ty, src);
    env.declare(node_text(name, src), Symbol::TypeAlias(ty));
}

/// `typedef int Index;`
pub fn declare_typedef(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    let Some(type_node) = node.child_by_field_name("type") else {
        return;
    };
    let base_ty = ConstEvaluator::new(env).type_of(type_node, src);
    let mut declared = Vec::new();
    let mut cursor = node.walk();
    for declarator in node.children_by_field_name("declarator", &mut cursor) {
        let Some(name) = declarator_name(declarator, src) else {
            continue;
        };
        let ty = match declarator.kind() {
            "pointer_declarator" => StaticType::Pointer,
            "type_identifier" => base_ty.clone(),
            _ => StaticType::Unknown,
        };
        declared.push((name.to_string(), Symbol::TypeAlias(ty)));
    }
    for (name, symbol) in declared {
        env.declare(&name, symbol);
    }
}

/// `using ns::name;` and `using namespace ns;`
pub fn declare_using(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    if has_keyword(node, src, "enum") {
        return;
    }
    let Some(name) = significant_children(node)
        .into_iter()
        .find_map(|child| QualifiedName::parse(child, src))
    else {
        return;
    };

    if has_keyword(node, src, "namespace") {
        let mut path = name.qualifier;
        path.push(name.name);
        env.add_using_directive(path);
    } else {
        let mut target = env.resolve_namespace(&name.qualifier);
        target.push(name.name.clone());
        env.declare(&name.name, Symbol::UsingDeclaration { target });
    }
}

/// `namespace alias = target;`
pub fn declare_namespace_alias(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let Some(target) = significant_children(node)
        .into_iter()
        .filter(|child| child.id() != name.id())
        .last()
    else {
        return;
    };
    let target = env.resolve_namespace(&split_path(node_text(target, src)));
    env.declare(node_text(name, src), Symbol::NamespaceAlias { target });
}

pub fn define_macro(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let body = node
        .child_by_field_name("value")
        .map(|value| node_text(value, src))
        .unwrap_or_default();
    env.define_macro(node_text(name, src), body);
}

/// `#undef NAME` arrives as a generic preprocessor call.
pub fn preprocessor_call(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    let directive = node
        .child_by_field_name("directive")
        .map(|d| node_text(d, src).replace(char::is_whitespace, ""))
        .unwrap_or_default();
    if directive != "#undef" {
        return;
    }
    if let Some(argument) = node.child_by_field_name("argument") {
        env.undefine_macro(node_text(argument, src).trim());
    }
}

/// `[n = m]` declares a new, non-constant `n` inside the lambda.
pub fn declare_init_captures(env: &mut Environment, lambda: Node<'_>, src: &[u8]) {
    let Some(captures) = lambda.child_by_field_name("captures") else {
        return;
    };
    for capture in significant_children(captures) {
        if capture.kind() != "lambda_capture_initializer" {
            continue;
        }
        if let Some(name) = capture.child_by_field_name("left") {
            env.declare(node_text(name, src), runtime_variable());
        }
    }
}

/// Open the scope a node introduces, if any, declaring what belongs to it.
/// Returns whether a scope was pushed.
pub fn enter_scope(env: &mut Environment, node: Node<'_>, src: &[u8]) -> bool {
    match node.kind() {
        "namespace_definition" => {
            env.push(ScopeKind::Namespace, &namespace_names(node, src));
        }
        "field_declaration_list" => {
            env.push(ScopeKind::Class, &class_name(node, src));
        }
        "function_definition" => {
            declare_function_definition(env, node, src);
            env.push(ScopeKind::Function, &[]);
            if let Some(declarator) = node.child_by_field_name("declarator") {
                declare_parameters(env, declarator, src);
            }
        }
        "lambda_expression" => {
            env.push(ScopeKind::Function, &[]);
            declare_init_captures(env, node, src);
            if let Some(declarator) = node.child_by_field_name("declarator") {
                declare_parameters(env, declarator, src);
            }
        }
        "template_declaration" => {
            env.push(ScopeKind::Template, &[]);
            declare_template_parameters(env, node, src);
        }
        "compound_statement" | "for_statement" | "for_range_loop" | "if_statement"
        | "while_statement" | "switch_statement" | "catch_clause" => {
            env.push(ScopeKind::Block, &[]);
        }
        _ => return false,
    }
    true
}

/// Declarations whose names become visible when the walk reaches them.
pub fn declare_on_enter(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    match node.kind() {
        "enum_specifier" => declare_enum(env, node, src),
        "class_specifier" | "struct_specifier" | "union_specifier" => {
            declare_class(env, node, src)
        }
        "alias_declaration" => declare_alias(env, node, src),
        "type_definition" => declare_typedef(env, node, src),
        "using_declaration" => declare_using(env, node, src),
        "namespace_alias_definition" => declare_namespace_alias(env, node, src),
        "preproc_def" => define_macro(env, node, src),
        "preproc_call" => preprocessor_call(env, node, src),
        _ => {}
    }
}

/// Declarations whose names become visible after their initializers.
pub fn declare_on_leave(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    if matches!(node.kind(), "declaration" | "field_declaration") {
        declare_declaration(env, node, src);
    }
}

/// Variable of a range-based for loop, visible in the loop body.
pub fn declare_range_variable(env: &mut Environment, node: Node<'_>, src: &[u8]) {
    if node.kind() != "for_range_loop" {
        return;
    }
    let Some(declarator) = node.child_by_field_name("declarator") else {
        return;
    };
    let mut names = structured_binding_names(declarator, src);
    if let Some(name) = declarator_name(declarator, src) {
        names.push(name.to_string());
    }
    for name in names {
        env.declare(&name, runtime_variable());
    }
}
