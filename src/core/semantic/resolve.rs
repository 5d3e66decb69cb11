//! Decides whether a call's callee names a given namespace-scope function,
//! following the visible declarations rather than the spelling alone.

use tree_sitter::Node;

use super::{
    scope::{Environment, ScopeKind, Symbol},
    syntax::{QualifiedName, significant_children},
};

/// A function declared at namespace scope, e.g. `std::pow`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    pub namespace: Vec<String>,
    pub name: String,
}

impl FunctionRef {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace
                .split("::")
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
            name: name.to_string(),
        }
    }

    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace.join("::"), self.name)
        }
    }

    fn full_path(&self) -> Vec<String> {
        let mut path = self.namespace.clone();
        path.push(self.name.clone());
        path
    }

    fn denoted_by(&self, symbol: &Symbol) -> bool {
        match symbol {
            Symbol::Function { namespace, .. } => *namespace == self.namespace,
            Symbol::UsingDeclaration { target } => *target == self.full_path(),
            _ => false,
        }
    }
}

/// Name written as the callee of a call, looking through parentheses.
pub fn callee_name(function: Node<'_>, src: &[u8]) -> Option<QualifiedName> {
    let mut node = function;
    while node.kind() == "parenthesized_expression" {
        node = significant_children(node).into_iter().next()?;
    }
    QualifiedName::parse(node, src)
}

/// Whether `name`, looked up at the current point of `env`, denotes `target`.
pub fn resolves_to(env: &Environment, name: &QualifiedName, target: &FunctionRef) -> bool {
    if name.name != target.name {
        return false;
    }
    if name.is_unqualified() {
        return unqualified_resolves_to(env, name, target);
    }

    let namespace = env.resolve_namespace(&name.qualifier);
    if namespace == target.namespace {
        return true;
    }
    // `N::pow` where namespace N re-exports the target with a using-declaration.
    env.lookup_qualified(&name.qualifier, name.global, &name.name)
        .is_some_and(|symbols| symbols.iter().all(|s| target.denoted_by(s)))
}

/// Unqualified lookup stops at the innermost scope with any candidate;
/// the call resolves to the target only if every candidate found there is
/// the target.
fn unqualified_resolves_to(env: &Environment, name: &QualifiedName, target: &FunctionRef) -> bool {
    for scope in env.scopes() {
        let mut candidates: Vec<bool> = scope
            .symbols(&name.name)
            .iter()
            .map(|symbol| target.denoted_by(symbol))
            .collect();

        for directive in scope.using_directives() {
            if *directive == target.namespace {
                candidates.push(true);
            }
            if let Some(symbols) = env.qualified_symbols(directive, &name.name) {
                candidates.extend(symbols.iter().map(|s| target.denoted_by(s)));
            }
        }

        // Code inside the target's namespace sees its members unqualified.
        if scope.kind() == ScopeKind::Namespace
            && !target.namespace.is_empty()
            && scope.path().starts_with(&target.namespace)
        {
            candidates.push(true);
        }

        if !candidates.is_empty() {
            return candidates.into_iter().all(|denotes| denotes);
        }
    }
    false
}
