//! Lexical scopes and the symbols declared in them.
//!
//! The environment is built incrementally while walking the tree, so a
//! lookup only sees declarations that precede the current position, the
//! same visibility C++ name lookup has at that point.

use std::collections::HashMap;

use super::types::StaticType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Namespace,
    Class,
    Function,
    Template,
    Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    /// Object or parameter. `constant` marks objects usable in constant
    /// expressions: `constexpr` variables, const integral variables with a
    /// constant initializer, and non-type template parameters.
    Variable { ty: StaticType, constant: bool },
    Enumerator { ty: StaticType },
    Function {
        namespace: Vec<String>,
        ret: StaticType,
        constexpr: bool,
    },
    TypeAlias(StaticType),
    /// `using ns::name;`
    UsingDeclaration { target: Vec<String> },
    /// `namespace alias = ns;`
    NamespaceAlias { target: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    path: Vec<String>,
    symbols: HashMap<String, Vec<Symbol>>,
    using_directives: Vec<Vec<String>>,
}

impl Scope {
    fn new(kind: ScopeKind, path: Vec<String>) -> Self {
        Self {
            kind,
            path,
            symbols: HashMap::new(),
            using_directives: Vec::new(),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Enclosing namespace and class names.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn symbols(&self, name: &str) -> &[Symbol] {
        self.symbols.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn using_directives(&self) -> &[Vec<String>] {
        &self.using_directives
    }
}

#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
    qualified: HashMap<String, Vec<Symbol>>,
    macros: HashMap<String, String>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Namespace, Vec::new())],
            qualified: HashMap::new(),
            macros: HashMap::new(),
        }
    }

    /// Open a scope. Named namespaces and classes extend the path.
    pub fn push(&mut self, kind: ScopeKind, names: &[String]) {
        let mut path = self.current_path().to_vec();
        path.extend(names.iter().cloned());
        self.scopes.push(Scope::new(kind, path));
    }

    /// Close the innermost scope. The global scope is never popped.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn current_path(&self) -> &[String] {
        self.scopes.last().map(|s| s.path.as_slice()).unwrap_or(&[])
    }

    /// Scopes from innermost to outermost.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter().rev()
    }

    /// Index of the scope that receives declarations: template parameter
    /// scopes are transparent to the entity they parameterize.
    fn declaring_scope(&self) -> usize {
        self.scopes
            .iter()
            .rposition(|s| s.kind != ScopeKind::Template)
            .unwrap_or(0)
    }

    pub fn declare(&mut self, name: &str, symbol: Symbol) {
        let index = self.declaring_scope();
        let scope = &mut self.scopes[index];
        if matches!(scope.kind, ScopeKind::Namespace | ScopeKind::Class) {
            let key = qualified_key(&scope.path, name);
            self.qualified.entry(key).or_default().push(symbol.clone());
        }
        scope
            .symbols
            .entry(name.to_string())
            .or_default()
            .push(symbol);
    }

    /// Declare directly in the innermost scope (template parameters).
    pub fn declare_local(&mut self, name: &str, symbol: Symbol) {
        if let Some(scope) = self.scopes.last_mut() {
            scope
                .symbols
                .entry(name.to_string())
                .or_default()
                .push(symbol);
        }
    }

    /// Register a member reachable only by qualified name, such as an
    /// enumerator of a scoped enumeration.
    pub fn declare_member(&mut self, owner: &str, name: &str, symbol: Symbol) {
        let mut path = self.scopes[self.declaring_scope()].path.clone();
        path.push(owner.to_string());
        let key = qualified_key(&path, name);
        self.qualified.entry(key).or_default().push(symbol);
    }

    pub fn add_using_directive(&mut self, namespace: Vec<String>) {
        let index = self.declaring_scope();
        let resolved = self.resolve_namespace(&namespace);
        self.scopes[index].using_directives.push(resolved);
    }

    pub fn define_macro(&mut self, name: &str, body: &str) {
        self.macros.insert(name.to_string(), body.trim().to_string());
    }

    pub fn undefine_macro(&mut self, name: &str) {
        self.macros.remove(name);
    }

    pub fn macro_body(&self, name: &str) -> Option<&str> {
        self.macros.get(name).map(String::as_str)
    }

    /// Unqualified lookup: the innermost scope declaring `name`, either
    /// directly or through one of its using-directives.
    pub fn lookup(&self, name: &str) -> Option<&[Symbol]> {
        for scope in self.scopes() {
            let direct = scope.symbols(name);
            if !direct.is_empty() {
                return Some(direct);
            }
            for directive in scope.using_directives() {
                if let Some(found) = self.qualified_symbols(directive, name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Symbols registered under `namespace::name`, exactly.
    pub fn qualified_symbols(&self, namespace: &[String], name: &str) -> Option<&[Symbol]> {
        self.qualified
            .get(&qualified_key(namespace, name))
            .map(Vec::as_slice)
            .filter(|symbols| !symbols.is_empty())
    }

    /// Qualified lookup of `qualifier::name`, trying the qualifier as
    /// written and then relative to each enclosing namespace.
    pub fn lookup_qualified(&self, qualifier: &[String], global: bool, name: &str) -> Option<&[Symbol]> {
        let qualifier = self.resolve_namespace(qualifier);
        if global {
            return self.qualified_symbols(&qualifier, name);
        }
        let current = self.current_path();
        (0..=current.len()).rev().find_map(|len| {
            let mut path = current[..len].to_vec();
            path.extend(qualifier.iter().cloned());
            self.qualified_symbols(&path, name)
        })
    }

    /// Expand a namespace alias in the first component of `path`.
    pub fn resolve_namespace(&self, path: &[String]) -> Vec<String> {
        let Some((first, rest)) = path.split_first() else {
            return Vec::new();
        };
        let alias = self.lookup(first).and_then(|symbols| {
            symbols.iter().rev().find_map(|symbol| match symbol {
                Symbol::NamespaceAlias { target } => Some(target.clone()),
                _ => None,
            })
        });
        match alias {
            Some(mut target) => {
                target.extend(rest.iter().cloned());
                target
            }
            None => path.to_vec(),
        }
    }
}

fn qualified_key(path: &[String], name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", path.join("::"), name)
    }
}
