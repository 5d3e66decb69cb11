//! Small helpers over tree-sitter nodes.

use tree_sitter::Node;

pub fn node_text<'s>(node: Node<'_>, src: &'s [u8]) -> &'s str {
    node.utf8_text(src).unwrap_or_default()
}

/// Named children, skipping comments.
pub fn significant_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Whether any direct, unnamed or named, child has exactly `text`.
/// Used for specifier keywords such as `constexpr`, `const` and `class`.
pub fn has_keyword(node: Node<'_>, src: &[u8], keyword: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|child| {
        !matches!(child.kind(), "comment" | "compound_statement")
            && child.child_count() <= 1
            && node_text(child, src) == keyword
    })
}

/// A possibly qualified name, e.g. `::std::pow` or `cfg::N`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QualifiedName {
    /// Written with a leading `::`.
    pub global: bool,
    pub qualifier: Vec<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn parse(node: Node<'_>, src: &[u8]) -> Option<Self> {
        let mut out = QualifiedName::default();
        let mut current = node;
        let mut outermost = true;
        loop {
            match current.kind() {
                "qualified_identifier" => {
                    match current.child_by_field_name("scope") {
                        Some(scope) => out.qualifier.push(scope_name(scope, src)?),
                        None if outermost => out.global = true,
                        None => {}
                    }
                    current = current.child_by_field_name("name")?;
                    outermost = false;
                }
                "template_function" | "template_type" => {
                    out.name = node_text(current.child_by_field_name("name")?, src).to_string();
                    return Some(out);
                }
                "identifier" | "field_identifier" | "type_identifier" | "namespace_identifier"
                | "operator_name" | "destructor_name" => {
                    out.name = node_text(current, src).to_string();
                    return Some(out);
                }
                _ => return None,
            }
        }
    }

    pub fn is_unqualified(&self) -> bool {
        !self.global && self.qualifier.is_empty()
    }
}

fn scope_name(scope: Node<'_>, src: &[u8]) -> Option<String> {
    match scope.kind() {
        "namespace_identifier" | "type_identifier" => Some(node_text(scope, src).to_string()),
        "template_type" => scope
            .child_by_field_name("name")
            .map(|name| node_text(name, src).to_string()),
        _ => None,
    }
}
