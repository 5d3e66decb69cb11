use crate::core::{data::SourceSpan, semantic::ExprFacts};

/// The function a matched call resolved to, and how it was spelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callee {
    pub namespace: Vec<String>,
    pub name: String,
    pub written: String,
}

impl Callee {
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace.join("::"), self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub index: usize,
    pub span: SourceSpan,
    pub facts: ExprFacts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// The whole call expression, callee through closing parenthesis.
    pub span: SourceSpan,
    pub callee: Callee,
    pub arguments: Vec<Argument>,
}

/// A call bound to its callee, base and exponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowCallMatch {
    call: CallSite,
}

impl PowCallMatch {
    /// Binds a call with exactly a base and an exponent.
    pub fn new(call: CallSite) -> Option<Self> {
        (call.arguments.len() == 2).then_some(Self { call })
    }

    pub fn call(&self) -> &CallSite {
        &self.call
    }

    pub fn callee(&self) -> &Callee {
        &self.call.callee
    }

    pub fn base(&self) -> &Argument {
        &self.call.arguments[0]
    }

    pub fn exponent(&self) -> &Argument {
        &self.call.arguments[1]
    }
}
