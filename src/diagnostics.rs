//! Diagnostic registration and emission.
//!
//! Message templates are registered once, before any file is analysed, and
//! referred to by [`DiagnosticId`] afterwards. An [`Emitter`] holds one
//! registered diagnostic and is shared read-only by the analysis workers.

use crate::{
    core::{FileEdit, frontend::SourceText},
    issues::{ConstPowIssue, Severity},
    rules::const_pow::SuggestedEdit,
};

/// Handle of a registered diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagnosticId(usize);

#[derive(Debug, Default)]
pub struct DiagnosticRegistry {
    entries: Vec<(Severity, String)>,
}

impl DiagnosticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. Registering the same severity and template
    /// again returns the existing id.
    pub fn register(&mut self, severity: Severity, template: &str) -> DiagnosticId {
        if let Some(index) = self
            .entries
            .iter()
            .position(|(s, t)| *s == severity && t == template)
        {
            return DiagnosticId(index);
        }
        self.entries.push((severity, template.to_string()));
        DiagnosticId(self.entries.len() - 1)
    }

    pub fn severity(&self, id: DiagnosticId) -> Option<Severity> {
        self.entries.get(id.0).map(|(severity, _)| *severity)
    }

    pub fn template(&self, id: DiagnosticId) -> Option<&str> {
        self.entries.get(id.0).map(|(_, template)| template.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turns suggested edits into located issues carrying one diagnostic.
#[derive(Debug, Clone)]
pub struct Emitter {
    id: DiagnosticId,
    message: String,
}

impl Emitter {
    pub fn new(registry: &mut DiagnosticRegistry, message: impl Into<String>) -> Self {
        let message = message.into();
        let id = registry.register(ConstPowIssue::severity(), &message);
        Self { id, message }
    }

    pub fn id(&self) -> DiagnosticId {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One issue per edit, located at the edit's anchor.
    pub fn emit(&self, edit: SuggestedEdit, sources: &impl SourceText) -> ConstPowIssue {
        let context = sources.context(&edit.anchor);
        let file_path = context.file_path().to_string();
        ConstPowIssue {
            context,
            diagnostic: self.id,
            message: self.message.clone(),
            edit: FileEdit {
                file_path,
                start: edit.range.start,
                end: edit.range.end,
                original: edit.original,
                replacement: edit.replacement,
            },
        }
    }
}
