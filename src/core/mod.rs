//! Core analysis engine.
//!
//! - `data`: spans, locations and edits shared by every layer
//! - `frontend`: translation-unit assembly and parsing
//! - `semantic`: scopes, name resolution and constant evaluation
//! - `matcher`: pull-style matching of target calls
//! - `file_scanner` / `context`: which files to analyse and the lazily
//!   parsed units shared by the commands

pub mod context;
pub mod data;
pub mod file_scanner;
pub mod frontend;
pub mod matcher;
pub mod semantic;

pub use context::{AllTranslationUnits, CheckContext};
pub use data::{FileEdit, FileId, SourceContext, SourceLocation, SourceSpan};
