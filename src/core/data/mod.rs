//! Core data types shared by the front end, the rules and the reporters.
//!
//! - `source`: file ids, byte spans and human-readable locations
//! - `edit`: path-addressed text replacements

pub mod edit;
pub mod source;

pub use edit::FileEdit;
pub use source::{FileId, SourceContext, SourceLocation, SourceSpan};
