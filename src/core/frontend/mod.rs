//! C++ front end.
//!
//! - `source_manager`: spliced buffer to original file mapping
//! - `include`: quoted `#include` splicing
//! - `unit`: tree-sitter parsing of one translation unit

pub mod include;
pub mod source_manager;
pub mod unit;

pub use include::{assemble, assemble_source};
pub use source_manager::{MAIN_FILE, SourceManager, SourceText};
pub use unit::{TranslationUnit, new_parser};
