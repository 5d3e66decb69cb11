use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tree_sitter::{Node, Parser, Tree};

use super::{
    include::{assemble, assemble_source},
    source_manager::{MAIN_FILE, SourceManager},
};

/// One main file with its quoted includes spliced in, parsed into a
/// concrete syntax tree.
pub struct TranslationUnit {
    pub sources: SourceManager,
    pub tree: Tree,
}

impl TranslationUnit {
    pub fn from_file(path: &Path, include_dirs: &[PathBuf]) -> Result<Self> {
        Self::parse(assemble(path, include_dirs)?)
    }

    /// Parse in-memory text as if it were the file at `path`.
    pub fn from_source(path: &Path, text: impl Into<String>, include_dirs: &[PathBuf]) -> Result<Self> {
        Self::parse(assemble_source(path, text.into(), include_dirs))
    }

    pub fn parse(sources: SourceManager) -> Result<Self> {
        let mut parser = new_parser()?;
        let tree = parser
            .parse(sources.buffer(), None)
            .ok_or_else(|| anyhow!("Parser gave up on {}", sources.file_path(MAIN_FILE)))?;

        if tree.root_node().has_error() {
            tracing::warn!(
                file = sources.file_path(MAIN_FILE),
                "syntax errors found, analysing the recoverable parts"
            );
        }

        Ok(Self { sources, tree })
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn text(&self) -> &[u8] {
        self.sources.buffer().as_bytes()
    }

    pub fn main_path(&self) -> &str {
        self.sources.file_path(MAIN_FILE)
    }
}

/// A parser loaded with the C++ grammar.
pub fn new_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_cpp::LANGUAGE.into())
        .context("Failed to load the C++ grammar")?;
    Ok(parser)
}
