//! Translation-unit assembly: splices quoted `#include` directives into one
//! buffer while keeping every byte traceable to its original file.
//!
//! Only `#include "..."` is expanded. Angle-bracket includes stay in the
//! buffer as directives; system headers are never read. A header is spliced
//! at most once per unit, which stands in for include guards and
//! `#pragma once`. Directive-like lines inside block comments and raw
//! string literals are not directives.

use std::{
    collections::HashSet,
    fs,
    ops::Range,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::{Context, Result};
use regex::Regex;

use super::source_manager::{MAIN_FILE, SourceManager};
use crate::core::data::FileId;

static QUOTED_INCLUDE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*#[ \t]*include[ \t]*"([^"\n]+)"[^\n]*"#).unwrap());

/// Read `main_path` and splice its quoted includes.
pub fn assemble(main_path: &Path, include_dirs: &[PathBuf]) -> Result<SourceManager> {
    let text = fs::read_to_string(main_path)
        .with_context(|| format!("Failed to read file: {}", main_path.display()))?;
    Ok(assemble_source(main_path, text, include_dirs))
}

/// Splice the quoted includes of an already-loaded main file.
pub fn assemble_source(main_path: &Path, text: String, include_dirs: &[PathBuf]) -> SourceManager {
    let mut sources = SourceManager::new();
    let main = sources.add_file(main_path.to_string_lossy(), text);
    debug_assert_eq!(main, MAIN_FILE);

    let mut visited = HashSet::new();
    visited.insert(identity(main_path));

    let mut splicer = Splicer {
        sources: &mut sources,
        include_dirs,
        visited,
    };
    splicer.splice(main, main_path);
    sources
}

struct Splicer<'a> {
    sources: &'a mut SourceManager,
    include_dirs: &'a [PathBuf],
    visited: HashSet<PathBuf>,
}

impl Splicer<'_> {
    fn splice(&mut self, file: FileId, path: &Path) {
        let text = self.sources.file_text(file).to_string();
        let mut cursor = 0;
        let inactive = inactive_ranges(&text);

        for caps in QUOTED_INCLUDE_REGEX.captures_iter(&text) {
            let (Some(directive), Some(target)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if inactive.iter().any(|range| range.contains(&directive.start())) {
                continue;
            }
            let Some(header_path) = self.resolve(path, target.as_str()) else {
                tracing::debug!(
                    include = target.as_str(),
                    from = %path.display(),
                    "include not found, leaving directive in place"
                );
                continue;
            };

            let header_text = if self.visited.insert(identity(&header_path)) {
                match fs::read_to_string(&header_path) {
                    Ok(text) => Some(text),
                    Err(err) => {
                        tracing::warn!(
                            header = %header_path.display(),
                            "cannot read header: {err}"
                        );
                        continue;
                    }
                }
            } else {
                None
            };

            self.sources.push_segment(file, cursor..directive.start());
            cursor = directive.end();

            if let Some(header_text) = header_text {
                tracing::debug!(header = %header_path.display(), "splicing include");
                let header = self
                    .sources
                    .add_file(header_path.to_string_lossy(), header_text);
                self.splice(header, &header_path);
            }
        }

        self.sources.push_segment(file, cursor..text.len());
    }

    /// Search next to the including file first, then the include dirs.
    fn resolve(&self, including: &Path, target: &str) -> Option<PathBuf> {
        let base = including.parent().unwrap_or_else(|| Path::new(""));
        std::iter::once(base.join(target))
            .chain(self.include_dirs.iter().map(|dir| dir.join(target)))
            .find(|candidate| candidate.is_file())
    }
}

/// Byte ranges of block comments and raw string literals. Line comments,
/// string and character literals are skipped so that their contents do not
/// open a range.
fn inactive_ranges(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = text[i..].find('\n').map_or(bytes.len(), |end| i + end);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = text[i + 2..].find("*/").map_or(bytes.len(), |end| i + 2 + end + 2);
                ranges.push(i..end);
                i = end;
            }
            b'R' if bytes.get(i + 1) == Some(&b'"') => {
                let open = i + 2;
                let Some(paren) = text[open..].find('(') else {
                    i += 2;
                    continue;
                };
                let closing = format!("){}\"", &text[open..open + paren]);
                let body = open + paren + 1;
                let end = text[body..]
                    .find(&closing)
                    .map_or(bytes.len(), |end| body + end + closing.len());
                ranges.push(i..end);
                i = end;
            }
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote && bytes[i] != b'\n' {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    ranges
}

fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
