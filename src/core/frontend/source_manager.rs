//! Byte-exact mapping between a spliced translation-unit buffer and the
//! original files it was assembled from.

use std::ops::Range;

use crate::core::data::{FileId, SourceContext, SourceLocation, SourceSpan};

/// The main file of a translation unit always has this id.
pub const MAIN_FILE: FileId = 0;

/// Source-range-to-text capability consumed by the rewriter.
///
/// Implemented by [`SourceManager`]; tests provide their own implementations
/// so the classifier can run without a parser.
pub trait SourceText {
    /// Exact original text of `span`, including whitespace and comments.
    fn span_text(&self, span: &SourceSpan) -> Option<&str>;

    /// Display context (path, line, column, line text) for the start of `span`.
    fn context(&self, span: &SourceSpan) -> SourceContext;
}

#[derive(Debug)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    fn new(path: String, text: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            path,
            text,
            line_starts,
        }
    }

    /// 0-based line index containing `offset`.
    fn line_index(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    fn line_text(&self, index: usize) -> &str {
        let start = self.line_starts[index];
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches('\r')
    }
}

/// A verbatim copy of `file[file_start..file_start + len]` placed at
/// `unit_start` in the unit buffer.
#[derive(Debug, Clone, Copy)]
struct Segment {
    unit_start: usize,
    unit_end: usize,
    file: FileId,
    file_start: usize,
}

/// Owns the original files of one translation unit and the spliced buffer
/// the parser sees.
///
/// Every byte of the buffer comes from exactly one segment, so any buffer
/// range that stays inside one segment maps back to an original [`SourceSpan`].
#[derive(Debug, Default)]
pub struct SourceManager {
    files: Vec<SourceFile>,
    segments: Vec<Segment>,
    buffer: String,
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file. The first file added is the main file.
    pub fn add_file(&mut self, path: impl Into<String>, text: impl Into<String>) -> FileId {
        self.files.push(SourceFile::new(path.into(), text.into()));
        self.files.len() - 1
    }

    /// Append `file[range]` to the unit buffer.
    pub fn push_segment(&mut self, file: FileId, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let unit_start = self.buffer.len();
        self.buffer.push_str(&self.files[file].text[range.clone()]);
        self.segments.push(Segment {
            unit_start,
            unit_end: self.buffer.len(),
            file,
            file_start: range.start,
        });
    }

    /// The spliced translation-unit text handed to the parser.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn file_path(&self, file: FileId) -> &str {
        &self.files[file].path
    }

    pub fn file_text(&self, file: FileId) -> &str {
        &self.files[file].text
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn segment_at(&self, offset: usize) -> Option<&Segment> {
        let idx = self.segments.partition_point(|s| s.unit_end <= offset);
        self.segments
            .get(idx)
            .filter(|s| s.unit_start <= offset && offset < s.unit_end)
    }

    /// Map a buffer range to an original span.
    ///
    /// Returns `None` when the range straddles two segments, i.e. when it
    /// starts in one file and ends in another.
    pub fn span_for(&self, range: Range<usize>) -> Option<SourceSpan> {
        let segment = self.segment_at(range.start)?;
        if range.end > segment.unit_end {
            return None;
        }
        let delta = range.start - segment.unit_start;
        let start = segment.file_start + delta;
        Some(SourceSpan::new(
            segment.file,
            start,
            start + (range.end - range.start),
        ))
    }

    /// Whether the buffer offset was written in the main file.
    pub fn is_in_main_file(&self, offset: usize) -> bool {
        self.segment_at(offset)
            .is_some_and(|segment| segment.file == MAIN_FILE)
    }

    pub fn location(&self, span: &SourceSpan) -> SourceLocation {
        let file = &self.files[span.file];
        let line = file.line_index(span.start);
        let line_start = file.line_starts[line];
        let col = file.text[line_start..span.start].chars().count() + 1;
        SourceLocation::new(file.path.clone(), line + 1, col)
    }
}

impl SourceText for SourceManager {
    fn span_text(&self, span: &SourceSpan) -> Option<&str> {
        self.files.get(span.file)?.text.get(span.start..span.end)
    }

    fn context(&self, span: &SourceSpan) -> SourceContext {
        let file = &self.files[span.file];
        let line = file.line_index(span.start);
        SourceContext::new(self.location(span), file.line_text(line))
    }
}
