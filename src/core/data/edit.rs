/// A replacement of `original` by `replacement` at byte range
/// `start..end` of a file on disk.
///
/// Unlike a [`SourceSpan`], a file edit outlives the translation unit it was
/// computed from and can be applied by path.
///
/// [`SourceSpan`]: super::SourceSpan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEdit {
    pub file_path: String,
    pub start: usize,
    pub end: usize,
    pub original: String,
    pub replacement: String,
}

impl FileEdit {
    pub fn overlaps(&self, other: &FileEdit) -> bool {
        self.file_path == other.file_path && self.start < other.end && other.start < self.end
    }
}
