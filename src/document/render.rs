//! Span-splicing serializer.
//!
//! Rendering never re-emits markup. The output is the original source with
//! the byte range of each removed subtree cut out, so attribute quoting,
//! comments, whitespace and ordering of survivors are untouched.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::{Document, Span};
use crate::error::TrimError;

impl Document {
    /// Render the document with every removed element cut out.
    pub fn render(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(self.source.len());
        let mut cursor = 0;
        for (start, end) in self.removal_cuts() {
            output.extend_from_slice(&self.source[cursor..start.max(cursor)]);
            cursor = cursor.max(end);
        }
        output.extend_from_slice(&self.source[cursor..]);
        output
    }

    /// Render and write to `path`, replacing any existing file.
    ///
    /// The bytes go to a temporary file next to `path` first and are then
    /// persisted over it, so a failed write leaves no partial destination.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TrimError> {
        let path = path.as_ref();
        let bytes = self.render();

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(|e| TrimError::io(dir, e))?;
        file.write_all(&bytes).map_err(|e| TrimError::io(file.path(), e))?;
        file.flush().map_err(|e| TrimError::io(file.path(), e))?;
        file.persist(path).map_err(|e| TrimError::io(path, e.error))?;

        tracing::debug!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Byte ranges to drop, sorted and non-overlapping.
    ///
    /// Only the outermost removed element of each subtree yields a cut.
    /// Elements are stored in document order, so the cuts come out sorted.
    fn removal_cuts(&self) -> Vec<(usize, usize)> {
        self.elements
            .iter()
            .filter(|e| e.removed)
            .filter(|e| e.parent.is_none_or(|p| !self.elements[p.0].removed))
            .map(|e| widen_to_lines(&self.source, e.span))
            .collect()
    }
}

/// Grow a cut to whole lines when the element is alone on its lines.
///
/// This takes the indentation before the element and the line break after
/// it, so removing an element does not leave a blank line behind.
fn widen_to_lines(source: &[u8], span: Span) -> (usize, usize) {
    let is_blank = |b: &u8| matches!(b, b' ' | b'\t');

    let line_start = source[..span.start]
        .iter()
        .rposition(|b| !is_blank(b))
        .map_or(0, |i| i + 1);
    let starts_line = line_start == 0 || source[line_start - 1] == b'\n';

    let trailing = source[span.end..].iter().take_while(|b| is_blank(b)).count();
    let after = span.end + trailing;
    let line_end = if source[after..].starts_with(b"\r\n") {
        Some(after + 2)
    } else if source[after..].starts_with(b"\n") || after == source.len() {
        Some(after + usize::from(after < source.len()))
    } else {
        None
    };

    match line_end {
        Some(line_end) if starts_line => (line_start, line_end),
        _ => (span.start, span.end),
    }
}
