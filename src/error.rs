//! Failure taxonomy for boundary resolution
//!
//! Only structural failures of the markup itself surface as [`MarkupError`].
//! "Not found" outcomes (absent tags, attribute misses, tolerant-mode
//! resolution) are always `Option::None`, never an error.

use thiserror::Error;

/// Raised when a tag's boundaries cannot be resolved against the buffer.
///
/// Each variant carries a short snippet of the text around the failure
/// offset so callers can report where resolution went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    /// No start delimiter for the tag exists at or after the given offset.
    #[error("no start tag `{name}` found near `{context}`")]
    NoStartTag { name: String, context: String },

    /// The nesting counter never reached zero, or no `>` follows the
    /// matched close delimiter.
    #[error("no end tag for `{name}` near `{context}`")]
    NoEndTag { name: String, context: String },

    /// A close delimiter appeared where the surrounding structure cannot
    /// accept one, or an element opened inside the span never closed.
    #[error("mismatched tag tree near `{context}`")]
    MismatchedTree { context: String },
}

/// Clip a short window around `offset` for error context.
///
/// Bounds snap outward to char boundaries so the clip never splits a
/// multi-byte sequence.
pub(crate) fn snippet(source: &str, offset: usize) -> String {
    const WINDOW: usize = 24;

    let offset = offset.min(source.len());
    let mut start = offset.saturating_sub(WINDOW);
    let mut end = (offset + WINDOW).min(source.len());
    while start > 0 && !source.is_char_boundary(start) {
        start -= 1;
    }
    while end < source.len() && !source.is_char_boundary(end) {
        end += 1;
    }
    source[start..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_clips_window() {
        let source = "a".repeat(100);
        let clip = snippet(&source, 50);
        assert_eq!(clip.len(), 48);
    }

    #[test]
    fn test_snippet_char_boundary() {
        let source = format!("{}é{}", "x".repeat(23), "y".repeat(30));
        // offset 24 lands inside the two-byte é; must not panic
        let clip = snippet(&source, 24);
        assert!(clip.contains('é'));
    }

    #[test]
    fn test_snippet_past_end() {
        assert_eq!(snippet("abc", 999), "abc");
    }
}
