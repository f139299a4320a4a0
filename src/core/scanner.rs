//! Markup delimiter scanning using memchr
//!
//! Direct substring search over the fixed delimiter set - no regex engine:
//! - tag start for a name: `<name` followed by whitespace, `/`, or `>`
//! - singleton close: `/>`
//! - complex close: `</name>` (or the generic `</`)
//! - generic tag start: `<` followed by a word character or `?`
//! - xml declaration: `<?xml` followed by whitespace, `/`, or `>`
//! - CDATA and comment delimiters
//!
//! All scans are forward-only from a byte offset and return `None` past the
//! end of the buffer. Every delimiter byte is ASCII, so match offsets are
//! always char boundaries of the source `&str`.

use memchr::{memchr, memmem};

/// A matched name-specific tag start.
///
/// `start` is the offset of the `<`; `delim` is the offset of the
/// whitespace, `/`, or `>` that terminates the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagStart {
    pub start: usize,
    pub delim: usize,
}

/// Whitespace as it may follow a tag name inside a delimiter.
#[inline]
pub(crate) fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Word characters for the generic tag-start pattern.
/// Non-ASCII lead bytes count so UTF-8 tag names still match.
#[inline]
pub(crate) fn is_word_byte(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_') || b >= 0x80
}

#[inline]
fn tail(source: &str, from: usize) -> &[u8] {
    source.as_bytes().get(from..).unwrap_or(&[])
}

/// Find the next `<name` start whose name is terminated by whitespace,
/// `/`, or `>`.
pub fn find_tag_start(source: &str, name: &str, from: usize) -> Option<TagStart> {
    let bytes = source.as_bytes();
    let mut needle = Vec::with_capacity(name.len() + 1);
    needle.push(b'<');
    needle.extend_from_slice(name.as_bytes());

    let mut pos = from;
    while pos < bytes.len() {
        let found = memmem::find(&bytes[pos..], &needle)? + pos;
        let delim = found + needle.len();
        match bytes.get(delim) {
            Some(&b) if is_space(b) || b == b'/' || b == b'>' => {
                return Some(TagStart {
                    start: found,
                    delim,
                });
            }
            _ => pos = found + 1,
        }
    }
    None
}

/// Find the next `<?xml` declaration start (same delimiter rule as
/// [`find_tag_start`]).
pub fn find_xml_decl(source: &str, from: usize) -> Option<TagStart> {
    find_tag_start(source, "?xml", from)
}

/// Find the next singleton close `/>`.
#[inline]
pub fn find_singleton_close(source: &str, from: usize) -> Option<usize> {
    memmem::find(tail(source, from), b"/>").map(|i| i + from)
}

/// Find the next `</name>` close for a specific name.
pub fn find_complex_close(source: &str, name: &str, from: usize) -> Option<usize> {
    let mut needle = Vec::with_capacity(name.len() + 3);
    needle.extend_from_slice(b"</");
    needle.extend_from_slice(name.as_bytes());
    needle.push(b'>');
    memmem::find(tail(source, from), &needle).map(|i| i + from)
}

/// Find the next generic close delimiter `</`.
#[inline]
pub fn find_generic_close(source: &str, from: usize) -> Option<usize> {
    memmem::find(tail(source, from), b"</").map(|i| i + from)
}

/// Find the next generic tag start: `<` followed by a word character
/// or `?`.
pub fn find_any_tag_start(source: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut pos = from;
    while pos < bytes.len() {
        let found = memchr(b'<', &bytes[pos..])? + pos;
        match bytes.get(found + 1) {
            Some(&b) if is_word_byte(b) || b == b'?' => return Some(found),
            _ => pos = found + 1,
        }
    }
    None
}

/// Find the next CDATA open `<![CDATA[`.
#[inline]
pub fn find_cdata_open(source: &str, from: usize) -> Option<usize> {
    memmem::find(tail(source, from), b"<![CDATA[").map(|i| i + from)
}

/// Find the next CDATA close `]]>`.
#[inline]
pub fn find_cdata_close(source: &str, from: usize) -> Option<usize> {
    memmem::find(tail(source, from), b"]]>").map(|i| i + from)
}

/// Find the next comment open `<!--`.
#[inline]
pub fn find_comment_open(source: &str, from: usize) -> Option<usize> {
    memmem::find(tail(source, from), b"<!--").map(|i| i + from)
}

/// Find the next comment close `-->`.
#[inline]
pub fn find_comment_close(source: &str, from: usize) -> Option<usize> {
    memmem::find(tail(source, from), b"-->").map(|i| i + from)
}

/// Find the next `>`.
#[inline]
pub fn next_gt(source: &str, from: usize) -> Option<usize> {
    memchr(b'>', tail(source, from)).map(|i| i + from)
}

/// Find the next occurrence of an arbitrary literal.
#[inline]
pub fn find_literal(source: &str, literal: &str, from: usize) -> Option<usize> {
    memmem::find(tail(source, from), literal.as_bytes()).map(|i| i + from)
}

/// Find the last occurrence of a literal that starts before `before`.
#[inline]
pub fn rfind_literal(source: &str, literal: &str, before: usize) -> Option<usize> {
    let head = source.as_bytes().get(..before.min(source.len()))?;
    memmem::rfind(head, literal.as_bytes())
}
