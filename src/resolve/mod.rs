//! Tag Boundary Resolver
//!
//! Given a tag name and a starting offset, finds the offset one past the
//! tag's true end directly on the raw text. Handles:
//! - singleton tags (`<img/>`), which carry no separate end delimiter
//! - nested same-named tags via depth counting
//! - the special forms `<?xml ...>`, `<![CDATA[ ... ]]>`, `<!-- ... -->`
//! - tag-like noise inside CDATA, skipped via the ignored-region classifier
//!
//! Two entry points share one engine: [`end_of_tag`] raises a typed
//! [`MarkupError`] on malformed markup; [`end_of_tag_tolerant`] returns
//! `None` instead, so a batch pass over imperfect HTML is never aborted.

mod depth;

pub use depth::tag_depth;

use crate::core::cdata::in_cdata;
use crate::core::scanner::{
    find_any_tag_start, find_cdata_close, find_cdata_open, find_comment_close, find_comment_open,
    find_complex_close, find_singleton_close, find_tag_start, find_xml_decl, next_gt, TagStart,
};
use crate::error::{snippet, MarkupError};

/// Closing discipline for a tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagClass {
    /// `<?xml ...>`: the next `>` closes it, no nesting.
    XmlDecl,
    /// `<![CDATA[ ... ]]>`: the next `]]>` closes it, no nesting.
    Cdata,
    /// `<!-- ... -->`: the next `-->` closes it, no nesting.
    Comment,
    /// Everything else: nested same-named resolution.
    Named,
}

impl TagClass {
    fn of(tag_name: &str) -> TagClass {
        if tag_name == "?xml" {
            TagClass::XmlDecl
        } else if tag_name.starts_with("![CDATA[") {
            TagClass::Cdata
        } else if tag_name == "!--" {
            TagClass::Comment
        } else {
            TagClass::Named
        }
    }
}

/// The next structural event while resolving a named tag.
///
/// Classifying each candidate up front keeps the "a singleton cancels a
/// nested open" rule as data instead of nested conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    /// `</name>`: one level closes.
    Close(usize),
    /// A nested `<name` that turns out to self-close: net zero depth.
    SingletonOpen(usize),
    /// A nested `<name` that opens a real level.
    TrueOpen(usize),
}

/// Strict resolution: the offset one past the end of the `tag_name`
/// occurrence starting at or after `start`.
///
/// The returned offset points just past the closing `>` (or past the `/>`
/// for a singleton), so `source[..end]` covers the whole tag.
pub fn end_of_tag(source: &str, tag_name: &str, start: usize) -> Result<usize, MarkupError> {
    resolve_end(source, tag_name, start)
}

/// Tolerant resolution: `None` instead of an error, with a warning logged.
pub fn end_of_tag_tolerant(source: &str, tag_name: &str, start: usize) -> Option<usize> {
    match resolve_end(source, tag_name, start) {
        Ok(end) => Some(end),
        Err(err) => {
            tracing::warn!(tag = tag_name, %err, "skipping unresolvable tag");
            None
        }
    }
}

/// Offset of the next start delimiter for `tag_name` at or after `from`.
pub fn start_of_tag(source: &str, tag_name: &str, from: usize) -> Option<usize> {
    match TagClass::of(tag_name) {
        TagClass::XmlDecl => find_xml_decl(source, from).map(|m| m.start),
        TagClass::Cdata => find_cdata_open(source, from),
        TagClass::Comment => find_comment_open(source, from),
        TagClass::Named => find_tag_start(source, tag_name, from).map(|m| m.start),
    }
}

fn resolve_end(source: &str, tag_name: &str, start: usize) -> Result<usize, MarkupError> {
    let no_start = || MarkupError::NoStartTag {
        name: tag_name.to_string(),
        context: snippet(source, start),
    };

    match TagClass::of(tag_name) {
        TagClass::XmlDecl => {
            let open = find_xml_decl(source, start).ok_or_else(no_start)?;
            next_gt(source, open.delim)
                .map(|gt| gt + 1)
                .ok_or_else(|| no_end(source, tag_name, open.start))
        }
        TagClass::Cdata => {
            let open = find_cdata_open(source, start).ok_or_else(no_start)?;
            find_cdata_close(source, open + 9)
                .map(|close| close + 3)
                .ok_or_else(|| no_end(source, tag_name, open))
        }
        TagClass::Comment => {
            let open = find_comment_open(source, start).ok_or_else(no_start)?;
            find_comment_close(source, open + 4)
                .map(|close| close + 3)
                .ok_or_else(|| no_end(source, tag_name, open))
        }
        TagClass::Named => resolve_named(source, tag_name, start),
    }
}

fn resolve_named(source: &str, name: &str, start: usize) -> Result<usize, MarkupError> {
    let open = next_named_start(source, name, start).ok_or_else(|| MarkupError::NoStartTag {
        name: name.to_string(),
        context: snippet(source, start),
    })?;

    // Scan from the delimiter character of our own start tag. For a
    // self-closing `<name/>` the delimiter is the `/`, so the singleton
    // check below sees its own `/>`.
    let scan_from = open.delim;

    let mut close = next_close(source, name, scan_from);
    let first_singleton = next_singleton(source, scan_from);
    let first_any = next_any_start(source, scan_from);

    // Singleton form: a `/>` ahead of both the next generic start and the
    // next same-named close belongs to our own start tag.
    if let Some(sc) = first_singleton {
        let before_any = first_any.map_or(true, |a| sc < a);
        let before_close = close.map_or(true, |c| sc < c);
        if before_any && before_close {
            return Ok(sc + 2);
        }
    }

    let mut nested = next_named_start(source, name, scan_from);
    let mut open_count = 1u32;

    loop {
        let candidate = match (close, nested) {
            (None, _) => return Err(no_end(source, name, open.start)),
            (Some(c), None) => Candidate::Close(c),
            (Some(c), Some(n)) if c < n.start => Candidate::Close(c),
            (Some(c), Some(n)) => classify_open(source, n, c),
        };

        match candidate {
            Candidate::Close(c) => {
                open_count -= 1;
                if open_count == 0 {
                    return finish(source, name, scan_from, c);
                }
                close = next_close(source, name, c + 1);
            }
            Candidate::SingletonOpen(n) => {
                nested = next_named_start(source, name, n + 2);
            }
            Candidate::TrueOpen(n) => {
                open_count += 1;
                nested = next_named_start(source, name, n + 2);
            }
        }
    }
}

/// Decide whether a nested same-named start self-closes: a `/>` ahead of
/// the pending close AND ahead of the next generic start belongs to this
/// open, so it contributes no depth.
fn classify_open(source: &str, open: TagStart, close: usize) -> Candidate {
    let singleton = next_singleton(source, open.start + 1);
    let any = next_any_start(source, open.start + 1);
    match singleton {
        Some(s) if s < close && any.map_or(true, |a| s < a) => Candidate::SingletonOpen(open.start),
        _ => Candidate::TrueOpen(open.start),
    }
}

/// Accept the final close: verify every element opened inside the span
/// also closed inside it, then extend past the `>` that follows the close
/// delimiter.
fn finish(
    source: &str,
    name: &str,
    content_from: usize,
    close_at: usize,
) -> Result<usize, MarkupError> {
    if generic_delta(source, content_from, close_at) != 0 {
        return Err(MarkupError::MismatchedTree {
            context: snippet(source, close_at),
        });
    }
    next_gt(source, close_at)
        .map(|gt| gt + 1)
        .ok_or_else(|| no_end(source, name, close_at))
}

fn no_end(source: &str, tag_name: &str, at: usize) -> MarkupError {
    MarkupError::NoEndTag {
        name: tag_name.to_string(),
        context: snippet(source, at),
    }
}

/// Net generic opens minus closes in `source[from..to)`, with self-closing
/// tags contributing zero. A non-zero result over a resolved span means an
/// element opened inside it never closed (or closed one it never opened).
fn generic_delta(source: &str, from: usize, to: usize) -> i32 {
    let mut delta = 0i32;
    let mut next_open = below(next_any_start(source, from), to);
    let mut pending_close = below(next_generic_close(source, from), to);

    while next_open.is_some() || pending_close.is_some() {
        let close_first = match (pending_close, next_open) {
            (Some(c), Some(o)) => c < o,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if close_first {
            if let Some(c) = pending_close {
                delta -= 1;
                pending_close = below(next_generic_close(source, c + 1), to);
            }
        } else if let Some(o) = next_open {
            delta += 1;
            let singleton = below(next_singleton(source, o + 2), to);
            next_open = below(next_any_start(source, o + 1), to);
            if let Some(s) = singleton {
                let before_open = next_open.map_or(true, |n| s < n);
                let before_close = pending_close.map_or(true, |n| s < n);
                if before_open && before_close {
                    delta -= 1;
                }
            }
        }
    }
    delta
}

#[inline]
fn below(m: Option<usize>, bound: usize) -> Option<usize> {
    m.filter(|&i| i < bound)
}

// Scanner wrappers that discard matches inside CDATA payloads. Both
// resolution modes use them, so ignored regions are honored uniformly.

fn next_named_start(source: &str, name: &str, from: usize) -> Option<TagStart> {
    let mut pos = from;
    while let Some(found) = find_tag_start(source, name, pos) {
        if in_cdata(source, found.start) {
            pos = found.start + 1;
        } else {
            return Some(found);
        }
    }
    None
}

fn next_close(source: &str, name: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(found) = find_complex_close(source, name, pos) {
        if in_cdata(source, found) {
            pos = found + 1;
        } else {
            return Some(found);
        }
    }
    None
}

fn next_singleton(source: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(found) = find_singleton_close(source, pos) {
        if in_cdata(source, found) {
            pos = found + 1;
        } else {
            return Some(found);
        }
    }
    None
}

fn next_any_start(source: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(found) = find_any_tag_start(source, pos) {
        if in_cdata(source, found) {
            pos = found + 1;
        } else {
            return Some(found);
        }
    }
    None
}

/// Offset of the close delimiter that ends the element enclosing `from`,
/// found by a forward singleton-aware scan. Used when an unterminated tag
/// must be closed before its parent ends.
pub(crate) fn enclosing_close(source: &str, from: usize) -> Option<usize> {
    let mut open_count = 0i32;
    let mut next_open = next_any_start(source, from);
    let mut pending_close = next_generic_close(source, from);

    while next_open.is_some() || pending_close.is_some() {
        let close_first = match (pending_close, next_open) {
            (Some(c), Some(o)) => c < o,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if close_first {
            if let Some(c) = pending_close {
                if open_count == 0 {
                    return Some(c);
                }
                open_count -= 1;
                pending_close = next_generic_close(source, c + 1);
            }
        } else if let Some(o) = next_open {
            open_count += 1;
            let singleton = next_singleton(source, o + 2);
            next_open = next_any_start(source, o + 1);
            if let Some(s) = singleton {
                let before_open = next_open.map_or(true, |n| s < n);
                let before_close = pending_close.map_or(true, |n| s < n);
                if before_open && before_close {
                    open_count -= 1;
                }
            }
        }
    }
    None
}

fn next_generic_close(source: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(found) = crate::core::scanner::find_generic_close(source, pos) {
        if in_cdata(source, found) {
            pos = found + 1;
        } else {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_pair() {
        let source = "<a>text</a> tail";
        assert_eq!(end_of_tag(source, "a", 0).unwrap(), 11);
    }

    #[test]
    fn test_singleton() {
        let source = "<a/> tail";
        assert_eq!(end_of_tag(source, "a", 0).unwrap(), 4);
        let source = "<a href=\"x\"/> tail";
        assert_eq!(end_of_tag(source, "a", 0).unwrap(), 13);
    }

    #[test]
    fn test_nested_same_name() {
        let source = "<a>1<a>2</a>3</a>!";
        assert_eq!(end_of_tag(source, "a", 0).unwrap(), 17);
    }

    #[test]
    fn test_nested_singleton_does_not_count() {
        // <a><b/></a>: b self-closes and must not unbalance a
        let source = "<a><b/></a>";
        assert_eq!(end_of_tag(source, "a", 0).unwrap(), source.len());
        // same-named singleton nested inside
        let source = "<a><a/></a>";
        assert_eq!(end_of_tag(source, "a", 0).unwrap(), source.len());
    }

    #[test]
    fn test_end_extends_past_spaced_close() {
        let source = "<a>x</a >";
        // `</a>` literal never matches `</a >`; there is no usable close
        assert!(matches!(
            end_of_tag(source, "a", 0),
            Err(MarkupError::NoEndTag { .. })
        ));
    }

    #[test]
    fn test_no_start_tag() {
        assert!(matches!(
            end_of_tag("<b></b>", "a", 0),
            Err(MarkupError::NoStartTag { .. })
        ));
    }

    #[test]
    fn test_no_end_tag() {
        assert!(matches!(
            end_of_tag("<a><a></a>", "a", 0),
            Err(MarkupError::NoEndTag { .. })
        ));
    }

    #[test]
    fn test_mismatched_tree() {
        assert!(matches!(
            end_of_tag("<a><b></a>", "a", 0),
            Err(MarkupError::MismatchedTree { .. })
        ));
    }

    #[test]
    fn test_tolerant_returns_none() {
        assert_eq!(end_of_tag_tolerant("<a><b></a>", "a", 0), None);
        assert_eq!(end_of_tag_tolerant("<a>x", "a", 0), None);
        assert_eq!(end_of_tag_tolerant("<a>x</a>", "a", 0), Some(8));
    }

    #[test]
    fn test_xml_declaration() {
        let source = "<?xml version=\"1.0\"?><a/>";
        assert_eq!(end_of_tag(source, "?xml", 0).unwrap(), 21);
    }

    #[test]
    fn test_comment_form() {
        let source = "x<!-- <a> not a tag --><a/>";
        assert_eq!(end_of_tag(source, "!--", 0).unwrap(), 23);
    }

    #[test]
    fn test_cdata_form() {
        let source = "<![CDATA[ raw <b> ]]>rest";
        assert_eq!(end_of_tag(source, "![CDATA[", 0).unwrap(), 21);
    }

    #[test]
    fn test_close_inside_cdata_is_ignored() {
        let source = "<a><![CDATA[ </a> ]]>x</a>";
        assert_eq!(end_of_tag(source, "a", 0).unwrap(), source.len());
    }

    #[test]
    fn test_start_of_tag() {
        let source = "x <p>y</p> <!-- c -->";
        assert_eq!(start_of_tag(source, "p", 0), Some(2));
        assert_eq!(start_of_tag(source, "!--", 0), Some(11));
        assert_eq!(start_of_tag(source, "q", 0), None);
    }

    #[test]
    fn test_enclosing_close() {
        let source = "<ul><li>A<em>x</em><li>B</ul>";
        // the unterminated second `<li` keeps a level open past `</ul>`
        let after_first_li = 8;
        assert_eq!(enclosing_close(source, after_first_li), None);
        // from just after the second `<li>`, `</ul>` ends the parent
        let after_second_li = 23;
        assert_eq!(enclosing_close(source, after_second_li), Some(24));
    }
}
