//! Comment and quote location
//!
//! Small scanners independent of the tag resolver, for callers that must
//! not edit inside quoted strings or comments. Three comment styles are
//! recognized: block (`/* */`), line (`//` to end of line), and markup
//! (`<!-- -->`).

use crate::text::count_between;
use memchr::{memmem, memrchr};

/// True iff the count of `"` characters before `offset` is odd.
pub fn in_quote(source: &str, offset: usize) -> bool {
    count_between(source, "\"", 0, offset) % 2 == 1
}

/// True iff `offset` lies inside any of the three comment styles.
pub fn in_comment(source: &str, offset: usize) -> bool {
    inside(source, offset, "/*", "*/")
        || inside(source, offset, "//", "\n")
        || inside(source, offset, "<!--", "-->")
}

fn inside(source: &str, offset: usize, open: &str, close: &str) -> bool {
    let bound = offset.min(source.len());
    let head = &source.as_bytes()[..bound];
    match memmem::rfind(head, open.as_bytes()) {
        Some(o) => match memmem::rfind(head, close.as_bytes()) {
            Some(c) => c < o,
            None => true,
        },
        None => false,
    }
}

/// The span of the comment around `offset`: `(start, end)` with `end` one
/// past the closing delimiter, or the end of the buffer when the comment
/// never closes. Line comments own their whole line.
///
/// When several openers precede the offset the nearest wins, with
/// block taking precedence over line, and line over markup.
pub fn comment_span(source: &str, offset: usize) -> Option<(usize, usize)> {
    let start = comment_start(source, offset)?;

    let close: &str = if source[start..].starts_with("/*") {
        "*/"
    } else if source[start..].starts_with("<!--") {
        "-->"
    } else {
        "\n"
    };

    let end = memmem::find(&source.as_bytes()[offset.min(source.len())..], close.as_bytes())
        .map_or(source.len(), |i| i + offset + close.len());
    Some((start, end))
}

fn comment_start(source: &str, offset: usize) -> Option<usize> {
    let bound = offset.min(source.len());
    let head = &source.as_bytes()[..bound];

    let block = memmem::rfind(head, b"/*");
    let line = memmem::rfind(head, b"//");
    let markup = memmem::rfind(head, b"<!--");

    if let Some(b) = block {
        if line.map_or(true, |l| l < b) && markup.map_or(true, |m| m < b) {
            return Some(b);
        }
    }
    if let Some(l) = line {
        if markup.map_or(true, |m| m < l) {
            // the line comment owns its whole line
            return Some(memrchr(b'\n', &source.as_bytes()[..l]).map_or(0, |n| n + 1));
        }
    }
    markup
}
