//! Markup Mutator
//!
//! Higher-level operations built on the boundary resolver: extract inner
//! content, strip tags (with or without their contents), convert to
//! singleton form, synthesize implicit end tags, reorder children, rename
//! tags, and rewrite attributes.
//!
//! Every operation takes the buffer by reference and returns a new buffer;
//! nothing is mutated in place. A batch operation that hits an
//! unresolvable tag stops processing that tag class, returns the buffer as
//! mutated so far, and flags the result incomplete instead of failing.

mod attrs;
pub(crate) mod splice;

pub use attrs::{
    get_attribute, rename_attribute, rename_attribute_for_tags, strip_attribute,
    strip_attribute_from_tags,
};

use crate::core::scanner::{self, is_space};
use crate::error::MarkupError;
use crate::resolve::{self, end_of_tag, end_of_tag_tolerant, tag_depth};
use memchr::memrchr;
use splice::Edits;

/// Outcome of a batch mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// The buffer as mutated so far.
    pub buffer: String,
    /// False when an unresolvable tag stopped the pass early.
    pub complete: bool,
}

/// Outcome of stripping tags together with their contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripOutcome {
    /// The buffer as mutated so far.
    pub buffer: String,
    /// Concatenation of the removed spans, leading whitespace included.
    pub discarded: String,
    /// False when an unresolvable tag stopped the pass early.
    pub complete: bool,
}

/// The text strictly between a tag's start delimiter and its matching end
/// delimiter.
///
/// `Ok(None)` when no start tag exists; `Ok(Some(""))` when start and end
/// coincide (singletons, empty elements).
pub fn inner_xml<'a>(
    source: &'a str,
    tag_name: &str,
    from: usize,
) -> Result<Option<&'a str>, MarkupError> {
    let start = match scanner::find_tag_start(source, tag_name, from) {
        Some(m) => m,
        None => return Ok(None),
    };
    let open_end = match scanner::next_gt(source, start.start) {
        Some(gt) => gt + 1,
        None => return Ok(None),
    };

    let end = end_of_tag(source, tag_name, start.start)?;
    if open_end >= end {
        return Ok(Some(""));
    }

    let close_start = match memrchr(b'<', &source.as_bytes()[..end]) {
        Some(lt) if lt >= open_end => lt,
        _ => return Ok(Some("")),
    };
    Ok(Some(&source[open_end..close_start]))
}

/// Remove a tag's delimiters but keep its content: every start delimiter
/// is deleted through its closing `>`, then every literal `</tag_name>`
/// is deleted.
pub fn strip_tag_keep_content(source: &str, tag_name: &str) -> String {
    let mut edits = Edits::new(source);
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut pos = 0;

    while let Some(m) = scanner::find_tag_start(source, tag_name, pos) {
        match scanner::next_gt(source, m.start) {
            Some(gt) => {
                edits.delete(m.start, gt + 1);
                spans.push((m.start, gt + 1));
                pos = gt + 1;
            }
            None => {
                tracing::warn!(tag = tag_name, "start delimiter without `>`, stopping");
                break;
            }
        }
    }

    let close = format!("</{tag_name}>");
    let mut from = 0;
    while let Some(at) = scanner::find_literal(source, &close, from) {
        // a close sitting inside an already deleted span goes with it
        if !spans.iter().any(|&(s, e)| at >= s && at < e) {
            edits.delete(at, at + close.len());
        }
        from = at + close.len();
    }

    edits.apply()
}

/// Strip every occurrence of a tag together with its contents.
///
/// With `top_level_only`, occurrences nested inside other elements
/// (depth >= 1) are left alone. The whitespace run before each removed
/// tag goes with it, and everything removed is returned in `discarded`.
pub fn strip_tag_and_content(source: &str, tag_name: &str, top_level_only: bool) -> StripOutcome {
    let mut edits = Edits::new(source);
    let mut discarded = String::new();
    let mut complete = true;
    let bytes = source.as_bytes();
    let mut pos = 0;

    while let Some(m) = scanner::find_tag_start(source, tag_name, pos) {
        if top_level_only {
            match tag_depth(source, m.start) {
                Ok(depth) if depth >= 1 => {
                    pos = m.start + 1;
                    continue;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(tag = tag_name, %err, "depth unresolvable, stopping strip");
                    complete = false;
                    break;
                }
            }
        }

        let end = match end_of_tag_tolerant(source, tag_name, m.start) {
            Some(end) => end,
            None => {
                complete = false;
                break;
            }
        };

        // the whitespace run before the start tag goes with it
        let mut cut = m.start;
        while cut > 0 && is_space(bytes[cut - 1]) {
            cut -= 1;
        }

        discarded.push_str(&source[cut..end]);
        edits.delete(cut, end);
        pos = end;
    }

    StripOutcome {
        buffer: edits.apply(),
        discarded,
        complete,
    }
}

/// Rewrite every non-singleton occurrence of a tag to self-closing form:
/// `/` is inserted before the start delimiter's `>`, and every literal
/// `</tag_name>` is removed.
pub fn convert_to_singleton(source: &str, tag_name: &str) -> String {
    let mut edits = Edits::new(source);
    let bytes = source.as_bytes();
    let mut pos = 0;

    while let Some(m) = scanner::find_tag_start(source, tag_name, pos) {
        match scanner::next_gt(source, m.start) {
            Some(gt) => {
                if bytes[gt - 1] != b'/' {
                    edits.insert(gt, "/");
                }
                pos = gt + 1;
            }
            None => {
                tracing::warn!(tag = tag_name, "start delimiter without `>`, stopping");
                break;
            }
        }
    }

    let close = format!("</{tag_name}>");
    let mut from = 0;
    while let Some(at) = scanner::find_literal(source, &close, from) {
        edits.delete(at, at + close.len());
        from = at + close.len();
    }

    edits.apply()
}

/// Insert explicit end tags for occurrences that are only implicitly
/// closed.
///
/// For each non-singleton occurrence with no matching `</tag_name>` before
/// the nearest pseudo-end marker, an end tag is synthesized immediately
/// before that marker. The close delimiter of the enclosing element also
/// acts as an implicit closer, so the last unterminated item of a list is
/// closed before its parent's end tag.
pub fn ensure_explicit_end_tag(source: &str, tag_name: &str, pseudo_end_markers: &[&str]) -> String {
    let mut edits = Edits::new(source);
    let bytes = source.as_bytes();
    let close = format!("</{tag_name}>");
    let mut pos = 0;

    while let Some(m) = scanner::find_tag_start(source, tag_name, pos) {
        let gt = match scanner::next_gt(source, m.start) {
            Some(gt) => gt,
            None => {
                tracing::warn!(tag = tag_name, "start delimiter without `>`, stopping");
                break;
            }
        };

        pos = m.start + 1;
        if bytes[gt - 1] == b'/' {
            continue;
        }

        let from = m.start + 1;
        let end_tag = scanner::find_literal(source, &close, from);

        let mut implicit = resolve::enclosing_close(source, gt + 1);
        for marker in pseudo_end_markers {
            if let Some(next) = scanner::find_tag_start(source, marker, from) {
                if implicit.map_or(true, |cur| next.start < cur) {
                    implicit = Some(next.start);
                }
            }
        }

        let insert_at = match (end_tag, implicit) {
            (None, Some(p)) => Some(p),
            (Some(e), Some(p)) if e > p => Some(p),
            _ => None,
        };
        if let Some(at) = insert_at {
            edits.insert(at, &close);
        }
    }

    edits.apply()
}

/// Hoist every `inner_tag` element to be the first child content of each
/// `outer_tag` occurrence, recursing into the remaining content for nested
/// `outer_tag` occurrences. Content is only reordered; the buffer length
/// never changes.
pub fn move_tag_first_under(source: &str, outer_tag: &str, inner_tag: &str) -> EditOutcome {
    let mut buffer = source.to_string();
    let mut complete = true;
    let mut pos = 0;

    while let Some(m) = scanner::find_tag_start(&buffer, outer_tag, pos) {
        let gt = match scanner::next_gt(&buffer, m.start) {
            Some(gt) => gt,
            None => {
                tracing::warn!(tag = outer_tag, "start delimiter without `>`, stopping");
                complete = false;
                break;
            }
        };
        if buffer.as_bytes()[gt - 1] == b'/' {
            pos = gt + 1;
            continue;
        }

        let end = match end_of_tag_tolerant(&buffer, outer_tag, m.start) {
            Some(end) => end,
            None => {
                complete = false;
                break;
            }
        };

        // start of the closing delimiter
        let close_start = match scanner::rfind_literal(&buffer, "</", end) {
            Some(at) if at > gt => at,
            _ => {
                pos = end.max(m.start + 1);
                continue;
            }
        };

        let content = &buffer[gt + 1..close_start];
        let stripped = strip_tag_and_content(content, inner_tag, true);
        if !stripped.complete {
            complete = false;
        }
        let moved = move_tag_first_under(&stripped.buffer, outer_tag, inner_tag);
        if !moved.complete {
            complete = false;
        }

        let mut next = String::with_capacity(buffer.len());
        next.push_str(&buffer[..gt + 1]);
        next.push_str(&stripped.discarded);
        next.push_str(&moved.buffer);
        next.push_str(&buffer[close_start..]);
        buffer = next;
        pos = end;
    }

    EditOutcome { buffer, complete }
}

/// Rename a tag by literal delimiter substitution. Only the five delimiter
/// forms are touched, so names that are substrings of longer names are
/// left alone.
pub fn rename_tag(source: &str, old_name: &str, new_name: &str) -> String {
    let mut out = source.replace(&format!("<{old_name}\t"), &format!("<{new_name}\t"));
    out = out.replace(&format!("<{old_name} "), &format!("<{new_name} "));
    out = out.replace(&format!("<{old_name}>"), &format!("<{new_name}>"));
    out = out.replace(&format!("<{old_name}/>"), &format!("<{new_name}/>"));
    out.replace(&format!("</{old_name}>"), &format!("</{new_name}>"))
}

/// Rename `old_name` to `new_name` only inside the spans of `scope_tag`
/// occurrences.
pub fn rename_tag_under(source: &str, scope_tag: &str, old_name: &str, new_name: &str) -> String {
    let mut buffer = source.to_string();
    let mut pos = 0;

    while let Some(m) = scanner::find_tag_start(&buffer, scope_tag, pos) {
        if let Some(end) = end_of_tag_tolerant(&buffer, scope_tag, m.start) {
            let renamed = rename_tag(&buffer[m.start..end], old_name, new_name);
            let mut next = String::with_capacity(buffer.len() + renamed.len());
            next.push_str(&buffer[..m.start]);
            next.push_str(&renamed);
            next.push_str(&buffer[end..]);
            buffer = next;
        }
        pos = m.start + 1;
    }

    buffer
}

/// Delete every `chunk_start ... chunk_end` region, contents included.
pub fn strip_chunks(source: &str, chunk_start: &str, chunk_end: &str) -> String {
    let mut edits = Edits::new(source);
    let mut pos = 0;

    while let Some(s) = scanner::find_literal(source, chunk_start, pos) {
        match scanner::find_literal(source, chunk_end, s) {
            Some(e) => {
                edits.delete(s, e + chunk_end.len());
                pos = e + chunk_end.len();
            }
            None => {
                tracing::warn!(open = chunk_start, "chunk without an end, stopping");
                break;
            }
        }
    }
    edits.apply()
}

/// Delete every `<...>` delimiter region, keeping text content.
pub fn strip_all_tags(source: &str) -> String {
    strip_chunks(source, "<", ">")
}

/// Remove every tag together with its contents: processing instructions
/// and comments first, then whole elements from each generic tag start.
pub fn strip_tags_and_contents(source: &str) -> String {
    let mut buffer = strip_chunks(source, "<?", "?>");
    buffer = strip_chunks(&buffer, "<!--", "-->");

    let mut edits = Edits::new(&buffer);
    let mut pos = 0;
    while let Some(start) = scanner::find_any_tag_start(&buffer, pos) {
        match end_of_any_element(&buffer, start) {
            Some(end) => {
                edits.delete(start, end);
                pos = end;
            }
            None => {
                tracing::warn!("element without a usable end, stopping");
                break;
            }
        }
    }
    edits.apply()
}

/// End offset (exclusive) of the element whose generic start sits at
/// `start`, with no name specificity: any `/>` closes one level, any
/// `</...>` closes one level, any generic start opens one.
fn end_of_any_element(source: &str, start: usize) -> Option<usize> {
    let scan_from = start + 1;
    let mut singleton = scanner::find_singleton_close(source, scan_from);
    let mut close = scanner::find_generic_close(source, scan_from);
    let mut open = scanner::find_any_tag_start(source, scan_from);

    // a `/>` ahead of everything belongs to the start itself
    if let Some(s) = singleton {
        let before_open = open.map_or(true, |o| s < o);
        let before_close = close.map_or(true, |c| s < c);
        if before_open && before_close {
            return Some(s + 2);
        }
    }

    let mut open_count = 1i32;
    while open_count > 0 {
        let c = close?;

        let singleton_first =
            singleton.map_or(false, |s| s < c && open.map_or(true, |o| s < o));
        let open_first = open.map_or(false, |o| o < c && singleton.map_or(true, |s| o < s));

        if singleton_first {
            if let Some(s) = singleton {
                open_count -= 1;
                singleton = scanner::find_singleton_close(source, s + 2);
            }
        } else if open_first {
            if let Some(o) = open {
                open_count += 1;
                open = scanner::find_any_tag_start(source, o + 2);
            }
        } else {
            open_count -= 1;
            if open_count > 0 {
                close = scanner::find_generic_close(source, c + 2);
            }
        }
    }

    let c = close?;
    scanner::next_gt(source, c).map(|gt| gt + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_xml_simple() {
        let source = "<p>Hello <b>world</b>!</p>";
        assert_eq!(inner_xml(source, "b", 0).unwrap(), Some("world"));
        assert_eq!(inner_xml(source, "p", 0).unwrap(), Some("Hello <b>world</b>!"));
    }

    #[test]
    fn test_inner_xml_absent_and_empty() {
        assert_eq!(inner_xml("<p>x</p>", "q", 0).unwrap(), None);
        assert_eq!(inner_xml("<b></b>", "b", 0).unwrap(), Some(""));
        assert_eq!(inner_xml("<b/>", "b", 0).unwrap(), Some(""));
    }

    #[test]
    fn test_inner_xml_nesting_consistent() {
        let source = "<div>a<div>b</div>c</div>";
        let inner = inner_xml(source, "div", 0).unwrap().unwrap();
        assert_eq!(inner, "a<div>b</div>c");
        // the extracted interior carries no unmatched occurrence
        assert!(end_of_tag(inner, "div", 0).is_ok());
    }

    #[test]
    fn test_strip_tag_keep_content() {
        let source = "<p>Hello <b>world</b>!</p>";
        assert_eq!(strip_tag_keep_content(source, "b"), "<p>Hello world!</p>");
    }

    #[test]
    fn test_strip_tag_keep_content_singleton() {
        assert_eq!(strip_tag_keep_content("a<br/>b", "br"), "ab");
    }

    #[test]
    fn test_strip_tag_and_content() {
        let source = "<p>keep</p> <script>no</script> <p>more</p>";
        let out = strip_tag_and_content(source, "script", false);
        assert!(out.complete);
        assert_eq!(out.buffer, "<p>keep</p> <p>more</p>");
        assert_eq!(out.discarded, " <script>no</script>");
    }

    #[test]
    fn test_strip_tag_and_content_top_level_only() {
        let source = "<a>one</a> <wrap><a>two</a></wrap>";
        let out = strip_tag_and_content(source, "a", true);
        assert!(out.complete);
        assert_eq!(out.buffer, " <wrap><a>two</a></wrap>");
        assert_eq!(out.discarded, "<a>one</a>");
    }

    #[test]
    fn test_strip_tag_and_content_idempotent() {
        let source = "<p>x</p><cut>y</cut>";
        let once = strip_tag_and_content(source, "cut", false);
        let twice = strip_tag_and_content(&once.buffer, "cut", false);
        assert_eq!(once.buffer, twice.buffer);
        assert!(twice.discarded.is_empty());
        assert!(twice.complete);
    }

    #[test]
    fn test_strip_tag_and_content_incomplete() {
        let source = "<p>x</p><cut>never closed";
        let out = strip_tag_and_content(source, "cut", false);
        assert!(!out.complete);
        assert_eq!(out.buffer, source);
    }

    #[test]
    fn test_convert_to_singleton() {
        assert_eq!(convert_to_singleton("<a><b>x</b></a>", "b"), "<a><b/>x</a>");
        // already-singleton occurrences are left alone
        assert_eq!(convert_to_singleton("<b/><b>y</b>", "b"), "<b/><b/>y");
    }

    #[test]
    fn test_ensure_explicit_end_tag_list() {
        let source = "<ul><li>A<li>B</ul>";
        let out = ensure_explicit_end_tag(source, "li", &["li"]);
        assert_eq!(out, "<ul><li>A</li><li>B</li></ul>");
    }

    #[test]
    fn test_ensure_explicit_end_tag_well_formed_untouched() {
        let source = "<ul><li>A</li><li>B</li></ul>";
        assert_eq!(ensure_explicit_end_tag(source, "li", &["li"]), source);
    }

    #[test]
    fn test_ensure_explicit_end_tag_nested_element_kept_whole() {
        let source = "<ul><li>A<em>x</em><li>B</ul>";
        let out = ensure_explicit_end_tag(source, "li", &["li"]);
        assert_eq!(out, "<ul><li>A<em>x</em></li><li>B</li></ul>");
    }

    #[test]
    fn test_move_tag_first_under() {
        let source = "<post><body>b</body><tag>t</tag></post>";
        let out = move_tag_first_under(source, "post", "tag");
        assert!(out.complete);
        assert_eq!(out.buffer, "<post><tag>t</tag><body>b</body></post>");
    }

    #[test]
    fn test_move_tag_first_under_recurses() {
        let source = "<post><body>x</body><tag>a</tag><post><body>y</body><tag>b</tag></post></post>";
        let out = move_tag_first_under(source, "post", "tag");
        assert!(out.complete);
        assert_eq!(
            out.buffer,
            "<post><tag>a</tag><body>x</body><post><tag>b</tag><body>y</body></post></post>"
        );
    }

    #[test]
    fn test_rename_tag_round_trip() {
        let source = "<a href=\"x\">1</a><a>2</a><a/><ab>3</ab>";
        let renamed = rename_tag(source, "a", "z");
        assert_eq!(renamed, "<z href=\"x\">1</z><z>2</z><z/><ab>3</ab>");
        assert_eq!(rename_tag(&renamed, "z", "a"), source);
    }

    #[test]
    fn test_rename_tag_under_scope() {
        let source = "<b>out</b><scope><b>in</b></scope>";
        let out = rename_tag_under(source, "scope", "b", "strong");
        assert_eq!(out, "<b>out</b><scope><strong>in</strong></scope>");
    }

    #[test]
    fn test_strip_chunks_and_all_tags() {
        assert_eq!(strip_chunks("a<?pi x?>b<?y?>c", "<?", "?>"), "abc");
        assert_eq!(strip_all_tags("<p>Hello <b>world</b>!</p>"), "Hello world!");
    }

    #[test]
    fn test_strip_tags_and_contents() {
        assert_eq!(strip_tags_and_contents("x<p>y</p>z<i/>w"), "xzw");
        assert_eq!(strip_tags_and_contents("a<!-- c -->b<?pi?>c"), "abc");
        assert_eq!(
            strip_tags_and_contents("keep <div><img/><p>x</p></div> this"),
            "keep  this"
        );
    }
}
