//! Attribute surgery inside start delimiters
//!
//! All rewriting is scoped to the span between a tag's `<name` and its
//! first following `>`. Values are either quoted (`'` or `"`) and end at
//! the matching quote, or unquoted and end at `/`, whitespace, or `>`.

use super::splice::Edits;
use crate::core::scanner::{self, is_space};
use memchr::{memchr, memchr_iter};

/// The literal value of the first `attr_name=` at or after `from`.
pub fn get_attribute<'a>(source: &'a str, attr_name: &str, from: usize) -> Option<&'a str> {
    let needle = format!("{attr_name}=");
    let at = scanner::find_literal(source, &needle, from)?;
    let value_at = at + needle.len();
    value_span(source, value_at).map(|(start, end)| &source[start..end])
}

/// Bounds of the value whose first byte sits at `value_at`.
fn value_span(source: &str, value_at: usize) -> Option<(usize, usize)> {
    let bytes = source.as_bytes();
    let first = *bytes.get(value_at)?;

    if first == b'"' || first == b'\'' {
        let close = memchr(first, &bytes[value_at + 1..])? + value_at + 1;
        return Some((value_at + 1, close));
    }

    let mut end = value_at;
    while end < bytes.len() {
        let b = bytes[end];
        if b == b'/' || b == b'>' || is_space(b) {
            return Some((value_at, end));
        }
        end += 1;
    }
    None
}

/// One past the last byte of the value (closing quote included).
fn value_end(source: &str, value_at: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let first = *bytes.get(value_at)?;
    if first == b'"' || first == b'\'' {
        memchr(first, &bytes[value_at + 1..]).map(|i| i + value_at + 2)
    } else {
        value_span(source, value_at).map(|(_, end)| end)
    }
}

/// Remove `attr_name` and its value from every `tag_name` start delimiter,
/// together with the whitespace run before the attribute name.
pub fn strip_attribute(source: &str, tag_name: &str, attr_name: &str) -> String {
    let mut edits = Edits::new(source);
    let bytes = source.as_bytes();
    let needle = format!("{attr_name}=");
    let mut pos = 0;

    while let Some(m) = scanner::find_tag_start(source, tag_name, pos) {
        let gt = match scanner::next_gt(source, m.start) {
            Some(gt) => gt,
            None => {
                tracing::warn!(tag = tag_name, "incomplete tag, stopping");
                break;
            }
        };

        if let Some(at) = scanner::find_literal(source, &needle, m.start) {
            if at > m.start && at < gt {
                let value_at = at + needle.len();
                if let Some(end) = value_end(source, value_at) {
                    if end <= gt {
                        let mut cut = at;
                        while cut > m.start + 1 && is_space(bytes[cut - 1]) {
                            cut -= 1;
                        }
                        edits.delete(cut, end);
                    }
                }
            }
        }
        pos = gt + 1;
    }

    edits.apply()
}

/// [`strip_attribute`] over several tag names.
pub fn strip_attribute_from_tags(source: &str, tag_names: &[&str], attr_name: &str) -> String {
    tag_names.iter().fold(source.to_string(), |buffer, tag| {
        strip_attribute(&buffer, tag, attr_name)
    })
}

/// Rename an attribute inside every `tag_name` start delimiter.
///
/// A match must sit at a word boundary, be followed by `=`, and not lie
/// inside a quoted value, so `src` never matches `data-src` or quoted
/// text.
pub fn rename_attribute(source: &str, tag_name: &str, old_attr: &str, new_attr: &str) -> String {
    let mut edits = Edits::new(source);
    let bytes = source.as_bytes();
    let mut pos = 0;

    while let Some(m) = scanner::find_tag_start(source, tag_name, pos) {
        let gt = match scanner::next_gt(source, m.start) {
            Some(gt) => gt,
            None => {
                tracing::warn!(tag = tag_name, "incomplete tag, stopping");
                break;
            }
        };

        let mut at = m.delim;
        while let Some(found) = scanner::find_literal(source, old_attr, at) {
            if found >= gt {
                break;
            }
            at = found + 1;

            let bounded = found > m.start && is_space(bytes[found - 1]);
            let followed = bytes.get(found + old_attr.len()) == Some(&b'=');
            if bounded && followed && !in_quoted_value(source, m.start, found) {
                edits.replace(found, found + old_attr.len(), new_attr);
                break;
            }
        }
        pos = gt + 1;
    }

    edits.apply()
}

/// [`rename_attribute`] over several tag names.
pub fn rename_attribute_for_tags(
    source: &str,
    tag_names: &[&str],
    old_attr: &str,
    new_attr: &str,
) -> String {
    tag_names.iter().fold(source.to_string(), |buffer, tag| {
        rename_attribute(&buffer, tag, old_attr, new_attr)
    })
}

/// Quote parity between `from` and `at`: odd means `at` sits inside a
/// quoted value.
fn in_quoted_value(source: &str, from: usize, at: usize) -> bool {
    let span = &source.as_bytes()[from..at];
    memchr_iter(b'"', span).count() % 2 == 1 || memchr_iter(b'\'', span).count() % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_attribute_quoted() {
        let source = "<img src=\"a.png\" alt='pic'/>";
        assert_eq!(get_attribute(source, "src", 0), Some("a.png"));
        assert_eq!(get_attribute(source, "alt", 0), Some("pic"));
    }

    #[test]
    fn test_get_attribute_unquoted() {
        assert_eq!(get_attribute("<img src=a.png />", "src", 0), Some("a.png"));
        assert_eq!(get_attribute("<img src=a.png>", "src", 0), Some("a.png"));
    }

    #[test]
    fn test_get_attribute_missing() {
        assert_eq!(get_attribute("<img alt=\"x\"/>", "src", 0), None);
        assert_eq!(get_attribute("<img src=", "src", 0), None);
    }

    #[test]
    fn test_get_attribute_from_offset() {
        let source = "<a id=\"one\"/><a id=\"two\"/>";
        let second = source.rfind("<a").unwrap();
        assert_eq!(get_attribute(source, "id", second), Some("two"));
    }

    #[test]
    fn test_strip_attribute() {
        let source = "<div><img src=\"a.png\"/></div>";
        assert_eq!(strip_attribute(source, "img", "src"), "<div><img/></div>");
    }

    #[test]
    fn test_strip_attribute_keeps_others() {
        let source = "<img alt=\"x\" src=\"a\" width=\"3\"/>";
        assert_eq!(
            strip_attribute(source, "img", "src"),
            "<img alt=\"x\" width=\"3\"/>"
        );
    }

    #[test]
    fn test_strip_attribute_every_occurrence() {
        let source = "<img src=\"a\"/><p>x</p><img src=\"b\"/>";
        assert_eq!(
            strip_attribute(source, "img", "src"),
            "<img/><p>x</p><img/>"
        );
    }

    #[test]
    fn test_rename_attribute() {
        let source = "<img src=\"a\"/>";
        assert_eq!(
            rename_attribute(source, "img", "src", "href"),
            "<img href=\"a\"/>"
        );
    }

    #[test]
    fn test_rename_attribute_word_boundary() {
        let source = "<img data-src=\"a\" src=\"b\"/>";
        assert_eq!(
            rename_attribute(source, "img", "src", "href"),
            "<img data-src=\"a\" href=\"b\"/>"
        );
    }

    #[test]
    fn test_rename_attribute_skips_quoted_text() {
        let source = "<img alt=\"src=x\" src=\"b\"/>";
        assert_eq!(
            rename_attribute(source, "img", "src", "href"),
            "<img alt=\"src=x\" href=\"b\"/>"
        );
    }
}
