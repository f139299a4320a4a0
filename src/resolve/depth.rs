//! Tag depth calculation
//!
//! Rescans everything before an offset and counts unmatched generic opens
//! minus generic closes, with the same singleton awareness as the boundary
//! resolver: a `<tag .../>` contributes nothing.

use crate::core::scanner::{find_any_tag_start, find_generic_close, find_singleton_close};
use crate::error::{snippet, MarkupError};

/// Nesting depth of `offset`: the number of elements opened before it in
/// `source[..offset]` that have not closed yet.
///
/// Returns `MismatchedTree` when the prefix closes an element it never
/// opened, instead of silently returning a wrong count.
pub fn tag_depth(source: &str, offset: usize) -> Result<usize, MarkupError> {
    let bound = offset.min(source.len());
    let mut depth = 0i32;
    let mut next_open = below(find_any_tag_start(source, 0), bound);
    let mut next_close = below(find_generic_close(source, 0), bound);

    while next_open.is_some() || next_close.is_some() {
        let close_first = match (next_close, next_open) {
            (Some(c), Some(o)) => c < o,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if close_first {
            if let Some(c) = next_close {
                depth -= 1;
                if depth < 0 {
                    return Err(MarkupError::MismatchedTree {
                        context: snippet(source, c),
                    });
                }
                next_close = below(find_generic_close(source, c + 1), bound);
            }
        } else if let Some(o) = next_open {
            depth += 1;
            // A `/>` ahead of both the next open and the next close belongs
            // to this tag: take the increment back out.
            let singleton = below(find_singleton_close(source, o + 2), bound);
            next_open = below(find_any_tag_start(source, o + 1), bound);
            if let Some(s) = singleton {
                let before_open = next_open.map_or(true, |n| s < n);
                let before_close = next_close.map_or(true, |n| s < n);
                if before_open && before_close {
                    depth -= 1;
                }
            }
        }
    }

    Ok(depth as usize)
}

#[inline]
fn below(m: Option<usize>, bound: usize) -> Option<usize> {
    m.filter(|&i| i < bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_zero_outside() {
        let source = "<a>x</a> here";
        assert_eq!(tag_depth(source, 9).unwrap(), 0);
        assert_eq!(tag_depth(source, 0).unwrap(), 0);
    }

    #[test]
    fn test_depth_counts_ancestors() {
        let source = "<a><b><c>deep</c></b></a>";
        let c_at = source.find("<c>").unwrap();
        assert_eq!(tag_depth(source, c_at).unwrap(), 2);
        let deep_at = source.find("deep").unwrap();
        assert_eq!(tag_depth(source, deep_at).unwrap(), 3);
    }

    #[test]
    fn test_singleton_does_not_add_depth() {
        // <a><b/></a>: at the offset of <b/> the depth is 1, not 2
        let source = "<a><b/></a>";
        let b_at = source.find("<b/>").unwrap();
        assert_eq!(tag_depth(source, b_at).unwrap(), 1);
        let close_at = source.find("</a>").unwrap();
        assert_eq!(tag_depth(source, close_at).unwrap(), 1);
    }

    #[test]
    fn test_depth_after_singleton_run() {
        let source = "<div><img/><img/><p>x</p></div>y";
        assert_eq!(tag_depth(source, source.len() - 1).unwrap(), 0);
        let p_at = source.find("<p>").unwrap();
        assert_eq!(tag_depth(source, p_at).unwrap(), 1);
    }

    #[test]
    fn test_close_without_open_is_mismatched() {
        assert!(matches!(
            tag_depth("</a><a>", 7),
            Err(MarkupError::MismatchedTree { .. })
        ));
    }
}
