//! Ignored-region classification for CDATA payloads
//!
//! Literal CDATA content may contain tag-like byte sequences that must not
//! count as structure. A candidate match is discarded when it falls inside
//! the most recent unterminated `<![CDATA[` span.

use memchr::memmem;

/// True iff `offset` lies strictly inside an unterminated CDATA span:
/// the nearest `<![CDATA[` at or before `offset` exists and is not
/// followed by a `]]>` before `offset`.
pub fn in_cdata(source: &str, offset: usize) -> bool {
    let bound = (offset + 1).min(source.len());
    let head = &source.as_bytes()[..bound];

    match memmem::rfind(head, b"<![CDATA[") {
        Some(open) => match memmem::rfind(head, b"]]>") {
            Some(close) => close < open,
            None => true,
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inside_open_cdata() {
        let source = "<a><![CDATA[ <b> ]]></a>";
        let lt_b = source.find("<b>").unwrap();
        assert!(in_cdata(source, lt_b));
    }

    #[test]
    fn test_after_close() {
        let source = "<a><![CDATA[ x ]]><b></a>";
        let lt_b = source.find("<b>").unwrap();
        assert!(!in_cdata(source, lt_b));
    }

    #[test]
    fn test_no_cdata_at_all() {
        assert!(!in_cdata("<a><b></b></a>", 4));
    }

    #[test]
    fn test_second_span_reopens() {
        let source = "<![CDATA[ x ]]> y <![CDATA[ <z> ]]>";
        let lt_z = source.find("<z>").unwrap();
        assert!(in_cdata(source, lt_z));
        assert!(!in_cdata(source, 16));
    }
}
