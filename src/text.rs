//! General string utilities
//!
//! Word-boundary search, line trimming, padding, and quote-aware
//! splitting. These sit beside the markup operations for callers doing
//! surgery on surrounding plain text.

use crate::core::scanner::find_literal;
use memchr::{memchr_iter, memrchr};

/// Characters that break a word: control, whitespace, ASCII punctuation.
pub fn is_breaker_char(c: char) -> bool {
    c.is_control() || c.is_whitespace() || c.is_ascii_punctuation()
}

/// Byte offsets of whole-word occurrences of `word`: matches bounded by
/// breaker characters or the buffer edges.
pub fn word_instances(source: &str, word: &str) -> Vec<usize> {
    let mut instances = Vec::new();
    if word.is_empty() {
        return instances;
    }

    let mut from = 0;
    while let Some(at) = find_literal(source, word, from) {
        let prev_ok = source[..at].chars().next_back().map_or(true, is_breaker_char);
        let next_ok = source[at + word.len()..]
            .chars()
            .next()
            .map_or(true, is_breaker_char);
        if prev_ok && next_ok {
            instances.push(at);
        }
        from = at + 1;
    }
    instances
}

/// True when `word` occurs as a whole word.
pub fn contains_word(source: &str, word: &str) -> bool {
    !word_instances(source, word).is_empty()
}

/// Number of occurrences of `token` starting in `source[start..end)`.
pub fn count_between(source: &str, token: &str, start: usize, end: usize) -> usize {
    if token.is_empty() {
        return 0;
    }

    let mut count = 0;
    let mut from = start;
    while let Some(at) = find_literal(source, token, from) {
        if at >= end {
            break;
        }
        count += 1;
        from = at + token.len();
    }
    count
}

/// Drop everything left of the last line break (carriage return, newline,
/// or tab) at or before `index`.
pub fn trim_to_line_start(text: &str, index: usize) -> &str {
    let bound = index.saturating_add(1).min(text.len());
    let head = &text.as_bytes()[..bound];
    let last = [b'\r', b'\n', b'\t']
        .iter()
        .filter_map(|&b| memrchr(b, head))
        .max();
    match last {
        Some(i) => &text[i + 1..],
        None => text,
    }
}

/// Drop everything right of the first line break at or after `index`.
pub fn trim_to_line_end(text: &str, index: usize) -> &str {
    let from = index.min(text.len());
    let first = ["\r", "\n", "\t"]
        .iter()
        .filter_map(|b| find_literal(text, b, from))
        .min();
    match first {
        Some(i) => &text[..i],
        None => text,
    }
}

/// Append `pad` until `content` reaches `target_len` characters.
pub fn post_pad(content: &str, pad: &str, target_len: usize) -> String {
    let mut out = content.to_string();
    if pad.is_empty() {
        return out;
    }
    while out.chars().count() < target_len {
        out.push_str(pad);
    }
    out
}

/// Prepend `pad` until `content` reaches `target_len` characters.
pub fn pre_pad(content: &str, pad: &str, target_len: usize) -> String {
    let mut out = content.to_string();
    if pad.is_empty() {
        return out;
    }
    while out.chars().count() < target_len {
        out = format!("{pad}{out}");
    }
    out
}

/// Split on spaces that are not inside double quotes; the input is
/// trimmed first. Useful for whitespace-separated file lists with quoted
/// paths.
pub fn split_quoted(source: &str) -> Vec<&str> {
    let source = source.trim();
    let mut parts = Vec::new();
    let mut last = 0;

    for sp in memchr_iter(b' ', source.as_bytes()) {
        if !crate::comment::in_quote(source, sp) {
            parts.push(&source[last..sp]);
            last = sp + 1;
        }
    }
    parts.push(&source[last..]);
    parts
}

/// Keep only alphanumeric characters.
pub fn alphanumeric_only(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).collect()
}
