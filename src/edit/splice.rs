//! Offset edit list
//!
//! Mutating operations scan the source once, record their splices as
//! offsets into the unmodified buffer, and apply them here in a single
//! pass. Callers still see the read-copy-replace contract (new buffer out,
//! source untouched) without re-copying the whole buffer per edit.

/// A single splice: replace `source[start..end]` with `text`.
#[derive(Debug, Clone)]
struct Splice {
    start: usize,
    end: usize,
    text: String,
}

/// An ordered set of splices against one source buffer.
#[derive(Debug)]
pub(crate) struct Edits<'a> {
    source: &'a str,
    ops: Vec<Splice>,
}

impl<'a> Edits<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Edits {
            source,
            ops: Vec::new(),
        }
    }

    /// Delete `source[start..end]`.
    pub(crate) fn delete(&mut self, start: usize, end: usize) {
        self.ops.push(Splice {
            start,
            end,
            text: String::new(),
        });
    }

    /// Insert `text` before `source[at]`.
    pub(crate) fn insert(&mut self, at: usize, text: &str) {
        self.ops.push(Splice {
            start: at,
            end: at,
            text: text.to_string(),
        });
    }

    /// Replace `source[start..end]` with `text`.
    pub(crate) fn replace(&mut self, start: usize, end: usize, text: &str) {
        self.ops.push(Splice {
            start,
            end,
            text: text.to_string(),
        });
    }

    /// Apply all splices and return the new buffer.
    ///
    /// Splices are applied in offset order; an op that overlaps an already
    /// consumed region is dropped rather than corrupting the output.
    pub(crate) fn apply(mut self) -> String {
        if self.ops.is_empty() {
            return self.source.to_string();
        }

        self.ops.sort_by_key(|op| (op.start, op.end));

        let grow: usize = self.ops.iter().map(|op| op.text.len()).sum();
        let mut out = String::with_capacity(self.source.len() + grow);
        let mut cursor = 0;

        for op in &self.ops {
            if op.start < cursor {
                continue;
            }
            out.push_str(&self.source[cursor..op.start]);
            out.push_str(&op.text);
            cursor = op.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}
