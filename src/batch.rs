//! Parallel batch edits over independent documents
//!
//! Edits within one buffer are strictly serial; fan-out happens only
//! across documents, where each rayon task owns its buffer outright.

use rayon::prelude::*;

/// Apply `op` to every buffer in parallel.
pub fn map_buffers<F>(buffers: Vec<String>, op: F) -> Vec<String>
where
    F: Fn(String) -> String + Sync + Send,
{
    buffers.into_par_iter().map(op).collect()
}

/// Rename a tag across many documents.
pub fn rename_tag_all(buffers: &[String], old_name: &str, new_name: &str) -> Vec<String> {
    buffers
        .par_iter()
        .map(|buffer| crate::edit::rename_tag(buffer, old_name, new_name))
        .collect()
}

/// Strip a tag, keeping its content, across many documents.
pub fn strip_tag_all(buffers: &[String], tag_name: &str) -> Vec<String> {
    buffers
        .par_iter()
        .map(|buffer| crate::edit::strip_tag_keep_content(buffer, tag_name))
        .collect()
}
