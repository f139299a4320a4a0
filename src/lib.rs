//! tagsurgeon - tolerant tag boundary resolution and offset-based markup
//! surgery
//!
//! Locates the start and end of XML/HTML-like tags, comments, CDATA blocks
//! and quoted regions directly on the raw text - no tree is ever built -
//! and edits markup through those exact offsets. Accepts "tag soup":
//! self-closing tags without end tags, singleton tags, nested same-named
//! tags, and unescaped `<`/`>` inside comments or CDATA.
//!
//! Modules:
//! - `core`: delimiter scanning, CDATA classification, entities, encoding
//! - `resolve`: the tag boundary resolver and depth calculator
//! - `edit`: extract/strip/rename/reorder operations and attribute surgery
//! - `comment`: comment and quote location
//! - `text`: plain-text utilities around the markup operations
//! - `batch`: rayon fan-out over independent documents
//!
//! Every operation reads a buffer and returns a new buffer or a scalar;
//! nothing is mutated in place and no state survives a call.

pub mod batch;
pub mod comment;
pub mod core;
pub mod edit;
pub mod error;
pub mod resolve;
pub mod text;

pub use edit::{
    convert_to_singleton, ensure_explicit_end_tag, get_attribute, inner_xml,
    move_tag_first_under, rename_attribute, rename_attribute_for_tags, rename_tag,
    rename_tag_under, strip_all_tags, strip_attribute, strip_attribute_from_tags, strip_chunks,
    strip_tag_and_content, strip_tag_keep_content, strip_tags_and_contents, EditOutcome,
    StripOutcome,
};
pub use error::MarkupError;
pub use resolve::{end_of_tag, end_of_tag_tolerant, start_of_tag, tag_depth};
