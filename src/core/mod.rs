//! Core scanning primitives
//!
//! - `scanner`: memchr-based delimiter search over the raw buffer
//! - `cdata`: ignored-region classification for CDATA payloads
//! - `entities`: predefined entity encode/decode
//! - `encoding`: BOM handling and byte-to-string decoding

pub mod cdata;
pub mod encoding;
pub mod entities;
pub mod scanner;
