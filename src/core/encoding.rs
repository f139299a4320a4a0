//! Encoding detection and byte-to-string decoding
//!
//! Buffers handed to the library often come straight from disk or the wire
//! and may carry a byte order mark. Detection is based on the BOM or the
//! initial byte pattern; UTF-16 input is converted so the rest of the crate
//! only ever sees UTF-8.

/// Detected encoding of a raw text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    /// Detect encoding from byte order mark or initial bytes.
    pub fn detect(input: &[u8]) -> Self {
        if input.len() < 2 {
            return TextEncoding::Utf8;
        }

        match (input[0], input[1]) {
            // UTF-16 LE BOM: 0xFF 0xFE
            (0xFF, 0xFE) => TextEncoding::Utf16Le,
            // UTF-16 BE BOM: 0xFE 0xFF
            (0xFE, 0xFF) => TextEncoding::Utf16Be,
            // UTF-8 BOM: 0xEF 0xBB 0xBF
            (0xEF, 0xBB) if input.len() >= 3 && input[2] == 0xBF => TextEncoding::Utf8,
            // No BOM - a null next to '<' suggests UTF-16 markup
            (0x00, b'<') => TextEncoding::Utf16Be,
            (b'<', 0x00) => TextEncoding::Utf16Le,
            _ => TextEncoding::Utf8,
        }
    }
}

/// Decode a raw buffer into a `String`, stripping any BOM.
///
/// Returns `None` when the bytes are not valid text in the detected
/// encoding.
pub fn decode_buffer(input: &[u8]) -> Option<String> {
    match TextEncoding::detect(input) {
        TextEncoding::Utf8 => {
            let body = input.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(input);
            String::from_utf8(body.to_vec()).ok()
        }
        TextEncoding::Utf16Le => decode_utf16(input, &[0xFF, 0xFE], u16::from_le_bytes),
        TextEncoding::Utf16Be => decode_utf16(input, &[0xFE, 0xFF], u16::from_be_bytes),
    }
}

fn decode_utf16(input: &[u8], bom: &[u8], combine: fn([u8; 2]) -> u16) -> Option<String> {
    let body = input.strip_prefix(bom).unwrap_or(input);
    if body.len() % 2 != 0 {
        return None;
    }

    let code_units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| combine([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&code_units).ok()
}
