//! Windows-1252 encoding utilities for Western thermal printers
//!
//! Tickets are printed with code page WPC1252 (`ESC t 16`), a single-byte
//! encoding, so display width equals character count.

use std::borrow::Cow;

/// Replacement byte for characters the code page cannot represent
const REPLACEMENT: u8 = b'?';

/// Strip control characters from printable text
///
/// Order fields come from clients; an embedded ESC or GS would be read by the
/// printer as a command. Whitespace controls become a space, everything else
/// becomes `?`.
pub fn printable(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.chars()
            .map(|c| match c {
                '\t' | '\n' | '\r' => ' ',
                c if c.is_control() => REPLACEMENT as char,
                c => c,
            })
            .collect(),
    )
}

/// Encode text as Windows-1252
///
/// Characters outside the code page become `?`. encoding_rs would emit an
/// HTML numeric reference instead, which is garbage on paper.
pub fn encode_cp1252(s: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(s);
    if !had_errors {
        return bytes.into_owned();
    }

    let mut out = Vec::with_capacity(s.len());
    let mut tmp = [0u8; 4];
    for c in s.chars() {
        let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut tmp));
        if unmappable {
            out.push(REPLACEMENT);
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

/// Printed width of a string in columns
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}
