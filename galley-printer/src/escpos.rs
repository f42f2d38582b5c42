//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data, plus a plain-text
//! builder with the same layout surface for targets that cannot take
//! control bytes (cloud relays, logs, human review).

use crate::encoding::{encode_cp1252, printable, text_width};

/// ESC t 16: select WPC1252 code page
const SELECT_CP1252: [u8; 3] = [0x1B, 0x74, 16];

/// Layout operations shared by byte and text builders
///
/// Ticket renderers are written once against this trait. Every style "on"
/// call must be matched by its "off" before unrelated content.
pub trait TextLayout {
    /// Paper width in characters
    fn width(&self) -> usize;

    /// Write text followed by newline
    fn line(&mut self, s: &str) -> &mut Self;

    /// Write empty line
    fn newline(&mut self) -> &mut Self;

    fn center(&mut self) -> &mut Self;

    fn left(&mut self) -> &mut Self;

    fn bold(&mut self) -> &mut Self;

    fn bold_off(&mut self) -> &mut Self;

    fn double_size(&mut self) -> &mut Self;

    fn reset_size(&mut self) -> &mut Self;

    /// Print and feed n lines
    fn feed(&mut self, lines: u8) -> &mut Self;

    /// Cut paper
    fn cut(&mut self) -> &mut Self;

    /// Print a line of '=' characters
    fn sep_double(&mut self) -> &mut Self {
        let sep = "=".repeat(self.width());
        self.line(&sep)
    }

    /// Print a line of '-' characters
    fn sep_single(&mut self) -> &mut Self {
        let sep = "-".repeat(self.width());
        self.line(&sep)
    }
}

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers.
/// All text is converted to Windows-1252 as it is written.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
}

impl EscPosBuilder {
    /// Create a new builder with the specified paper width in characters
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize) -> Self {
        let mut buf = Vec::with_capacity(1024);
        // Initialize printer (ESC @)
        buf.extend_from_slice(&[0x1B, 0x40]);
        buf.extend_from_slice(&SELECT_CP1252);
        Self { buf, width }
    }

    /// Write text (Windows-1252 encoded, control characters stripped)
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(&encode_cp1252(&printable(s)));
        self
    }

    /// Build the final byte buffer
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl TextLayout for EscPosBuilder {
    fn width(&self) -> usize {
        self.width
    }

    fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x01]);
        self
    }

    fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x00]);
        self
    }

    fn bold(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x01]);
        self
    }

    fn bold_off(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x00]);
        self
    }

    fn double_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x11]);
        self
    }

    fn reset_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x00]);
        self
    }

    fn feed(&mut self, lines: u8) -> &mut Self {
        // ESC d n
        self.buf.extend_from_slice(&[0x1B, 0x64, lines]);
        self
    }

    fn cut(&mut self) -> &mut Self {
        // GS V 0 - Full cut
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x00]);
        self
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new(48)
    }
}

// ============================================================================
// Plain text builder
// ============================================================================

/// Plain-text builder with the ESC/POS layout surface
///
/// Styles are dropped; centered lines are padded with spaces.
pub struct PlainTextBuilder {
    buf: String,
    width: usize,
    centered: bool,
}

impl PlainTextBuilder {
    /// Create a new text builder with specified paper width in characters
    pub fn new(width: usize) -> Self {
        Self {
            buf: String::new(),
            width,
            centered: false,
        }
    }

    /// Finalize and return the accumulated string
    pub fn finalize(self) -> String {
        self.buf
    }
}

impl TextLayout for PlainTextBuilder {
    fn width(&self) -> usize {
        self.width
    }

    fn line(&mut self, s: &str) -> &mut Self {
        let s = printable(s);
        if self.centered {
            let pad = self.width.saturating_sub(text_width(&s)) / 2;
            self.buf.push_str(&" ".repeat(pad));
        }
        self.buf.push_str(&s);
        self.buf.push('\n');
        self
    }

    fn newline(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    fn center(&mut self) -> &mut Self {
        self.centered = true;
        self
    }

    fn left(&mut self) -> &mut Self {
        self.centered = false;
        self
    }

    fn bold(&mut self) -> &mut Self {
        self
    }

    fn bold_off(&mut self) -> &mut Self {
        self
    }

    fn double_size(&mut self) -> &mut Self {
        self
    }

    fn reset_size(&mut self) -> &mut Self {
        self
    }

    fn feed(&mut self, lines: u8) -> &mut Self {
        for _ in 0..lines {
            self.buf.push('\n');
        }
        self
    }

    fn cut(&mut self) -> &mut Self {
        self
    }
}
