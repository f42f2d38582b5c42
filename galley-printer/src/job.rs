//! Print job payloads

use crate::encoding::encode_cp1252;
use std::borrow::Cow;

/// Job content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintJobPayload {
    /// Encoded ESC/POS byte stream
    Escpos(Vec<u8>),
    /// Human-readable text
    Text(String),
}

/// A single job sent to one printer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    pub title: String,
    pub payload: PrintJobPayload,
}

impl PrintJob {
    pub fn escpos(title: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            title: title.into(),
            payload: PrintJobPayload::Escpos(data),
        }
    }

    pub fn text(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: PrintJobPayload::Text(text.into()),
        }
    }

    /// Bytes for raw transports
    ///
    /// Text payloads are sent as Windows-1252 so a raw printer renders them
    /// in its default code page.
    pub fn bytes(&self) -> Cow<'_, [u8]> {
        match &self.payload {
            PrintJobPayload::Escpos(data) => Cow::Borrowed(data),
            PrintJobPayload::Text(text) => Cow::Owned(encode_cp1252(text)),
        }
    }

    pub fn len(&self) -> usize {
        match &self.payload {
            PrintJobPayload::Escpos(data) => data.len(),
            PrintJobPayload::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escpos_bytes_borrowed() {
        let job = PrintJob::escpos("t", vec![0x1B, 0x40]);
        assert!(matches!(job.bytes(), Cow::Borrowed(_)));
        assert_eq!(job.len(), 2);
    }

    #[test]
    fn test_text_bytes_encoded() {
        let job = PrintJob::text("t", "Café");
        assert_eq!(job.bytes().as_ref(), &[b'C', b'a', b'f', 0xE9]);
    }
}
