//! # galley-printer
//!
//! ESC/POS printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building (and a plain-text twin for human targets)
//! - Windows-1252 encoding for Western thermal printers
//! - Network printing (raw TCP, port 9100)
//! - USB printing (raw device node or local spooler)
//! - Cloud relay printing (HTTPS print-job API)
//!
//! Business logic (WHAT to print, and where) stays in galley-server:
//! - Kitchen ticket rendering
//! - Printer registry and target selection
//!
//! ## Example
//!
//! ```ignore
//! use galley_printer::{EscPosBuilder, NetworkPrinter, PrintJob, Printer, TextLayout};
//!
//! // Build ESC/POS content
//! let mut builder = EscPosBuilder::new(48);
//! builder.center().bold().line("KITCHEN ORDER").bold_off().left();
//! builder.line("Order: T1");
//! builder.cut();
//!
//! // Send to network printer
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! printer.print(&PrintJob::escpos("Order T1", builder.build())).await?;
//! ```

mod cloud;
mod encoding;
mod error;
mod escpos;
mod job;
mod printer;
mod usb;

// Re-exports
pub use cloud::{CloudPrinter, CloudService, RemotePrinter};
pub use encoding::{encode_cp1252, printable, text_width};
pub use error::{PrintError, PrintResult};
pub use escpos::{EscPosBuilder, PlainTextBuilder, TextLayout};
pub use job::{PrintJob, PrintJobPayload};
pub use printer::{NetworkPrinter, Printer};
pub use usb::UsbPrinter;
