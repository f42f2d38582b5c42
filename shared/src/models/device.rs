//! USB device and driver models

use serde::{Deserialize, Serialize};

/// USB printer found on the bus
///
/// Ephemeral discovery result. Becomes a printer only through an explicit
/// configure call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsbPrinterDevice {
    /// 4-digit lowercase hex, e.g. `04b8`
    pub vendor_id: String,
    /// 4-digit lowercase hex
    pub product_id: String,
    pub device_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Catalog model this device matched
    pub model: String,
}

/// OS driver installation state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Installed,
    #[default]
    NotInstalled,
}

/// Driver entry with tracked state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverInfo {
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    pub vendor_id: String,
    pub product_id: String,
    pub status: DriverStatus,
}

/// Catalog entry as exposed by `GET /models`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterModel {
    pub vendor_id: String,
    pub product_id: String,
    pub manufacturer: String,
    pub model: String,
    pub driver: String,
}

/// Normalize a USB id to 4-digit lowercase hex
///
/// Accepts `0x04B8`, `04b8` or `4b8`. Returns `None` for anything that is not
/// a 16-bit hex number.
pub fn normalize_usb_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    u16::from_str_radix(digits, 16)
        .ok()
        .map(|v| format!("{:04x}", v))
}
