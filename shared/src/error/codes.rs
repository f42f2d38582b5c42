//! Unified error codes for Galley
//!
//! This module defines all error codes used across the print server and its
//! HTTP clients. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Printer registry errors
//! - 3xxx: Discovery errors
//! - 4xxx: Driver errors
//! - 9xxx: System errors
//!
//! Transport failures are not errors: a print that reaches its target but
//! fails there is reported as `success: false`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,

    // ==================== 1xxx: Printer registry ====================
    /// Printer not found
    PrinterNotFound = 1001,
    /// Printer id already registered
    PrinterAlreadyExists = 1002,
    /// No enabled default printer to print to
    NoDefaultPrinter = 1003,
    /// Printer is disabled
    PrinterDisabled = 1004,

    // ==================== 3xxx: Discovery ====================
    /// Discovery scan failed
    DiscoveryFailed = 3001,
    /// Cloud print service is not configured
    CloudServiceUnknown = 3002,
    /// Cloud print service rejected the request
    CloudServiceRejected = 3003,

    // ==================== 4xxx: Driver ====================
    /// Driver not found in catalog
    DriverNotFound = 4001,
    /// USB vendor/product pair is not supported
    UnsupportedDevice = 4002,
    /// Driver installation failed
    DriverInstallFailed = 4003,

    // ==================== 9xxx: System ====================
    /// Configuration storage error
    StorageError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",

            // Printer registry
            ErrorCode::PrinterNotFound => "Printer not found",
            ErrorCode::PrinterAlreadyExists => "Printer already exists",
            ErrorCode::NoDefaultPrinter => "No enabled default printer configured",
            ErrorCode::PrinterDisabled => "Printer is disabled",

            // Discovery
            ErrorCode::DiscoveryFailed => "Printer discovery failed",
            ErrorCode::CloudServiceUnknown => "Cloud print service is not configured",
            ErrorCode::CloudServiceRejected => "Cloud print service rejected the request",

            // Driver
            ErrorCode::DriverNotFound => "Driver not found",
            ErrorCode::UnsupportedDevice => "Unsupported USB printer",
            ErrorCode::DriverInstallFailed => "Driver installation failed",

            // System
            ErrorCode::StorageError => "Configuration storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),

            // Printer registry
            1001 => Ok(ErrorCode::PrinterNotFound),
            1002 => Ok(ErrorCode::PrinterAlreadyExists),
            1003 => Ok(ErrorCode::NoDefaultPrinter),
            1004 => Ok(ErrorCode::PrinterDisabled),

            // Discovery
            3001 => Ok(ErrorCode::DiscoveryFailed),
            3002 => Ok(ErrorCode::CloudServiceUnknown),
            3003 => Ok(ErrorCode::CloudServiceRejected),

            // Driver
            4001 => Ok(ErrorCode::DriverNotFound),
            4002 => Ok(ErrorCode::UnsupportedDevice),
            4003 => Ok(ErrorCode::DriverInstallFailed),

            // System
            9002 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
