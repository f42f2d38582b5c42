//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Printer registry errors
/// - 3xxx: Discovery errors
/// - 4xxx: Driver errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Printer registry errors (1xxx)
    Printer,
    /// Discovery errors (3xxx)
    Discovery,
    /// Driver errors (4xxx)
    Driver,
    /// System errors (everything else, 9xxx in practice)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Printer,
            3000..4000 => Self::Discovery,
            4000..5000 => Self::Driver,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Printer => "printer",
            Self::Discovery => "discovery",
            Self::Driver => "driver",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Printer);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Discovery);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Driver);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::NoDefaultPrinter.category(), ErrorCategory::Printer);
        assert_eq!(
            ErrorCode::CloudServiceUnknown.category(),
            ErrorCategory::Discovery
        );
        assert_eq!(ErrorCode::UnsupportedDevice.category(), ErrorCategory::Driver);
        assert_eq!(ErrorCode::StorageError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Discovery).unwrap();
        assert_eq!(json, "\"discovery\"");

        let category: ErrorCategory = serde_json::from_str("\"driver\"").unwrap();
        assert_eq!(category, ErrorCategory::Driver);
    }
}
