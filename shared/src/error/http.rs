//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::PrinterNotFound | Self::DriverNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (nothing to print to)
            Self::PrinterAlreadyExists | Self::NoDefaultPrinter | Self::PrinterDisabled => {
                StatusCode::CONFLICT
            }

            // 422 Unprocessable (known request, unsupported target)
            Self::UnsupportedDevice | Self::CloudServiceUnknown => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 502 Bad Gateway (the remote end refused us)
            Self::CloudServiceRejected => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::StorageError | Self::DiscoveryFailed | Self::DriverInstallFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request
            Self::ValidationFailed => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_validation_status() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_integrity_status_is_distinct_from_transport() {
        assert_eq!(
            ErrorCode::PrinterNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::NoDefaultPrinter.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::UnsupportedDevice.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::CloudServiceRejected.http_status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_system_status() {
        assert_eq!(
            ErrorCode::DriverInstallFailed.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::StorageError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
