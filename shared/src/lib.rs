//! Shared types for Galley
//!
//! Common types used by the printer library and the print server:
//! printer/order/template models and the unified error system.

pub mod error;
pub mod models;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
