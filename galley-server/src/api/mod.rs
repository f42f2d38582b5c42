//! HTTP API
//!
//! - [`health`] - liveness and status
//! - [`printers`] - printer CRUD
//! - [`print`] - order printing and test prints
//! - [`config`] - whole configuration snapshot
//! - [`discovery`] - network, USB and cloud discovery
//! - [`drivers`] - USB catalog, drivers and configuration

pub mod config;
pub mod discovery;
pub mod drivers;
pub mod health;
pub mod print;
pub mod printers;

pub use crate::utils::{ApiResponse, AppResult};
