//! Data models
//!
//! Shared between galley-server and its HTTP clients. All JSON is camelCase.

pub mod device;
pub mod order;
pub mod printer;
pub mod settings;
pub mod template;

// Re-exports
pub use device::*;
pub use order::*;
pub use printer::*;
pub use settings::*;
pub use template::*;
