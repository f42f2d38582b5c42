//! Kitchen Printing Module
//!
//! Turns orders into tickets and gets them onto paper:
//! - Renderer: OrderData to ESC/POS or plain text
//! - Registry: configured printers, single default
//! - Dispatch: per-transport delivery, reported as a boolean
//! - Discovery and drivers: finding and preparing new printers
//! - Storage: the persisted JSON snapshot

pub mod discovery;
pub mod dispatch;
pub mod drivers;
pub mod registry;
pub mod renderer;
pub mod service;
pub mod storage;

pub use discovery::{CloudCredentials, DiscoveryError, DiscoveryService};
pub use dispatch::{CloudEndpoints, ConnectionTracker, DispatchError, Dispatcher};
pub use drivers::{DriverError, DriverInstaller, DriverManager, LpadminInstaller};
pub use registry::{PrinterRegistry, RegistryError};
pub use renderer::KitchenTicketRenderer;
pub use service::{PrintService, PrintServiceError, PrintServiceResult, PrintStatus};
pub use storage::{PrintConfigStore, PrintStorageError};
