//! USB printer catalog and driver management
//!
//! The catalog maps a `vendorId:productId` pair to a known model and the
//! driver (spooler queue) that serves it. Installation goes through a
//! [`DriverInstaller`]; the default one registers a raw CUPS queue with
//! `lpadmin`.

use async_trait::async_trait;
use dashmap::DashSet;
use shared::models::{DriverInfo, DriverStatus, PrinterModel, normalize_usb_id};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Driver not found: {0}")]
    NotFound(String),

    #[error("Unsupported USB device {vendor_id}:{product_id}")]
    UnsupportedDevice {
        vendor_id: String,
        product_id: String,
    },

    #[error("Driver install failed: {0}")]
    Install(String),
}

/// One known printer model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub vendor_id: &'static str,
    pub product_id: &'static str,
    pub manufacturer: &'static str,
    pub model: &'static str,
    /// Driver id, also the spooler queue name
    pub driver: &'static str,
}

impl CatalogEntry {
    pub fn to_model(&self) -> PrinterModel {
        PrinterModel {
            vendor_id: self.vendor_id.to_string(),
            product_id: self.product_id.to_string(),
            manufacturer: self.manufacturer.to_string(),
            model: self.model.to_string(),
            driver: self.driver.to_string(),
        }
    }

    /// Display name, e.g. `Epson TM-T88V`
    pub fn display_name(&self) -> String {
        format!("{} {}", self.manufacturer, self.model)
    }
}

const fn entry(
    vendor_id: &'static str,
    product_id: &'static str,
    manufacturer: &'static str,
    model: &'static str,
    driver: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        vendor_id,
        product_id,
        manufacturer,
        model,
        driver,
    }
}

/// Known USB receipt printers
pub static CATALOG: &[CatalogEntry] = &[
    // Epson
    entry("04b8", "0202", "Epson", "TM-T88V", "epson-tm-t88v"),
    entry("04b8", "0e15", "Epson", "TM-T20II", "epson-tm-t20ii"),
    entry("04b8", "0e27", "Epson", "TM-T20III", "epson-tm-t20iii"),
    entry("04b8", "0e28", "Epson", "TM-m30II", "epson-tm-m30ii"),
    // Star Micronics
    entry("0519", "0003", "Star", "TSP100", "star-tsp100"),
    entry("0519", "0001", "Star", "TSP650II", "star-tsp650ii"),
    entry("0519", "0047", "Star", "mC-Print3", "star-mcprint3"),
    // Citizen
    entry("1d90", "2060", "Citizen", "CT-S310II", "citizen-ct-s310ii"),
    entry("1d90", "2168", "Citizen", "CT-E351", "citizen-ct-e351"),
    // Bixolon
    entry("1504", "0006", "Bixolon", "SRP-350III", "bixolon-srp-350iii"),
    entry("1504", "0031", "Bixolon", "SRP-330II", "bixolon-srp-330ii"),
];

/// Catalog lookup by vendor/product id (any hex spelling)
pub fn lookup(vendor_id: &str, product_id: &str) -> Option<&'static CatalogEntry> {
    let vendor = normalize_usb_id(vendor_id)?;
    let product = normalize_usb_id(product_id)?;
    CATALOG
        .iter()
        .find(|e| e.vendor_id == vendor && e.product_id == product)
}

/// Catalog lookup by driver id
pub fn find_driver(driver_id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.driver == driver_id)
}

/// Whole catalog as API models
pub fn models() -> Vec<PrinterModel> {
    CATALOG.iter().map(CatalogEntry::to_model).collect()
}

/// Platform hook that makes a driver usable
#[async_trait]
pub trait DriverInstaller: Send + Sync {
    async fn install(&self, entry: &CatalogEntry) -> Result<(), DriverError>;
}

/// Registers a raw CUPS queue named after the driver
#[derive(Debug, Clone)]
pub struct LpadminInstaller {
    program: String,
    timeout: Duration,
}

impl LpadminInstaller {
    pub fn new() -> Self {
        Self {
            program: "lpadmin".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for LpadminInstaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DriverInstaller for LpadminInstaller {
    #[instrument(skip(self, entry), fields(driver = entry.driver))]
    async fn install(&self, entry: &CatalogEntry) -> Result<(), DriverError> {
        let device_uri = format!(
            "usb://{}/{}",
            entry.manufacturer,
            entry.model.replace(' ', "%20")
        );

        let child = Command::new(&self.program)
            .args(["-p", entry.driver, "-E", "-v", device_uri.as_str(), "-m", "raw"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DriverError::Install(format!("{}: {}", self.program, e)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| DriverError::Install(format!("{} timed out", self.program)))?
            .map_err(|e| DriverError::Install(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DriverError::Install(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        info!(uri = %device_uri, "Spooler queue registered");
        Ok(())
    }
}

/// Tracks which drivers are installed
#[derive(Clone)]
pub struct DriverManager {
    installer: Arc<dyn DriverInstaller>,
    installed: Arc<DashSet<&'static str>>,
}

impl DriverManager {
    pub fn new(installer: Arc<dyn DriverInstaller>) -> Self {
        Self {
            installer,
            installed: Arc::new(DashSet::new()),
        }
    }

    pub fn status(&self, driver_id: &str) -> DriverStatus {
        if self.installed.contains(driver_id) {
            DriverStatus::Installed
        } else {
            DriverStatus::NotInstalled
        }
    }

    /// Every catalog driver with its tracked state
    pub fn list(&self) -> Vec<DriverInfo> {
        CATALOG
            .iter()
            .map(|e| DriverInfo {
                id: e.driver.to_string(),
                manufacturer: e.manufacturer.to_string(),
                model: e.model.to_string(),
                vendor_id: e.vendor_id.to_string(),
                product_id: e.product_id.to_string(),
                status: self.status(e.driver),
            })
            .collect()
    }

    /// Install a driver; already installed drivers are not reinstalled
    pub async fn install(&self, driver_id: &str) -> Result<&'static CatalogEntry, DriverError> {
        let entry =
            find_driver(driver_id).ok_or_else(|| DriverError::NotFound(driver_id.to_string()))?;
        self.install_entry(entry).await?;
        Ok(entry)
    }

    pub async fn install_entry(&self, entry: &'static CatalogEntry) -> Result<(), DriverError> {
        if self.installed.contains(entry.driver) {
            return Ok(());
        }
        match self.installer.install(entry).await {
            Ok(()) => {
                self.installed.insert(entry.driver);
                info!(driver = entry.driver, "Driver installed");
                Ok(())
            }
            Err(e) => {
                warn!(driver = entry.driver, error = %e, "Driver install failed");
                Err(e)
            }
        }
    }

    /// Look up a device and make sure its driver is installed
    pub async fn prepare(
        &self,
        vendor_id: &str,
        product_id: &str,
    ) -> Result<&'static CatalogEntry, DriverError> {
        let entry = lookup(vendor_id, product_id).ok_or_else(|| DriverError::UnsupportedDevice {
            vendor_id: vendor_id.to_string(),
            product_id: product_id.to_string(),
        })?;
        self.install_entry(entry).await?;
        Ok(entry)
    }
}

impl std::fmt::Debug for DriverManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverManager")
            .field("installed", &self.installed.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingInstaller {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl DriverInstaller for CountingInstaller {
        async fn install(&self, _entry: &CatalogEntry) -> Result<(), DriverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DriverError::Install("refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_lookup_normalizes_ids() {
        let entry = lookup("0x04B8", "202").unwrap();
        assert_eq!(entry.model, "TM-T88V");
        assert!(lookup("9999", "9999").is_none());
        assert!(lookup("zz", "0202").is_none());
    }

    #[test]
    fn test_catalog_is_consistent() {
        for (i, e) in CATALOG.iter().enumerate() {
            assert_eq!(normalize_usb_id(e.vendor_id).as_deref(), Some(e.vendor_id));
            assert_eq!(normalize_usb_id(e.product_id).as_deref(), Some(e.product_id));
            assert!(
                CATALOG[..i].iter().all(|o| o.driver != e.driver),
                "duplicate driver {}",
                e.driver
            );
        }
        assert_eq!(models().len(), CATALOG.len());
    }

    #[tokio::test]
    async fn test_install_tracks_state_once() {
        let installer = Arc::new(CountingInstaller::default());
        let manager = DriverManager::new(installer.clone());

        assert_eq!(manager.status("star-tsp100"), DriverStatus::NotInstalled);
        manager.install("star-tsp100").await.unwrap();
        manager.install("star-tsp100").await.unwrap();

        assert_eq!(installer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.status("star-tsp100"), DriverStatus::Installed);
        let info = manager
            .list()
            .into_iter()
            .find(|d| d.id == "star-tsp100")
            .unwrap();
        assert_eq!(info.status, DriverStatus::Installed);
    }

    #[tokio::test]
    async fn test_failed_install_stays_not_installed() {
        let manager = DriverManager::new(Arc::new(CountingInstaller {
            calls: AtomicUsize::new(0),
            fail: true,
        }));

        assert!(matches!(
            manager.install("epson-tm-t88v").await,
            Err(DriverError::Install(_))
        ));
        assert_eq!(manager.status("epson-tm-t88v"), DriverStatus::NotInstalled);
    }

    #[tokio::test]
    async fn test_unknown_driver_and_device() {
        let manager = DriverManager::new(Arc::new(CountingInstaller::default()));
        assert!(matches!(
            manager.install("nope").await,
            Err(DriverError::NotFound(_))
        ));
        assert!(matches!(
            manager.prepare("9999", "9999").await,
            Err(DriverError::UnsupportedDevice { .. })
        ));
    }

    #[tokio::test]
    async fn test_lpadmin_missing_binary() {
        let installer = LpadminInstaller::new().with_program("/nonexistent/lpadmin");
        let entry = find_driver("bixolon-srp-350iii").unwrap();
        assert!(matches!(
            installer.install(entry).await,
            Err(DriverError::Install(_))
        ));
    }
}
