//! Print service
//!
//! Facade over the registry, renderer, dispatcher, driver manager and
//! configuration store. HTTP handlers only talk to this type.

use super::dispatch::Dispatcher;
use super::drivers::{DriverError, DriverManager};
use super::registry::{PrinterRegistry, RegistryError};
use super::renderer::KitchenTicketRenderer;
use super::storage::{PrintConfigStore, PrintStorageError};
use galley_printer::PrintJob;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    ConnectionType, DriverInfo, GlobalSettings, OrderData, PrintConfigSnapshot, PrintTemplate,
    PrinterConfig, PrinterCreate, PrinterKind, PrinterStatus, PrinterUpdate, Transport,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{info, instrument, warn};

/// Backoff before the first retry; doubles per attempt
const RETRY_BASE: Duration = Duration::from_millis(200);
const RETRY_CAP: Duration = Duration::from_secs(2);

/// Default upper bound for one print, retries included
pub const DEFAULT_PRINT_BUDGET: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum PrintServiceError {
    #[error("No enabled default printer")]
    NoTarget,

    #[error("Printer not found: {0}")]
    PrinterNotFound(String),

    #[error("Printer disabled: {0}")]
    PrinterDisabled(String),

    #[error("Printer already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("Storage error: {0}")]
    Storage(#[from] PrintStorageError),
}

pub type PrintServiceResult<T> = Result<T, PrintServiceError>;

impl From<RegistryError> for PrintServiceError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => PrintServiceError::PrinterNotFound(id),
            RegistryError::AlreadyExists(id) => PrintServiceError::AlreadyExists(id),
        }
    }
}

impl From<PrintServiceError> for AppError {
    fn from(err: PrintServiceError) -> Self {
        match err {
            PrintServiceError::NoTarget => AppError::new(ErrorCode::NoDefaultPrinter),
            PrintServiceError::PrinterNotFound(id) => AppError::printer_not_found(id),
            PrintServiceError::PrinterDisabled(id) => AppError::printer_disabled(id),
            PrintServiceError::AlreadyExists(id) => AppError::printer_exists(id),
            PrintServiceError::Driver(DriverError::NotFound(id)) => AppError::driver_not_found(id),
            PrintServiceError::Driver(DriverError::UnsupportedDevice {
                vendor_id,
                product_id,
            }) => AppError::new(ErrorCode::UnsupportedDevice)
                .with_detail("vendorId", vendor_id)
                .with_detail("productId", product_id),
            PrintServiceError::Driver(e @ DriverError::Install(_)) => {
                AppError::with_message(ErrorCode::DriverInstallFailed, e.to_string())
            }
            PrintServiceError::Storage(e) => AppError::storage(e.to_string()),
        }
    }
}

/// Printer counts for status reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterCounts {
    pub total: usize,
    pub enabled: usize,
    pub connected: usize,
    pub error: usize,
}

/// Point-in-time summary of the print subsystem
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintStatus {
    pub printers: PrinterCounts,
    pub default_printer: Option<String>,
    pub settings: GlobalSettings,
}

/// Print service
#[derive(Clone)]
pub struct PrintService {
    registry: Arc<PrinterRegistry>,
    templates: Arc<RwLock<Vec<PrintTemplate>>>,
    settings: Arc<RwLock<GlobalSettings>>,
    store: PrintConfigStore,
    dispatcher: Dispatcher,
    drivers: DriverManager,
    /// Wall-clock bound for one print including retries and backoff
    print_budget: Duration,
    /// Serializes snapshot writes so the file always reflects the last mutation
    persist_lock: Arc<Mutex<()>>,
}

impl PrintService {
    /// Load the stored configuration and build the service
    pub async fn open(store: PrintConfigStore, dispatcher: Dispatcher, drivers: DriverManager) -> Self {
        let snapshot = store.load().await;
        let registry = match PrinterRegistry::from_printers(snapshot.printers) {
            Ok(registry) => registry,
            Err(e) => {
                warn!(error = %e, "Stored printers rejected, using built-in default");
                let mut builtin = PrintConfigSnapshot::builtin().printers;
                builtin.retain(|p| p.is_default);
                PrinterRegistry::from_printers(builtin).unwrap_or_default()
            }
        };

        Self {
            registry: Arc::new(registry),
            templates: Arc::new(RwLock::new(snapshot.templates)),
            settings: Arc::new(RwLock::new(snapshot.settings)),
            store,
            dispatcher,
            drivers,
            print_budget: DEFAULT_PRINT_BUDGET,
            persist_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Bound every print (all attempts and backoff) by `budget`
    ///
    /// Must stay below the HTTP request timeout so the outcome is always
    /// recorded and reported.
    pub fn with_print_budget(mut self, budget: Duration) -> Self {
        self.print_budget = budget;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // ========== Printer CRUD ==========

    pub async fn list(&self) -> Vec<PrinterConfig> {
        self.registry.list().await
    }

    pub async fn get(&self, id: &str) -> PrintServiceResult<PrinterConfig> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| PrintServiceError::PrinterNotFound(id.to_string()))
    }

    pub async fn add(&self, create: PrinterCreate) -> PrintServiceResult<PrinterConfig> {
        let printer = PrinterConfig {
            id: create
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: create.name,
            kind: create.kind,
            transport: create.transport,
            model: create.model,
            status: PrinterStatus::Disconnected,
            enabled: create.enabled,
            is_default: create.is_default,
        };

        let printer = self.registry.add(printer).await?;
        info!(printer_id = %printer.id, address = %printer.transport.address(), "Printer added");
        self.persist().await?;
        Ok(printer)
    }

    /// Update a printer; a masked API key keeps the stored one
    pub async fn update(&self, id: &str, mut update: PrinterUpdate) -> PrintServiceResult<PrinterConfig> {
        if let Some(transport) = update.transport.as_mut()
            && let Some(existing) = self.registry.get(id).await
        {
            transport.restore_api_key(&existing.transport);
        }
        let printer = self.registry.update(id, update).await?;
        info!(printer_id = %id, "Printer updated");
        self.persist().await?;
        Ok(printer)
    }

    /// Remove a printer and abort its in-flight dispatches
    pub async fn delete(&self, id: &str) -> PrintServiceResult<PrinterConfig> {
        let printer = self.registry.delete(id).await?;
        if self.dispatcher.connections().close(id) {
            info!(printer_id = %id, "Cancelled in-flight dispatches");
        }
        info!(printer_id = %id, "Printer deleted");
        self.persist().await?;
        Ok(printer)
    }

    // ========== Printing ==========

    /// Print an order
    ///
    /// `Ok(false)` means the target was valid but the transport failed.
    /// Integrity problems (unknown id, no default, disabled target) are
    /// errors and never touch a transport.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn print_order(
        &self,
        order: &OrderData,
        printer_id: Option<&str>,
    ) -> PrintServiceResult<bool> {
        let target = match printer_id {
            Some(id) => self.get(id).await?,
            None => self
                .registry
                .default_target()
                .await
                .ok_or(PrintServiceError::NoTarget)?,
        };

        if !target.enabled {
            return Err(PrintServiceError::PrinterDisabled(target.id));
        }

        let job = self.render(order, &target).await;
        let settings = self.settings.read().await.clone();
        let success = self.dispatch_with_retry(&target, &job, &settings).await;

        let status = if success {
            PrinterStatus::Connected
        } else {
            PrinterStatus::Error
        };
        self.registry.set_status(&target.id, status).await;

        info!(printer_id = %target.id, success, "Order dispatched");
        Ok(success)
    }

    /// Print a canned order on one printer
    pub async fn test_print(&self, printer_id: &str) -> PrintServiceResult<bool> {
        self.print_order(&OrderData::sample(), Some(printer_id)).await
    }

    /// One-off test print to a USB device that is not registered
    pub async fn test_usb(&self, device_path: &str) -> bool {
        let target = PrinterConfig::candidate(
            "usb-test",
            "USB Test",
            PrinterKind::Thermal,
            Transport::Usb {
                device_path: device_path.to_string(),
            },
            "",
        );
        let job = self.render(&OrderData::sample(), &target).await;
        let timeout = Duration::from_millis(self.settings.read().await.timeout);
        let send = self.dispatcher.send(&target, &job, timeout.min(self.print_budget));
        match tokio::time::timeout(self.print_budget, send).await {
            Ok(success) => success,
            Err(_) => {
                warn!(%device_path, budget_ms = self.print_budget.as_millis() as u64, "USB test print timed out");
                false
            }
        }
    }

    async fn render(&self, order: &OrderData, target: &PrinterConfig) -> PrintJob {
        let renderer = KitchenTicketRenderer::for_templates(&self.templates.read().await);
        let title = format!("Order {}", order.id);
        match target.connection_type() {
            // Relays print text natively; raw ESC/POS is not guaranteed to pass through
            ConnectionType::Cloud => PrintJob::text(title, renderer.encode_text(order)),
            _ => PrintJob::escpos(title, renderer.encode(order)),
        }
    }

    /// Send with bounded retry
    ///
    /// Every attempt and backoff fits inside `print_budget`; running out of
    /// budget counts as a failed dispatch. Retrying stops once the printer
    /// is deleted.
    async fn dispatch_with_retry(
        &self,
        target: &PrinterConfig,
        job: &PrintJob,
        settings: &GlobalSettings,
    ) -> bool {
        let connect_timeout = Duration::from_millis(settings.timeout);
        let deadline = Instant::now() + self.print_budget;
        let mut attempt = 0;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let send = self
                .dispatcher
                .send(target, job, connect_timeout.min(remaining));
            match tokio::time::timeout(remaining, send).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(_) => {
                    warn!(printer_id = %target.id, attempt = attempt + 1, "Dispatch exceeded print budget");
                    return false;
                }
            }
            if attempt >= settings.retry_attempts || !self.registry.contains(&target.id).await {
                return false;
            }

            let delay = retry_delay(attempt);
            if Instant::now() + delay >= deadline {
                warn!(printer_id = %target.id, attempt = attempt + 1, "No print budget left for a retry");
                return false;
            }
            warn!(printer_id = %target.id, attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "Dispatch failed, retrying");
            tokio::time::sleep(delay).await;
            if !self.registry.contains(&target.id).await {
                return false;
            }
            attempt += 1;
        }
    }

    // ========== USB / drivers ==========

    pub fn list_drivers(&self) -> Vec<DriverInfo> {
        self.drivers.list()
    }

    pub async fn install_driver(&self, driver_id: &str) -> PrintServiceResult<DriverInfo> {
        self.drivers.install(driver_id).await?;
        self.drivers
            .list()
            .into_iter()
            .find(|d| d.id == driver_id)
            .ok_or_else(|| DriverError::NotFound(driver_id.to_string()).into())
    }

    /// Register a catalog USB printer, installing its driver first
    ///
    /// The printer id is derived from the vendor/product pair, so configuring
    /// the same device twice updates the existing entry. The printer is
    /// enabled but never made default.
    #[instrument(skip(self))]
    pub async fn configure_usb_printer(
        &self,
        vendor_id: &str,
        product_id: &str,
        device_path: &str,
    ) -> PrintServiceResult<PrinterConfig> {
        let entry = self.drivers.prepare(vendor_id, product_id).await?;
        let id = format!("usb-{}-{}", entry.vendor_id, entry.product_id);
        let transport = Transport::Usb {
            device_path: device_path.to_string(),
        };

        let printer = if self.registry.contains(&id).await {
            let update = PrinterUpdate {
                name: Some(entry.display_name()),
                transport: Some(transport),
                model: Some(entry.model.to_string()),
                enabled: Some(true),
                ..Default::default()
            };
            self.registry.update(&id, update).await?
        } else {
            let mut printer = PrinterConfig::candidate(
                id,
                entry.display_name(),
                PrinterKind::Thermal,
                transport,
                entry.model,
            );
            printer.enabled = true;
            self.registry.add(printer).await?
        };

        info!(printer_id = %printer.id, driver = entry.driver, "USB printer configured");
        self.persist().await?;
        Ok(printer)
    }

    /// Boolean form of [`Self::configure_usb_printer`]
    ///
    /// Unknown devices and failed installs return false with the registry
    /// untouched.
    pub async fn auto_configure_printer(
        &self,
        vendor_id: &str,
        product_id: &str,
        device_path: &str,
    ) -> bool {
        match self
            .configure_usb_printer(vendor_id, product_id, device_path)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(%vendor_id, %product_id, error = %e, "USB auto-configure failed");
                false
            }
        }
    }

    // ========== Configuration ==========

    pub async fn config(&self) -> PrintConfigSnapshot {
        PrintConfigSnapshot {
            printers: self.registry.list().await,
            templates: self.templates.read().await.clone(),
            settings: self.settings.read().await.clone(),
        }
    }

    pub async fn settings(&self) -> GlobalSettings {
        self.settings.read().await.clone()
    }

    /// Replace the printer list, plus templates and settings when given
    ///
    /// Printers that disappear have their in-flight dispatches cancelled.
    /// Masked API keys are matched to the stored printer by id.
    pub async fn replace_config(
        &self,
        mut printers: Vec<PrinterConfig>,
        templates: Option<Vec<PrintTemplate>>,
        settings: Option<GlobalSettings>,
    ) -> PrintServiceResult<PrintConfigSnapshot> {
        let previous = self.registry.list().await;
        for printer in &mut printers {
            printer.status = PrinterStatus::Disconnected;
            if let Some(old) = previous.iter().find(|p| p.id == printer.id) {
                printer.transport.restore_api_key(&old.transport);
            }
        }

        self.registry.replace_all(printers).await?;
        if let Some(templates) = templates {
            *self.templates.write().await = templates;
        }
        if let Some(settings) = settings {
            *self.settings.write().await = settings;
        }

        for old in previous {
            if !self.registry.contains(&old.id).await {
                self.dispatcher.connections().close(&old.id);
            }
        }

        self.persist().await?;
        let snapshot = self.config().await;
        info!(
            printers = snapshot.printers.len(),
            templates = snapshot.templates.len(),
            "Print config replaced"
        );
        Ok(snapshot)
    }

    pub async fn status(&self) -> PrintStatus {
        let printers = self.registry.list().await;
        let counts = PrinterCounts {
            total: printers.len(),
            enabled: printers.iter().filter(|p| p.enabled).count(),
            connected: printers
                .iter()
                .filter(|p| p.status == PrinterStatus::Connected)
                .count(),
            error: printers
                .iter()
                .filter(|p| p.status == PrinterStatus::Error)
                .count(),
        };

        PrintStatus {
            printers: counts,
            default_printer: printers
                .iter()
                .find(|p| p.is_default)
                .map(|p| p.id.clone()),
            settings: self.settings().await,
        }
    }

    async fn persist(&self) -> PrintServiceResult<()> {
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.config().await;
        self.store.save(&snapshot).await.map_err(|e| {
            warn!(path = %self.store.path().display(), error = %e, "Failed to persist print config");
            PrintServiceError::Storage(e)
        })
    }
}

impl std::fmt::Debug for PrintService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintService")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

fn retry_delay(attempt: u32) -> Duration {
    RETRY_BASE
        .saturating_mul(1u32 << attempt.min(8))
        .min(RETRY_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printing::dispatch::CloudEndpoints;
    use crate::printing::drivers::{CatalogEntry, DriverInstaller};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    struct NoopInstaller;

    #[async_trait]
    impl DriverInstaller for NoopInstaller {
        async fn install(&self, _entry: &CatalogEntry) -> Result<(), DriverError> {
            Ok(())
        }
    }

    async fn open_service(dir: &tempfile::TempDir) -> PrintService {
        PrintService::open(
            PrintConfigStore::new(dir.path().join("printer-config.json")),
            Dispatcher::new(reqwest::Client::new(), CloudEndpoints::new()),
            DriverManager::new(Arc::new(NoopInstaller)),
        )
        .await
    }

    fn network_printer(id: &str, port: u16, is_default: bool) -> PrinterConfig {
        PrinterConfig {
            id: id.to_string(),
            name: id.to_string(),
            kind: PrinterKind::Thermal,
            transport: Transport::Ethernet {
                ip: "127.0.0.1".to_string(),
                port,
            },
            model: String::new(),
            status: PrinterStatus::Disconnected,
            enabled: true,
            is_default,
        }
    }

    fn no_retry() -> GlobalSettings {
        retries(0)
    }

    fn retries(retry_attempts: u32) -> GlobalSettings {
        GlobalSettings {
            autoprint: true,
            retry_attempts,
            timeout: 1000,
        }
    }

    /// Loopback printer that resets its first `failures` connections
    ///
    /// Returns the port and a count of accepted connections.
    async fn flaky_printer(failures: usize) -> (u16, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= failures {
                    // Closing with unread data makes the kernel answer with RST
                    let _ = socket.readable().await;
                    drop(socket);
                } else {
                    let mut buf = Vec::new();
                    let _ = socket.read_to_end(&mut buf).await;
                }
            }
        });
        (port, accepted)
    }

    async fn wait_for(accepted: &AtomicUsize, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while accepted.load(Ordering::SeqCst) < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_retry_delay_caps() {
        assert_eq!(retry_delay(0), Duration::from_millis(200));
        assert_eq!(retry_delay(1), Duration::from_millis(400));
        assert_eq!(retry_delay(3), Duration::from_millis(1600));
        assert_eq!(retry_delay(4), RETRY_CAP);
        assert_eq!(retry_delay(31), RETRY_CAP);
    }

    #[tokio::test]
    async fn test_print_order_to_default() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            socket.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let dir = tempfile::tempdir().unwrap();
        let service = open_service(&dir).await;
        service
            .replace_config(vec![network_printer("p1", port, true)], None, Some(no_retry()))
            .await
            .unwrap();

        assert!(service.print_order(&OrderData::sample(), None).await.unwrap());
        assert_eq!(service.get("p1").await.unwrap().status, PrinterStatus::Connected);

        let received = server.await.unwrap();
        assert_eq!(&received[..2], &[0x1B, 0x40]);
    }

    #[tokio::test]
    async fn test_failed_dispatch_marks_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let service = open_service(&dir).await;
        service
            .replace_config(vec![network_printer("p1", port, true)], Some(Vec::new()), Some(no_retry()))
            .await
            .unwrap();

        assert!(!service.print_order(&OrderData::sample(), Some("p1")).await.unwrap());
        assert_eq!(service.get("p1").await.unwrap().status, PrinterStatus::Error);
        assert_eq!(service.status().await.printers.error, 1);
    }

    #[tokio::test]
    async fn test_no_target_leaves_status_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(&dir).await;
        let mut printer = network_printer("p1", 9, true);
        printer.enabled = false;
        service
            .replace_config(vec![printer], None, None)
            .await
            .unwrap();

        assert!(matches!(
            service.print_order(&OrderData::sample(), None).await,
            Err(PrintServiceError::NoTarget)
        ));
        assert!(matches!(
            service.print_order(&OrderData::sample(), Some("p1")).await,
            Err(PrintServiceError::PrinterDisabled(_))
        ));
        assert!(matches!(
            service.test_print("ghost").await,
            Err(PrintServiceError::PrinterNotFound(_))
        ));
        assert_eq!(
            service.get("p1").await.unwrap().status,
            PrinterStatus::Disconnected
        );
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(&dir).await;

        let create: PrinterCreate = serde_json::from_value(serde_json::json!({
            "name": "Bar",
            "type": "impact",
            "connectionType": "wifi",
            "ip": "10.0.0.9",
            "isDefault": true
        }))
        .unwrap();
        let added = service.add(create).await.unwrap();
        assert!(uuid::Uuid::parse_str(&added.id).is_ok());

        let reopened = open_service(&dir).await;
        let printers = reopened.list().await;
        assert_eq!(printers.len(), 2);
        assert_eq!(printers.iter().filter(|p| p.is_default).count(), 1);
        assert!(reopened.get(&added.id).await.unwrap().is_default);

        reopened.delete(&added.id).await.unwrap();
        assert_eq!(open_service(&dir).await.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_configure_usb_printer() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(&dir).await;

        assert!(!service.auto_configure_printer("9999", "9999", "/dev/usb/lp0").await);
        assert_eq!(service.list().await.len(), 1);

        let printer = service
            .configure_usb_printer("04B8", "0202", "/dev/usb/lp0")
            .await
            .unwrap();
        assert_eq!(printer.id, "usb-04b8-0202");
        assert_eq!(printer.model, "TM-T88V");
        assert!(printer.enabled);
        assert!(!printer.is_default);

        // Same device again updates in place
        assert!(service.auto_configure_printer("04b8", "0202", "/dev/usb/lp1").await);
        assert_eq!(service.list().await.len(), 2);
        assert_eq!(
            service.get("usb-04b8-0202").await.unwrap().transport.address(),
            "/dev/usb/lp1"
        );
        assert!(
            service
                .list_drivers()
                .iter()
                .any(|d| d.id == "epson-tm-t88v" && d.status == shared::models::DriverStatus::Installed)
        );
    }

    #[tokio::test]
    async fn test_retry_recovers_after_failures() {
        let (port, accepted) = flaky_printer(2).await;
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(&dir).await;
        service
            .replace_config(vec![network_printer("p1", port, true)], None, Some(retries(2)))
            .await
            .unwrap();

        assert!(service.print_order(&OrderData::sample(), None).await.unwrap());
        assert_eq!(accepted.load(Ordering::SeqCst), 3);
        assert_eq!(service.get("p1").await.unwrap().status, PrinterStatus::Connected);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_attempts() {
        let (port, accepted) = flaky_printer(usize::MAX).await;
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(&dir).await;
        service
            .replace_config(vec![network_printer("p1", port, true)], None, Some(retries(1)))
            .await
            .unwrap();

        let printing = {
            let service = service.clone();
            tokio::spawn(async move { service.print_order(&OrderData::sample(), None).await })
        };

        // Status is only written once the last attempt is done
        wait_for(&accepted, 1).await;
        assert_eq!(service.get("p1").await.unwrap().status, PrinterStatus::Disconnected);

        assert!(!printing.await.unwrap().unwrap());
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
        assert_eq!(service.get("p1").await.unwrap().status, PrinterStatus::Error);
    }

    #[tokio::test]
    async fn test_delete_stops_retrying() {
        let (port, accepted) = flaky_printer(usize::MAX).await;
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(&dir).await;
        service
            .replace_config(vec![network_printer("p1", port, true)], None, Some(retries(5)))
            .await
            .unwrap();

        let printing = {
            let service = service.clone();
            tokio::spawn(async move { service.print_order(&OrderData::sample(), Some("p1")).await })
        };

        wait_for(&accepted, 1).await;
        service.delete("p1").await.unwrap();

        assert!(!printing.await.unwrap().unwrap());
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
        assert!(service.get("p1").await.is_err());
    }

    #[tokio::test]
    async fn test_print_budget_bounds_retries() {
        let (port, accepted) = flaky_printer(usize::MAX).await;
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(&dir)
            .await
            .with_print_budget(Duration::from_millis(300));
        service
            .replace_config(vec![network_printer("p1", port, true)], None, Some(retries(10)))
            .await
            .unwrap();

        let started = Instant::now();
        assert!(!service.print_order(&OrderData::sample(), None).await.unwrap());
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(accepted.load(Ordering::SeqCst) < 11);
        assert_eq!(service.get("p1").await.unwrap().status, PrinterStatus::Error);
    }
}
