use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::{Config, Result, ServerError};
use crate::printing::{
    Dispatcher, DiscoveryService, DriverInstaller, DriverManager, LpadminInstaller,
    PrintConfigStore, PrintService,
};

/// Server state
///
/// Cheap to clone; every service inside is a handle over shared state.
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | Immutable configuration |
/// | print_service | Registry, rendering, dispatch, drivers, persistence |
/// | discovery | Network, USB and cloud discovery |
/// | started_at | Process start, for uptime |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub print_service: PrintService,
    pub discovery: DiscoveryService,
    pub started_at: Instant,
}

impl ServerState {
    /// Initialize with the platform driver installer
    pub async fn initialize(config: &Config) -> Result<Self> {
        Self::with_installer(config, Arc::new(LpadminInstaller::new())).await
    }

    /// Initialize with a custom driver installer
    ///
    /// Order:
    /// 1. Work directory
    /// 2. Shared HTTP client and dispatcher
    /// 3. Print service (loads `printer-config.json`)
    /// 4. Discovery
    pub async fn with_installer(
        config: &Config,
        installer: Arc<dyn DriverInstaller>,
    ) -> Result<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| ServerError::Config(format!("work dir {}: {}", config.work_dir, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ServerError::Config(format!("HTTP client: {}", e)))?;
        let dispatcher = Dispatcher::new(http, config.cloud_services.clone());

        let print_service = PrintService::open(
            PrintConfigStore::new(config.config_file()),
            dispatcher.clone(),
            DriverManager::new(installer),
        )
        .await
        .with_print_budget(config.print_budget());

        let discovery = DiscoveryService::new(
            config.discovery_hosts.clone(),
            config.discovery_port,
            Duration::from_millis(config.discovery_timeout_ms),
            dispatcher,
        );

        Ok(Self {
            config: config.clone(),
            print_service,
            discovery,
            started_at: Instant::now(),
        })
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
