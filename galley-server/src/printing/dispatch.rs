//! Transport dispatch
//!
//! Routes a print job to the adapter for the printer's transport. The
//! contract at this boundary is a boolean: every fault (refused connection,
//! timeout, relay rejection, unknown cloud service, cancellation) is logged
//! and reported as `false`.

use dashmap::DashMap;
use galley_printer::{
    CloudPrinter, CloudService, NetworkPrinter, PrintError, PrintJob, Printer, UsbPrinter,
};
use shared::models::{PrinterConfig, Transport};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Print(#[from] PrintError),

    #[error("Unknown cloud service: {0}")]
    UnknownService(String),

    #[error("Dispatch cancelled")]
    Cancelled,
}

/// In-flight dispatches, keyed by printer id
///
/// Each dispatch runs under a child of the printer's token. Closing a printer
/// cancels the parent, which aborts every dispatch still running for it.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    tokens: Arc<DashMap<String, CancellationToken>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for a new dispatch to `printer_id`
    pub fn token_for(&self, printer_id: &str) -> CancellationToken {
        self.tokens
            .entry(printer_id.to_string())
            .or_insert_with(CancellationToken::new)
            .child_token()
    }

    /// Cancel every dispatch for `printer_id`; true if any were tracked
    pub fn close(&self, printer_id: &str) -> bool {
        match self.tokens.remove(printer_id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

/// Cloud relay base URLs by lowercase service name
pub type CloudEndpoints = HashMap<String, String>;

/// Transport dispatcher
#[derive(Debug, Clone)]
pub struct Dispatcher {
    http: reqwest::Client,
    cloud: Arc<CloudEndpoints>,
    connections: ConnectionTracker,
}

impl Dispatcher {
    pub fn new(http: reqwest::Client, cloud: CloudEndpoints) -> Self {
        Self {
            http,
            cloud: Arc::new(cloud),
            connections: ConnectionTracker::new(),
        }
    }

    pub fn connections(&self) -> &ConnectionTracker {
        &self.connections
    }

    /// Resolve a configured cloud relay account
    pub fn cloud_service(&self, service: &str, api_key: &str) -> Result<CloudService, DispatchError> {
        let key = service.to_ascii_lowercase();
        let base_url = self
            .cloud
            .get(&key)
            .ok_or_else(|| DispatchError::UnknownService(service.to_string()))?;
        Ok(CloudService::new(
            self.http.clone(),
            key,
            base_url.clone(),
            api_key,
        ))
    }

    /// Send one job; never fails, only reports
    #[instrument(skip(self, target, job), fields(printer_id = %target.id, transport = %target.connection_type(), address = %target.transport.address()))]
    pub async fn send(&self, target: &PrinterConfig, job: &PrintJob, connect_timeout: Duration) -> bool {
        let token = self.connections.token_for(&target.id);

        let result = tokio::select! {
            _ = token.cancelled() => Err(DispatchError::Cancelled),
            r = self.deliver(&target.transport, job, connect_timeout) => r,
        };

        match result {
            Ok(()) => {
                info!("Dispatch succeeded");
                true
            }
            Err(e) => {
                warn!(error = %e, "Dispatch failed");
                false
            }
        }
    }

    async fn deliver(
        &self,
        transport: &Transport,
        job: &PrintJob,
        connect_timeout: Duration,
    ) -> Result<(), DispatchError> {
        match transport {
            Transport::Ethernet { ip, port } | Transport::Wifi { ip, port } => {
                NetworkPrinter::new(ip, *port)?
                    .with_timeout(connect_timeout)
                    .print(job)
                    .await?;
            }
            Transport::Usb { device_path } => {
                UsbPrinter::new(device_path).print(job).await?;
            }
            Transport::Cloud {
                service,
                api_key,
                remote_printer_id,
            } => {
                let service = self.cloud_service(service, api_key)?;
                CloudPrinter::new(service, remote_printer_id.clone())
                    .print(job)
                    .await?;
            }
        }
        Ok(())
    }
}
