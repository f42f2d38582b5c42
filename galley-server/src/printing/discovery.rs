//! Printer discovery
//!
//! Finds reachable printers per transport and reports them as candidates.
//! A candidate is never enabled, never default and never registered here;
//! promotion is an explicit operator action.

use crate::printing::dispatch::{DispatchError, Dispatcher};
use crate::printing::drivers;
use futures::StreamExt;
use futures::future::join_all;
use galley_printer::{NetworkPrinter, PrintError, RemotePrinter};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{PrinterConfig, PrinterKind, Transport, UsbPrinterDevice};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Unknown cloud service: {0}")]
    UnknownService(String),

    #[error("Cloud service {service} rejected the request: {reason}")]
    Rejected { service: String, reason: String },

    #[error("USB enumeration failed: {0}")]
    Usb(String),
}

impl From<DiscoveryError> for AppError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::UnknownService(service) => AppError::with_message(
                ErrorCode::CloudServiceUnknown,
                format!("Cloud service {} is not configured", service),
            )
            .with_detail("service", service),
            DiscoveryError::Rejected { service, reason } => AppError::with_message(
                ErrorCode::CloudServiceRejected,
                format!("Cloud service {} rejected the request: {}", service, reason),
            )
            .with_detail("service", service),
            DiscoveryError::Usb(msg) => AppError::with_message(ErrorCode::DiscoveryFailed, msg),
        }
    }
}

/// Credentials for one cloud relay account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CloudCredentials {
    #[validate(length(min = 1, max = 64))]
    pub service: String,
    #[validate(length(min = 1, max = 512))]
    pub api_key: String,
}

/// Probes in flight at once during a network scan
pub const DISCOVERY_CONCURRENCY: usize = 64;

/// Discovery service
#[derive(Debug, Clone)]
pub struct DiscoveryService {
    hosts: Vec<IpAddr>,
    port: u16,
    probe_timeout: Duration,
    dispatcher: Dispatcher,
}

impl DiscoveryService {
    pub fn new(hosts: Vec<IpAddr>, port: u16, probe_timeout: Duration, dispatcher: Dispatcher) -> Self {
        Self {
            hosts,
            port,
            probe_timeout,
            dispatcher,
        }
    }

    /// Probe the candidate hosts, [`DISCOVERY_CONCURRENCY`] at a time
    ///
    /// Candidates come back in host order.
    #[instrument(skip(self), fields(hosts = self.hosts.len(), port = self.port))]
    pub async fn discover_network(&self) -> Vec<PrinterConfig> {
        let probes: Vec<(IpAddr, bool)> = futures::stream::iter(self.hosts.iter().copied())
            .map(|ip| async move {
                let reachable =
                    NetworkPrinter::probe(SocketAddr::new(ip, self.port), self.probe_timeout).await;
                (ip, reachable)
            })
            .buffered(DISCOVERY_CONCURRENCY)
            .collect()
            .await;

        let found: Vec<PrinterConfig> = probes
            .into_iter()
            .filter(|(_, reachable)| *reachable)
            .map(|(ip, _)| {
                PrinterConfig::candidate(
                    format!("net-{}", ip.to_string().replace(['.', ':'], "-")),
                    format!("Network Printer ({})", ip),
                    PrinterKind::Thermal,
                    Transport::Ethernet {
                        ip: ip.to_string(),
                        port: self.port,
                    },
                    "",
                )
            })
            .collect();

        info!(found = found.len(), "Network discovery finished");
        found
    }

    /// List USB devices that match the catalog
    ///
    /// Unknown devices are dropped. The device path of a match is its driver
    /// queue name.
    pub async fn discover_usb(&self) -> Result<Vec<UsbPrinterDevice>, DiscoveryError> {
        let devices = tokio::task::spawn_blocking(list_usb_devices)
            .await
            .map_err(|e| DiscoveryError::Usb(e.to_string()))??;
        info!(found = devices.len(), "USB discovery finished");
        Ok(devices)
    }

    /// Query every account and aggregate the results
    ///
    /// A failing account is logged and contributes nothing.
    pub async fn discover_cloud(&self, accounts: &[CloudCredentials]) -> Vec<PrinterConfig> {
        let lookups = accounts.iter().map(|account| async move {
            match self.test_cloud(account).await {
                Ok(printers) => printers
                    .into_iter()
                    .map(|remote| cloud_candidate(account, remote))
                    .collect(),
                Err(e) => {
                    warn!(service = %account.service, error = %e, "Cloud discovery failed");
                    Vec::new()
                }
            }
        });

        let found: Vec<PrinterConfig> = join_all(lookups).await.into_iter().flatten().collect();
        info!(accounts = accounts.len(), found = found.len(), "Cloud discovery finished");
        found
    }

    /// List the printers behind one account, surfacing any failure
    #[instrument(skip(self, account), fields(service = %account.service))]
    pub async fn test_cloud(
        &self,
        account: &CloudCredentials,
    ) -> Result<Vec<RemotePrinter>, DiscoveryError> {
        let service = self
            .dispatcher
            .cloud_service(&account.service, &account.api_key)
            .map_err(|e| match e {
                DispatchError::UnknownService(name) => DiscoveryError::UnknownService(name),
                other => DiscoveryError::Rejected {
                    service: account.service.clone(),
                    reason: other.to_string(),
                },
            })?;

        service.printers().await.map_err(|e| {
            let reason = match e {
                PrintError::Rejected { status, .. } => format!("HTTP {}", status),
                other => other.to_string(),
            };
            DiscoveryError::Rejected {
                service: account.service.clone(),
                reason,
            }
        })
    }
}

fn cloud_candidate(account: &CloudCredentials, remote: RemotePrinter) -> PrinterConfig {
    let service = account.service.to_ascii_lowercase();
    PrinterConfig::candidate(
        format!("cloud-{}-{}", service, remote.id),
        remote.name,
        PrinterKind::Cloud,
        Transport::Cloud {
            service,
            api_key: account.api_key.clone(),
            remote_printer_id: Some(remote.id),
        },
        remote.description.unwrap_or_default(),
    )
}

fn list_usb_devices() -> Result<Vec<UsbPrinterDevice>, DiscoveryError> {
    use nusb::MaybeFuture;

    let devices = nusb::list_devices()
        .wait()
        .map_err(|e| DiscoveryError::Usb(e.to_string()))?;

    let mut found = Vec::new();
    for dev in devices {
        let vendor_id = format!("{:04x}", dev.vendor_id());
        let product_id = format!("{:04x}", dev.product_id());

        let Some(entry) = drivers::lookup(&vendor_id, &product_id) else {
            debug!(%vendor_id, %product_id, "Skipping unknown USB device");
            continue;
        };

        info!(model = entry.model, %vendor_id, %product_id, "Found USB printer");
        found.push(UsbPrinterDevice {
            vendor_id,
            product_id,
            device_path: entry.driver.to_string(),
            manufacturer: dev.manufacturer_string().map(str::to_string),
            product: dev.product_string().map(str::to_string),
            serial_number: dev.serial_number().map(str::to_string),
            model: entry.display_name(),
        });
    }
    Ok(found)
}
