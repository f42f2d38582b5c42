//! Printer registry
//!
//! In-memory store of printer configurations, ordered by insertion.
//! At most one entry carries `is_default = true`; setting the flag on one
//! entry clears it everywhere else.

use shared::models::{PrinterConfig, PrinterStatus, PrinterUpdate};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Printer not found: {0}")]
    NotFound(String),

    #[error("Printer already exists: {0}")]
    AlreadyExists(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Printer registry
#[derive(Debug, Default)]
pub struct PrinterRegistry {
    printers: RwLock<Vec<PrinterConfig>>,
}

impl PrinterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from a stored list (see [`Self::replace_all`])
    pub fn from_printers(printers: Vec<PrinterConfig>) -> RegistryResult<Self> {
        Ok(Self {
            printers: RwLock::new(normalize(printers)?),
        })
    }

    pub async fn add(&self, printer: PrinterConfig) -> RegistryResult<PrinterConfig> {
        let mut printers = self.printers.write().await;
        if printers.iter().any(|p| p.id == printer.id) {
            return Err(RegistryError::AlreadyExists(printer.id));
        }
        if printer.is_default {
            clear_default(&mut printers);
        }
        printers.push(printer.clone());
        debug!(printer_id = %printer.id, "Printer added");
        Ok(printer)
    }

    pub async fn update(&self, id: &str, update: PrinterUpdate) -> RegistryResult<PrinterConfig> {
        let mut printers = self.printers.write().await;
        let index = printers
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        if update.is_default == Some(true) {
            clear_default(&mut printers);
        }

        let printer = &mut printers[index];
        if let Some(name) = update.name {
            printer.name = name;
        }
        if let Some(kind) = update.kind {
            printer.kind = kind;
        }
        if let Some(transport) = update.transport {
            printer.transport = transport;
        }
        if let Some(model) = update.model {
            printer.model = model;
        }
        if let Some(enabled) = update.enabled {
            printer.enabled = enabled;
        }
        if let Some(is_default) = update.is_default {
            printer.is_default = is_default;
        }
        Ok(printer.clone())
    }

    pub async fn delete(&self, id: &str) -> RegistryResult<PrinterConfig> {
        let mut printers = self.printers.write().await;
        let index = printers
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        Ok(printers.remove(index))
    }

    pub async fn get(&self, id: &str) -> Option<PrinterConfig> {
        self.printers.read().await.iter().find(|p| p.id == id).cloned()
    }

    pub async fn list(&self) -> Vec<PrinterConfig> {
        self.printers.read().await.clone()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.printers.read().await.iter().any(|p| p.id == id)
    }

    /// Record the last observed status; returns false if the id is gone
    pub async fn set_status(&self, id: &str, status: PrinterStatus) -> bool {
        let mut printers = self.printers.write().await;
        match printers.iter_mut().find(|p| p.id == id) {
            Some(printer) => {
                printer.status = status;
                true
            }
            None => false,
        }
    }

    /// The enabled default printer, if there is one
    pub async fn default_target(&self) -> Option<PrinterConfig> {
        self.printers
            .read()
            .await
            .iter()
            .find(|p| p.is_default && p.enabled)
            .cloned()
    }

    /// Replace every entry
    ///
    /// Duplicate ids are rejected. If several entries claim the default, the
    /// first one keeps it.
    pub async fn replace_all(&self, printers: Vec<PrinterConfig>) -> RegistryResult<()> {
        let printers = normalize(printers)?;
        *self.printers.write().await = printers;
        Ok(())
    }
}

fn clear_default(printers: &mut [PrinterConfig]) {
    for p in printers.iter_mut() {
        p.is_default = false;
    }
}

fn normalize(mut printers: Vec<PrinterConfig>) -> RegistryResult<Vec<PrinterConfig>> {
    for (i, p) in printers.iter().enumerate() {
        if printers[..i].iter().any(|q| q.id == p.id) {
            return Err(RegistryError::AlreadyExists(p.id.clone()));
        }
    }

    let mut seen_default = false;
    for p in printers.iter_mut() {
        if p.is_default {
            if seen_default {
                warn!(printer_id = %p.id, "Multiple default printers, clearing extra default");
                p.is_default = false;
            }
            seen_default = true;
        }
    }
    Ok(printers)
}
