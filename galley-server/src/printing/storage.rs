//! Print configuration storage
//!
//! The whole configuration lives in one JSON document
//! (`printer-config.json` under the work dir). Writes go to a sibling temp
//! file that is renamed over the target, so a crash never leaves a torn file.

use shared::models::{PrintConfigSnapshot, PrinterStatus};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use validator::Validate;

#[derive(Debug, Error)]
pub enum PrintStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored config: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

pub type StorageResult<T> = Result<T, PrintStorageError>;

/// JSON file store for [`PrintConfigSnapshot`]
#[derive(Debug, Clone)]
pub struct PrintConfigStore {
    path: PathBuf,
}

impl PrintConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored snapshot
    ///
    /// Falls back to [`PrintConfigSnapshot::builtin`] when the file is missing,
    /// unreadable, not valid JSON or fails the same validation the API
    /// applies. Statuses are runtime observations and
    /// always start as `disconnected`.
    pub async fn load(&self) -> PrintConfigSnapshot {
        let mut snapshot = match self.read().await {
            Ok(snapshot) => {
                info!(
                    path = %self.path.display(),
                    printers = snapshot.printers.len(),
                    "Print config loaded"
                );
                snapshot
            }
            Err(PrintStorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No print config yet, using built-in default");
                PrintConfigSnapshot::builtin()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Print config unreadable, using built-in default");
                PrintConfigSnapshot::builtin()
            }
        };

        for printer in &mut snapshot.printers {
            printer.status = PrinterStatus::Disconnected;
        }
        snapshot
    }

    async fn read(&self) -> StorageResult<PrintConfigSnapshot> {
        let raw = tokio::fs::read(&self.path).await?;
        let snapshot: PrintConfigSnapshot = serde_json::from_slice(&raw)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Write the snapshot atomically
    pub async fn save(&self, snapshot: &PrintConfigSnapshot) -> StorageResult<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{GlobalSettings, PrinterConfig, PrinterKind, Transport};

    #[tokio::test]
    async fn test_missing_file_loads_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrintConfigStore::new(dir.path().join("printer-config.json"));

        let snapshot = store.load().await;
        assert_eq!(snapshot, PrintConfigSnapshot::builtin());
        assert_eq!(snapshot.printers[0].id, "default");
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printer-config.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let snapshot = PrintConfigStore::new(&path).load().await;
        assert_eq!(snapshot, PrintConfigSnapshot::builtin());
    }

    #[tokio::test]
    async fn test_out_of_range_file_loads_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printer-config.json");
        std::fs::write(
            &path,
            br#"{"printers":[],"settings":{"autoprint":true,"retryAttempts":1,"timeout":0}}"#,
        )
        .unwrap();
        assert_eq!(PrintConfigStore::new(&path).load().await, PrintConfigSnapshot::builtin());

        // A printer with an unusable address is rejected the same way
        std::fs::write(
            &path,
            br#"{"printers":[{"id":"p","name":"P","type":"thermal","connectionType":"ethernet","ip":"nowhere"}]}"#,
        )
        .unwrap();
        assert_eq!(PrintConfigStore::new(&path).load().await, PrintConfigSnapshot::builtin());
    }

    #[tokio::test]
    async fn test_save_round_trip_resets_status() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrintConfigStore::new(dir.path().join("nested").join("printer-config.json"));

        let mut snapshot = PrintConfigSnapshot::builtin();
        snapshot.printers.push(PrinterConfig {
            id: "usb-1".to_string(),
            name: "Bar".to_string(),
            kind: PrinterKind::Impact,
            transport: Transport::Usb {
                device_path: "/dev/usb/lp1".to_string(),
            },
            model: "TM-U220".to_string(),
            status: PrinterStatus::Error,
            enabled: false,
            is_default: false,
        });
        snapshot.settings = GlobalSettings {
            autoprint: false,
            retry_attempts: 1,
            timeout: 2000,
        };

        store.save(&snapshot).await.unwrap();
        assert!(!store.path().with_extension("json.tmp").exists());

        let loaded = store.load().await;
        assert_eq!(loaded.printers.len(), 2);
        assert_eq!(loaded.printers[1].status, PrinterStatus::Disconnected);
        assert_eq!(loaded.settings, snapshot.settings);
        assert_eq!(loaded.templates, snapshot.templates);
    }
}
