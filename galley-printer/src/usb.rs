//! USB printer adapter
//!
//! A USB printer is addressed by a device path. When the path is a device
//! node the host exposes (e.g. `/dev/usb/lp0`), the job is written straight
//! to it. A bare name with no separator (`epson-tm-t88v`) is always a spooler
//! queue, as is a path that does not exist; those jobs are piped into
//! `lp -d <queue> -o raw`.

use crate::error::{PrintError, PrintResult};
use crate::job::PrintJob;
use crate::printer::Printer;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// Upper bound for a direct device write
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for the spooler process
const SPOOLER_TIMEOUT: Duration = Duration::from_secs(10);

/// Default spooler submit command
const DEFAULT_SPOOLER: &str = "lp";

/// USB printer
#[derive(Debug, Clone)]
pub struct UsbPrinter {
    device_path: PathBuf,
    spooler: String,
    write_timeout: Duration,
    spooler_timeout: Duration,
}

impl UsbPrinter {
    pub fn new(device_path: impl Into<PathBuf>) -> Self {
        Self {
            device_path: device_path.into(),
            spooler: DEFAULT_SPOOLER.to_string(),
            write_timeout: WRITE_TIMEOUT,
            spooler_timeout: SPOOLER_TIMEOUT,
        }
    }

    /// Use a different spooler binary (must accept `-d <queue> -o raw`)
    pub fn with_spooler(mut self, program: impl Into<String>) -> Self {
        self.spooler = program.into();
        self
    }

    pub fn with_spooler_timeout(mut self, timeout: Duration) -> Self {
        self.spooler_timeout = timeout;
        self
    }

    pub fn device_path(&self) -> &Path {
        &self.device_path
    }

    /// A bare queue name, never opened as a file
    fn is_queue_name(&self) -> bool {
        !self
            .device_path
            .to_string_lossy()
            .contains(std::path::is_separator)
    }

    /// Spooler queue name derived from the device path
    fn queue(&self) -> String {
        self.device_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.device_path.to_string_lossy().into_owned())
    }

    async fn write_device(&self, data: &[u8]) -> PrintResult<()> {
        let write = async {
            let mut file = tokio::fs::OpenOptions::new()
                .write(true)
                .open(&self.device_path)
                .await?;
            file.write_all(data).await?;
            file.flush().await
        };

        tokio::time::timeout(self.write_timeout, write)
            .await
            .map_err(|_| {
                PrintError::Timeout(format!("Device write: {}", self.device_path.display()))
            })?
            .map_err(PrintError::Io)
    }

    async fn submit_to_spooler(&self, data: &[u8]) -> PrintResult<()> {
        let queue = self.queue();
        let mut child = Command::new(&self.spooler)
            .args(["-d", queue.as_str(), "-o", "raw"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            // Dropping the future (timeout, cancellation) must not leave a stray lp
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PrintError::Spooler(format!("{}: {}", self.spooler, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PrintError::Spooler("stdin not captured".to_string()))?;

        let run = async {
            stdin.write_all(data).await?;
            stdin.shutdown().await?;
            drop(stdin);
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(self.spooler_timeout, run)
            .await
            .map_err(|_| PrintError::Timeout(format!("Spooler {} for queue {}", self.spooler, queue)))?
            .map_err(|e| PrintError::Spooler(e.to_string()))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(PrintError::Spooler(format!(
                "{} exited with {}: {}",
                self.spooler,
                output.status,
                stderr.trim()
            )))
        }
    }
}

impl Printer for UsbPrinter {
    #[instrument(skip(self, job), fields(device = %self.device_path.display(), data_len = job.len()))]
    async fn print(&self, job: &PrintJob) -> PrintResult<()> {
        let data = job.bytes();

        if self.is_queue_name() {
            info!(spooler = %self.spooler, "Submitting to spooler queue");
            self.submit_to_spooler(&data).await?;
        } else if tokio::fs::metadata(&self.device_path).await.is_ok() {
            info!("Writing to device node");
            self.write_device(&data).await?;
        } else {
            info!(spooler = %self.spooler, "Device node absent, submitting to spooler");
            self.submit_to_spooler(&data).await?;
        }

        info!("Print job sent successfully");
        Ok(())
    }

    async fn is_online(&self) -> bool {
        // The spooler accepts jobs for a queue whether or not the device is attached
        if self.is_queue_name() {
            return true;
        }
        let present = tokio::fs::metadata(&self.device_path).await.is_ok();
        if !present {
            warn!(device = %self.device_path.display(), "USB device node not present");
        }
        present
    }
}
