//! Printer adapters for sending print jobs
//!
//! Supports:
//! - Network printers (raw TCP, port 9100)
//! - USB printers (see `usb`)
//! - Cloud relays (see `cloud`)

use crate::error::{PrintError, PrintResult};
use crate::job::PrintJob;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Deliver one job to the printer
    async fn print(&self, job: &PrintJob) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Default connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait for the peer to close after our write half is shut
const SETTLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Network printer (raw TCP port 9100)
///
/// One connection per job. The job is written in full, flushed, and the write
/// half shut down; the printer then closes its side once it has taken the
/// data. Printers that keep the socket open are given `settle_timeout` before
/// the job is considered delivered.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
    settle_timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        let addr_str = format!("{}:{}", host, port);
        let addr = addr_str
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid address: {}", addr_str)))?;

        Ok(Self {
            addr,
            timeout: CONNECT_TIMEOUT,
            settle_timeout: SETTLE_TIMEOUT,
        })
    }

    /// Create from a socket address
    pub fn from_socket_addr(addr: SocketAddr) -> Self {
        Self {
            addr,
            timeout: CONNECT_TIMEOUT,
            settle_timeout: SETTLE_TIMEOUT,
        }
    }

    /// Set connection timeout (also bounds the write)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set post-write settle timeout
    pub fn with_settle_timeout(mut self, settle_timeout: Duration) -> Self {
        self.settle_timeout = settle_timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Check whether something accepts a TCP connection at `addr`
    pub async fn probe(addr: SocketAddr, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(%addr, error = %e, "Probe refused");
                false
            }
            Err(_) => {
                debug!(%addr, "Probe timeout");
                false
            }
        }
    }

    async fn connect(&self) -> PrintResult<TcpStream> {
        tokio::time::timeout(self.timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))
    }

    /// Wait for the peer to close; expiry of the settle window is success
    async fn settle(&self, stream: &mut TcpStream) -> PrintResult<()> {
        let drain = async {
            let mut sink = [0u8; 256];
            loop {
                match stream.read(&mut sink).await {
                    Ok(0) => return Ok(()),
                    // Status bytes from the printer are ignored
                    Ok(_) => continue,
                    Err(e) => return Err(e),
                }
            }
        };

        match tokio::time::timeout(self.settle_timeout, drain).await {
            Ok(Ok(())) => {
                debug!("Peer closed connection");
                Ok(())
            }
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionReset => Err(PrintError::Io(e)),
            Ok(Err(e)) => {
                warn!(error = %e, "Error while settling, data already flushed");
                Ok(())
            }
            Err(_) => {
                debug!("Settle window elapsed");
                Ok(())
            }
        }
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(self, job), fields(addr = %self.addr, data_len = job.len()))]
    async fn print(&self, job: &PrintJob) -> PrintResult<()> {
        info!("Connecting to printer");

        let mut stream = self.connect().await?;
        let data = job.bytes();

        info!("Connected, sending {} bytes", data.len());

        let write = async {
            stream.write_all(&data).await?;
            stream.flush().await?;
            stream.shutdown().await
        };
        tokio::time::timeout(self.timeout, write)
            .await
            .map_err(|_| PrintError::Timeout(format!("Write timeout: {}", self.addr)))?
            .map_err(|e| {
                PrintError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Write failed: {}", e),
                ))
            })?;

        self.settle(&mut stream).await?;

        info!("Print job sent successfully");
        Ok(())
    }

    #[instrument(skip(self), fields(addr = %self.addr))]
    async fn is_online(&self) -> bool {
        let online = Self::probe(self.addr, Duration::from_millis(500)).await;
        if online {
            info!("Printer online");
        } else {
            warn!("Printer offline");
        }
        online
    }
}
