use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/galley | Config file and logs |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | LOG_LEVEL | info | Log filter when RUST_LOG is unset |
/// | LOG_JSON | false | JSON log lines |
/// | ENVIRONMENT | development | development, staging or production |
/// | DISCOVERY_HOSTS | 192.168.1.100-192.168.1.120 | Comma list of IPs or `a-b` ranges |
/// | DISCOVERY_PORT | 9100 | Raw print port to probe |
/// | DISCOVERY_TIMEOUT_MS | 2000 | Per-host probe timeout |
/// | CLOUD_SERVICES | printnode=https://api.printnode.com | `name=url` pairs |
/// | REQUEST_TIMEOUT_MS | 30000 | HTTP request timeout |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/galley HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory for `printer-config.json` and logs
    pub work_dir: String,
    pub http_port: u16,
    pub log_level: String,
    pub log_json: bool,
    /// development | staging | production
    pub environment: String,
    /// Hosts probed by network discovery
    pub discovery_hosts: Vec<IpAddr>,
    pub discovery_port: u16,
    pub discovery_timeout_ms: u64,
    /// Cloud relay base URLs keyed by lowercase service name
    pub cloud_services: HashMap<String, String>,
    pub request_timeout_ms: u64,
}

const DEFAULT_DISCOVERY_HOSTS: &str = "192.168.1.100-192.168.1.120";
const DEFAULT_CLOUD_SERVICES: &str = "printnode=https://api.printnode.com";

impl Config {
    /// Load configuration from the environment
    ///
    /// Unset or unparsable variables fall back to their defaults.
    pub fn from_env() -> Self {
        let discovery_hosts = std::env::var("DISCOVERY_HOSTS")
            .unwrap_or_else(|_| DEFAULT_DISCOVERY_HOSTS.into());
        let cloud_services =
            std::env::var("CLOUD_SERVICES").unwrap_or_else(|_| DEFAULT_CLOUD_SERVICES.into());

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/galley".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            discovery_hosts: parse_hosts(&discovery_hosts),
            discovery_port: std::env::var("DISCOVERY_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(shared::models::DEFAULT_RAW_PORT),
            discovery_timeout_ms: std::env::var("DISCOVERY_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(2000),
            cloud_services: parse_cloud_services(&cloud_services),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
        }
    }

    /// Override the parts tests care about
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// `<WORK_DIR>/printer-config.json`
    pub fn config_file(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("printer-config.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the work directory layout
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::create_dir_all(self.log_dir())
    }

    /// Upper bound for one print, retries included
    ///
    /// A fifth of the request timeout is left for rendering the response, so
    /// a slow printer yields `success: false` instead of a cut connection.
    pub fn print_budget(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.saturating_mul(4) / 5)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Most hosts one network scan may cover (a /22)
pub const MAX_DISCOVERY_HOSTS: usize = 1024;

/// Parse `10.0.0.5, 192.168.1.100-192.168.1.120`
///
/// Ranges are inclusive and IPv4 only. Bad entries and ranges wider than
/// [`MAX_DISCOVERY_HOSTS`] are skipped with a warning; the total is clamped
/// to the same limit.
pub fn parse_hosts(raw: &str) -> Vec<IpAddr> {
    let mut hosts = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                match (
                    start.trim().parse::<std::net::Ipv4Addr>(),
                    end.trim().parse::<std::net::Ipv4Addr>(),
                ) {
                    (Ok(start), Ok(end)) if u32::from(start) <= u32::from(end) => {
                        let width = u64::from(u32::from(end)) - u64::from(u32::from(start)) + 1;
                        if width > MAX_DISCOVERY_HOSTS as u64 {
                            tracing::warn!(entry = part, max = MAX_DISCOVERY_HOSTS, "Ignoring oversized discovery range");
                            continue;
                        }
                        hosts.extend(
                            (u32::from(start)..=u32::from(end))
                                .map(|n| IpAddr::V4(std::net::Ipv4Addr::from(n))),
                        );
                    }
                    _ => tracing::warn!(entry = part, "Ignoring invalid discovery range"),
                }
            }
            None => match part.parse::<IpAddr>() {
                Ok(ip) => hosts.push(ip),
                Err(_) => tracing::warn!(entry = part, "Ignoring invalid discovery host"),
            },
        }
    }
    if hosts.len() > MAX_DISCOVERY_HOSTS {
        tracing::warn!(
            hosts = hosts.len(),
            max = MAX_DISCOVERY_HOSTS,
            "Too many discovery hosts, keeping the first ones"
        );
        hosts.truncate(MAX_DISCOVERY_HOSTS);
    }
    hosts
}

/// Parse `printnode=https://api.printnode.com,other=https://relay.example`
pub fn parse_cloud_services(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (name, url) = pair.split_once('=')?;
            let (name, url) = (name.trim(), url.trim());
            if name.is_empty() || url.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), url.trim_end_matches('/').to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hosts_ranges_and_singles() {
        let hosts = parse_hosts("192.168.1.100-192.168.1.102, 10.0.0.5, bogus, 1.1.1.9-1.1.1.1");
        let expected: Vec<IpAddr> = ["192.168.1.100", "192.168.1.101", "192.168.1.102", "10.0.0.5"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(hosts, expected);
    }

    #[test]
    fn test_parse_hosts_is_capped() {
        // A /8 would be sixteen million probes
        assert_eq!(parse_hosts("10.0.0.0-10.255.255.255, 10.0.0.1"), vec!["10.0.0.1".parse::<IpAddr>().unwrap()]);
        assert_eq!(parse_hosts("0.0.0.0-255.255.255.255"), Vec::<IpAddr>::new());

        // Exactly the limit is accepted
        assert_eq!(parse_hosts("10.0.0.0-10.0.3.255").len(), MAX_DISCOVERY_HOSTS);

        // Several legal ranges are clamped together
        let hosts = parse_hosts("10.0.0.0-10.0.3.255, 10.0.4.0-10.0.4.9");
        assert_eq!(hosts.len(), MAX_DISCOVERY_HOSTS);
        assert_eq!(hosts[0], "10.0.0.0".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_default_discovery_range() {
        assert_eq!(parse_hosts(DEFAULT_DISCOVERY_HOSTS).len(), 21);
    }

    #[test]
    fn test_parse_cloud_services() {
        let services = parse_cloud_services("PrintNode=https://api.printnode.com/, broken, x=");
        assert_eq!(services.len(), 1);
        assert_eq!(services["printnode"], "https://api.printnode.com");
    }

    #[test]
    fn test_paths() {
        let config = Config::with_overrides("/tmp/galley", 0);
        assert_eq!(
            config.config_file(),
            PathBuf::from("/tmp/galley/printer-config.json")
        );
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/galley/logs"));
    }

    #[test]
    fn test_print_budget_fits_request_timeout() {
        let mut config = Config::with_overrides("/tmp/galley", 0);
        config.request_timeout_ms = 30000;
        assert_eq!(config.print_budget(), Duration::from_secs(24));
        config.request_timeout_ms = 600;
        assert!(config.print_budget() < Duration::from_millis(600));
    }
}
