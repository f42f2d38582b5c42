//! Global print settings and persisted snapshot

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::printer::{PrinterConfig, PrinterKind, PrinterStatus, Transport};
use super::template::PrintTemplate;

/// Global settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    /// Print new orders without operator confirmation
    #[serde(default = "default_autoprint")]
    pub autoprint: bool,
    /// Extra attempts after the first failed dispatch
    #[serde(default = "default_retry_attempts")]
    #[validate(range(max = 10))]
    pub retry_attempts: u32,
    /// Network connect timeout in milliseconds
    #[serde(default = "default_timeout")]
    #[validate(range(min = 100, max = 60000))]
    pub timeout: u64,
}

fn default_autoprint() -> bool {
    true
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_timeout() -> u64 {
    5000
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            autoprint: default_autoprint(),
            retry_attempts: default_retry_attempts(),
            timeout: default_timeout(),
        }
    }
}

/// Persisted print configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrintConfigSnapshot {
    #[serde(default)]
    #[validate(nested)]
    pub printers: Vec<PrinterConfig>,
    #[serde(default)]
    #[validate(nested)]
    pub templates: Vec<PrintTemplate>,
    #[serde(default)]
    #[validate(nested)]
    pub settings: GlobalSettings,
}

impl PrintConfigSnapshot {
    /// Copy with every cloud API key masked
    pub fn redacted(&self) -> Self {
        Self {
            printers: self.printers.iter().map(PrinterConfig::redacted).collect(),
            ..self.clone()
        }
    }

    /// Built-in configuration: one enabled default ethernet printer
    pub fn builtin() -> Self {
        Self {
            printers: vec![PrinterConfig {
                id: "default".to_string(),
                name: "Kitchen Printer".to_string(),
                kind: PrinterKind::Thermal,
                transport: Transport::ethernet("192.168.1.100"),
                model: String::new(),
                status: PrinterStatus::Disconnected,
                enabled: true,
                is_default: true,
            }],
            templates: PrintTemplate::defaults(),
            settings: GlobalSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings: GlobalSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, GlobalSettings::default());
        assert_eq!(settings.retry_attempts, 3);
        assert_eq!(settings.timeout, 5000);
    }

    #[test]
    fn test_builtin_has_single_default() {
        let snapshot = PrintConfigSnapshot::builtin();
        assert_eq!(snapshot.printers.iter().filter(|p| p.is_default).count(), 1);
        assert!(snapshot.printers[0].enabled);
    }

    #[test]
    fn test_snapshot_partial_json() {
        let json = r#"{"printers":[],"settings":{"retryAttempts":0}}"#;
        let snapshot: PrintConfigSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.templates.is_empty());
        assert_eq!(snapshot.settings.retry_attempts, 0);
        assert_eq!(snapshot.settings.timeout, 5000);
    }
}
