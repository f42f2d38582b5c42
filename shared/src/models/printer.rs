//! Printer Model

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use validator::{Validate, ValidationError};

/// Raw TCP port used by most thermal printers (JetDirect)
pub const DEFAULT_RAW_PORT: u16 = 9100;

/// Shown in place of a stored cloud API key
///
/// Sending it back in an update keeps the stored key.
pub const REDACTED_API_KEY: &str = "********";

/// Printer hardware family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterKind {
    #[default]
    Thermal,
    Impact,
    /// Kitchen display system
    Kds,
    Cloud,
}

/// Last observed printer state
///
/// Advisory telemetry only: updated after every dispatch, never consulted
/// when selecting a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterStatus {
    Connected,
    #[default]
    Disconnected,
    Error,
}

/// Connection type tag, as reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Usb,
    Ethernet,
    Wifi,
    Cloud,
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Usb => "usb",
            Self::Ethernet => "ethernet",
            Self::Wifi => "wifi",
            Self::Cloud => "cloud",
        };
        f.write_str(s)
    }
}

/// How a printer is reached
///
/// Flattened into the printer JSON and tagged by `connectionType`:
///
/// ```json
/// { "connectionType": "ethernet", "ip": "192.168.1.100", "port": 9100 }
/// { "connectionType": "usb", "devicePath": "/dev/usb/lp0" }
/// { "connectionType": "cloud", "service": "printnode", "apiKey": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "connectionType",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum Transport {
    Ethernet {
        ip: String,
        #[serde(default = "default_port")]
        port: u16,
    },
    Wifi {
        ip: String,
        #[serde(default = "default_port")]
        port: u16,
    },
    Usb {
        device_path: String,
    },
    Cloud {
        service: String,
        api_key: String,
        /// Printer id on the vendor side
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remote_printer_id: Option<String>,
    },
}

fn default_port() -> u16 {
    DEFAULT_RAW_PORT
}

impl Transport {
    /// Create an ethernet transport on the default raw port
    pub fn ethernet(ip: impl Into<String>) -> Self {
        Self::Ethernet {
            ip: ip.into(),
            port: DEFAULT_RAW_PORT,
        }
    }

    pub fn connection_type(&self) -> ConnectionType {
        match self {
            Self::Ethernet { .. } => ConnectionType::Ethernet,
            Self::Wifi { .. } => ConnectionType::Wifi,
            Self::Usb { .. } => ConnectionType::Usb,
            Self::Cloud { .. } => ConnectionType::Cloud,
        }
    }

    /// Copy with the cloud API key masked
    pub fn redacted(&self) -> Self {
        match self {
            Self::Cloud {
                service,
                remote_printer_id,
                ..
            } => Self::Cloud {
                service: service.clone(),
                api_key: REDACTED_API_KEY.to_string(),
                remote_printer_id: remote_printer_id.clone(),
            },
            other => other.clone(),
        }
    }

    /// Replace a masked API key with the one from `previous`
    pub fn restore_api_key(&mut self, previous: &Transport) {
        if let (
            Self::Cloud { api_key, .. },
            Self::Cloud {
                api_key: stored, ..
            },
        ) = (self, previous)
            && *api_key == REDACTED_API_KEY
        {
            *api_key = stored.clone();
        }
    }

    /// Human-readable address for logs (never includes credentials)
    pub fn address(&self) -> String {
        match self {
            Self::Ethernet { ip, port } | Self::Wifi { ip, port } => format!("{}:{}", ip, port),
            Self::Usb { device_path } => device_path.clone(),
            Self::Cloud {
                service,
                remote_printer_id,
                ..
            } => match remote_printer_id {
                Some(id) => format!("{}/{}", service, id),
                None => service.clone(),
            },
        }
    }
}

/// Field-level checks for a transport
pub fn validate_transport(transport: &Transport) -> Result<(), ValidationError> {
    fn invalid(code: &'static str, message: &'static str) -> ValidationError {
        ValidationError::new(code).with_message(Cow::Borrowed(message))
    }

    match transport {
        Transport::Ethernet { ip, port } | Transport::Wifi { ip, port } => {
            if ip.trim().is_empty() {
                return Err(invalid("ip_required", "ip must not be empty"));
            }
            if ip.parse::<std::net::IpAddr>().is_err() {
                return Err(invalid("ip_invalid", "ip must be an IPv4 or IPv6 address"));
            }
            if *port == 0 {
                return Err(invalid("port_invalid", "port must be between 1 and 65535"));
            }
        }
        Transport::Usb { device_path } => {
            if device_path.trim().is_empty() {
                return Err(invalid("device_path_required", "devicePath must not be empty"));
            }
        }
        Transport::Cloud {
            service, api_key, ..
        } => {
            if service.trim().is_empty() {
                return Err(invalid("service_required", "service must not be empty"));
            }
            if api_key.trim().is_empty() {
                return Err(invalid("api_key_required", "apiKey must not be empty"));
            }
        }
    }
    Ok(())
}

/// Printer entity (one registry entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrinterConfig {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PrinterKind,
    #[serde(flatten)]
    #[validate(custom(function = "validate_transport"))]
    pub transport: Transport,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub status: PrinterStatus,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub is_default: bool,
}

fn default_true() -> bool {
    true
}

impl PrinterConfig {
    pub fn connection_type(&self) -> ConnectionType {
        self.transport.connection_type()
    }

    /// Copy safe to return over the API
    pub fn redacted(&self) -> Self {
        Self {
            transport: self.transport.redacted(),
            ..self.clone()
        }
    }

    /// Candidate produced by discovery: never enabled, never default
    pub fn candidate(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: PrinterKind,
        transport: Transport,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            transport,
            model: model.into(),
            status: PrinterStatus::Disconnected,
            enabled: false,
            is_default: false,
        }
    }
}

/// Create printer payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrinterCreate {
    /// Generated when absent
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: PrinterKind,
    #[serde(flatten)]
    #[validate(custom(function = "validate_transport"))]
    pub transport: Transport,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub model: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub is_default: bool,
}

/// Update printer payload (every field optional)
///
/// A transport is only replaced when `connectionType` and its fields are all
/// present and well-formed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrinterUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<PrinterKind>,
    #[serde(flatten)]
    #[validate(custom(function = "validate_transport"))]
    pub transport: Option<Transport>,
    #[validate(length(max = 100))]
    pub model: Option<String>,
    pub enabled: Option<bool>,
    pub is_default: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printer_json_shape() {
        let printer = PrinterConfig {
            id: "p1".to_string(),
            name: "Kitchen".to_string(),
            kind: PrinterKind::Thermal,
            transport: Transport::ethernet("192.168.1.100"),
            model: "TM-T88V".to_string(),
            status: PrinterStatus::Disconnected,
            enabled: true,
            is_default: true,
        };

        let json = serde_json::to_value(&printer).unwrap();
        assert_eq!(json["type"], "thermal");
        assert_eq!(json["connectionType"], "ethernet");
        assert_eq!(json["ip"], "192.168.1.100");
        assert_eq!(json["port"], 9100);
        assert_eq!(json["isDefault"], true);
        assert_eq!(json["status"], "disconnected");
    }

    #[test]
    fn test_deserialize_cloud_printer() {
        let json = r#"{
            "id": "c1",
            "name": "Relay",
            "type": "cloud",
            "connectionType": "cloud",
            "service": "printnode",
            "apiKey": "secret",
            "remotePrinterId": "42",
            "enabled": true,
            "isDefault": false
        }"#;
        let printer: PrinterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(printer.connection_type(), ConnectionType::Cloud);
        assert_eq!(printer.transport.address(), "printnode/42");
        assert_eq!(printer.status, PrinterStatus::Disconnected);
    }

    #[test]
    fn test_redaction_masks_and_restores_key() {
        let stored = Transport::Cloud {
            service: "printnode".to_string(),
            api_key: "secret".to_string(),
            remote_printer_id: Some("42".to_string()),
        };

        let json = serde_json::to_value(stored.redacted()).unwrap();
        assert_eq!(json["apiKey"], REDACTED_API_KEY);
        assert_eq!(json["remotePrinterId"], "42");
        assert_eq!(Transport::ethernet("10.0.0.1").redacted(), Transport::ethernet("10.0.0.1"));

        let mut echoed = stored.redacted();
        echoed.restore_api_key(&stored);
        assert_eq!(echoed, stored);

        // A new key wins
        let mut rotated = Transport::Cloud {
            service: "printnode".to_string(),
            api_key: "fresh".to_string(),
            remote_printer_id: None,
        };
        rotated.restore_api_key(&stored);
        assert!(matches!(rotated, Transport::Cloud { ref api_key, .. } if api_key == "fresh"));
    }

    #[test]
    fn test_port_defaults_to_raw_port() {
        let json = r#"{"connectionType":"wifi","ip":"10.0.0.5"}"#;
        let transport: Transport = serde_json::from_str(json).unwrap();
        assert_eq!(
            transport,
            Transport::Wifi {
                ip: "10.0.0.5".to_string(),
                port: 9100
            }
        );
    }

    #[test]
    fn test_validate_transport() {
        assert!(validate_transport(&Transport::ethernet("192.168.1.10")).is_ok());
        assert!(validate_transport(&Transport::ethernet("not-an-ip")).is_err());
        assert!(
            validate_transport(&Transport::Usb {
                device_path: " ".to_string()
            })
            .is_err()
        );
        assert!(
            validate_transport(&Transport::Cloud {
                service: "printnode".to_string(),
                api_key: String::new(),
                remote_printer_id: None,
            })
            .is_err()
        );
    }

    #[test]
    fn test_create_validation_reports_fields() {
        let create = PrinterCreate {
            id: None,
            name: String::new(),
            kind: PrinterKind::Thermal,
            transport: Transport::ethernet("bad"),
            model: String::new(),
            enabled: true,
            is_default: false,
        };
        let errors = create.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("transport"));
    }

    #[test]
    fn test_update_without_transport() {
        let update: PrinterUpdate = serde_json::from_str(r#"{"isDefault":true}"#).unwrap();
        assert_eq!(update.is_default, Some(true));
        assert!(update.transport.is_none());
        assert!(update.validate().is_ok());
    }
}
