//! Server descriptor domain types.
//!
//! A [`ServerDescriptor`] describes one remote proxy server. Only the
//! credential fields relevant to its [`Protocol`] carry meaning; the rest
//! are don't-care and stay empty.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport kind used when a descriptor does not name one.
pub const DEFAULT_NETWORK: &str = "tcp";

/// Protocol tag of a remote server.
///
/// Serialized as a plain lowercase string. Tags outside the supported set
/// are kept verbatim in [`Protocol::Other`] so that a bad record stays
/// visible instead of being coerced into a supported protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Protocol {
    Vmess,
    Vless,
    Trojan,
    Shadowsocks,
    /// Unsupported tag, preserved as written.
    Other(String),
}

impl Protocol {
    /// Wire name of the protocol, as the engine and the registry files spell it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Vmess => "vmess",
            Self::Vless => "vless",
            Self::Trojan => "trojan",
            Self::Shadowsocks => "shadowsocks",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for Protocol {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "vmess" => Self::Vmess,
            "vless" => Self::Vless,
            "trojan" => Self::Trojan,
            "shadowsocks" => Self::Shadowsocks,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for Protocol {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<Protocol> for String {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a descriptor is rejected by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Server name cannot be empty")]
    EmptyName,

    #[error("Server address cannot be empty")]
    EmptyAddress,

    #[error("Port must be between 1 and 65535, got {0}")]
    InvalidPort(u16),

    #[error("Protocol '{0}' is not supported")]
    UnsupportedProtocol(String),

    #[error("{protocol} servers require a {field}")]
    MissingCredential {
        protocol: String,
        field: &'static str,
    },
}

/// Connection parameters for one remote proxy server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    /// Unique identity, assigned by the registry on create.
    #[serde(default)]
    pub id: String,
    /// Display name, unique within the registry.
    pub name: String,
    pub protocol: Protocol,
    /// Host name or IP of the remote server.
    pub address: String,
    pub port: u16,
    /// User identifier (vmess/vless).
    #[serde(default)]
    pub uuid: String,
    /// Password (trojan/shadowsocks).
    #[serde(default)]
    pub password: String,
    /// Cipher method (shadowsocks).
    #[serde(default)]
    pub method: String,
    /// Transport kind: `tcp`, `ws`, `grpc`, ...
    #[serde(default)]
    pub network: String,
    /// WebSocket path.
    #[serde(default)]
    pub path: String,
    /// WebSocket host header.
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub tls: bool,
    /// TLS server name indication.
    #[serde(default)]
    pub sni: String,
    #[serde(default)]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub updated: DateTime<Utc>,
}

impl ServerDescriptor {
    /// Create a descriptor with empty credentials and the default transport.
    pub fn new(
        name: impl Into<String>,
        protocol: impl Into<Protocol>,
        address: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            protocol: protocol.into(),
            address: address.into(),
            port,
            uuid: String::new(),
            password: String::new(),
            method: String::new(),
            network: DEFAULT_NETWORK.to_string(),
            path: String::new(),
            host: String::new(),
            tls: false,
            sni: String::new(),
            created: DateTime::<Utc>::default(),
            updated: DateTime::<Utc>::default(),
        }
    }

    /// Check the record before it is persisted.
    ///
    /// Engine config synthesis never calls this; it must stay total even for
    /// records that would fail here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.address.trim().is_empty() {
            return Err(ValidationError::EmptyAddress);
        }
        if self.port == 0 {
            return Err(ValidationError::InvalidPort(self.port));
        }

        let missing = |field| ValidationError::MissingCredential {
            protocol: self.protocol.to_string(),
            field,
        };

        match self.protocol {
            Protocol::Vmess | Protocol::Vless => {
                if self.uuid.is_empty() {
                    return Err(missing("uuid"));
                }
            }
            Protocol::Trojan => {
                if self.password.is_empty() {
                    return Err(missing("password"));
                }
            }
            Protocol::Shadowsocks => {
                if self.password.is_empty() {
                    return Err(missing("password"));
                }
                if self.method.is_empty() {
                    return Err(missing("method"));
                }
            }
            Protocol::Other(ref tag) => {
                return Err(ValidationError::UnsupportedProtocol(tag.clone()));
            }
        }

        Ok(())
    }

    /// Transport kind, falling back to [`DEFAULT_NETWORK`] when unset.
    pub fn network_or_default(&self) -> &str {
        if self.network.is_empty() {
            DEFAULT_NETWORK
        } else {
            &self.network
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vmess() -> ServerDescriptor {
        let mut server = ServerDescriptor::new("tokyo", "vmess", "1.2.3.4", 443);
        server.uuid = "b831381d-6324-4d53-ad4f-8cda48b30811".to_string();
        server
    }

    #[test]
    fn protocol_parses_known_tags() {
        assert_eq!(Protocol::from("vmess"), Protocol::Vmess);
        assert_eq!(Protocol::from("vless"), Protocol::Vless);
        assert_eq!(Protocol::from("trojan"), Protocol::Trojan);
        assert_eq!(Protocol::from("shadowsocks"), Protocol::Shadowsocks);
        assert_eq!(
            Protocol::from("hysteria2"),
            Protocol::Other("hysteria2".to_string())
        );
    }

    #[test]
    fn protocol_serializes_as_plain_string() {
        let json = serde_json::to_string(&Protocol::Shadowsocks).unwrap();
        assert_eq!(json, "\"shadowsocks\"");

        let other: Protocol = serde_json::from_str("\"wireguard\"").unwrap();
        assert_eq!(other, Protocol::Other("wireguard".to_string()));
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"wireguard\"");
    }

    #[test]
    fn descriptor_reads_record_with_missing_optional_fields() {
        let json = r#"{
            "id": "abc",
            "name": "hk",
            "protocol": "trojan",
            "address": "hk.example.com",
            "port": 443,
            "password": "secret"
        }"#;

        let server: ServerDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(server.protocol, Protocol::Trojan);
        assert!(server.uuid.is_empty());
        assert!(!server.tls);
        assert_eq!(server.network_or_default(), "tcp");
    }

    #[test]
    fn descriptor_rejects_out_of_range_port() {
        let json = r#"{"name":"x","protocol":"vmess","address":"a","port":70000}"#;
        assert!(serde_json::from_str::<ServerDescriptor>(json).is_err());
    }

    #[test]
    fn validate_accepts_complete_vmess() {
        assert!(vmess().validate().is_ok());
    }

    #[test]
    fn validate_rejects_port_zero() {
        let mut server = vmess();
        server.port = 0;
        assert_eq!(server.validate(), Err(ValidationError::InvalidPort(0)));
    }

    #[test]
    fn validate_requires_protocol_credentials() {
        let mut ss = ServerDescriptor::new("ss", "shadowsocks", "5.6.7.8", 8388);
        ss.password = "pw".to_string();
        assert!(matches!(
            ss.validate(),
            Err(ValidationError::MissingCredential { field: "method", .. })
        ));

        ss.method = "aes-256-gcm".to_string();
        assert!(ss.validate().is_ok());

        let vless = ServerDescriptor::new("v", "vless", "5.6.7.8", 443);
        assert!(matches!(
            vless.validate(),
            Err(ValidationError::MissingCredential { field: "uuid", .. })
        ));
    }

    #[test]
    fn validate_rejects_unknown_protocol() {
        let server = ServerDescriptor::new("x", "socks", "1.1.1.1", 1080);
        assert_eq!(
            server.validate(),
            Err(ValidationError::UnsupportedProtocol("socks".to_string()))
        );
    }
}
