//! `ServerDescriptor` to engine document.
//!
//! Synthesis is total: every descriptor yields a document with the two local
//! listeners and the `proxy`, `direct`, `block` outbounds in that order. The
//! engine sends unmatched traffic to the first outbound, so `proxy` must stay
//! first.

use gox_core::{
    DEFAULT_ENGINE_LOG_LEVEL, DEFAULT_HTTP_PORT, DEFAULT_NETWORK, DEFAULT_SOCKS_PORT, Protocol,
    ProxySettings, ServerDescriptor,
};
use tracing::warn;

use super::document::{
    EngineConfig, Inbound, LogConfig, Outbound, OutboundSettings, RoutingConfig, RoutingRule,
    ServerEntry, SniffingConfig, SocksSettings, StreamSettings, TlsSettings, VnextServer,
    VnextUser, WsHeaders, WsSettings,
};

pub const SOCKS_INBOUND_TAG: &str = "socks-in";
pub const HTTP_INBOUND_TAG: &str = "http-in";
pub const PROXY_TAG: &str = "proxy";
pub const DIRECT_TAG: &str = "direct";
pub const BLOCK_TAG: &str = "block";

const DOMAIN_STRATEGY: &str = "IPIfNonMatch";
const SNIFF_PROTOCOLS: [&str; 2] = ["http", "tls"];
const DIRECT_DOMAINS: [&str; 1] = ["geosite:cn"];
const DIRECT_IPS: [&str; 2] = ["geoip:cn", "geoip:private"];

/// Local knobs that are not part of a server descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub socks_port: u16,
    pub http_port: u16,
    /// Written to the engine's `log.loglevel`.
    pub log_level: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            socks_port: DEFAULT_SOCKS_PORT,
            http_port: DEFAULT_HTTP_PORT,
            log_level: DEFAULT_ENGINE_LOG_LEVEL.to_string(),
        }
    }
}

impl From<&ProxySettings> for EngineOptions {
    fn from(settings: &ProxySettings) -> Self {
        Self {
            socks_port: settings.socks_port,
            http_port: settings.http_port,
            log_level: settings.engine_log_level.clone(),
        }
    }
}

/// Build the engine document for `server` with default listener ports.
pub fn synthesize(server: &ServerDescriptor) -> EngineConfig {
    synthesize_with(server, &EngineOptions::default())
}

/// Build the engine document for `server`.
pub fn synthesize_with(server: &ServerDescriptor, options: &EngineOptions) -> EngineConfig {
    EngineConfig {
        log: LogConfig {
            loglevel: options.log_level.clone(),
        },
        inbounds: inbounds(options),
        outbounds: vec![
            proxy_outbound(server),
            fixed_outbound(DIRECT_TAG, "freedom"),
            fixed_outbound(BLOCK_TAG, "blackhole"),
        ],
        routing: routing(),
    }
}

fn sniffing() -> SniffingConfig {
    SniffingConfig {
        enabled: true,
        dest_override: to_strings(&SNIFF_PROTOCOLS),
    }
}

fn inbounds(options: &EngineOptions) -> Vec<Inbound> {
    vec![
        Inbound {
            tag: SOCKS_INBOUND_TAG.to_string(),
            port: options.socks_port,
            protocol: "socks".to_string(),
            settings: Some(SocksSettings {
                auth: "noauth".to_string(),
                udp: true,
            }),
            sniffing: Some(sniffing()),
        },
        Inbound {
            tag: HTTP_INBOUND_TAG.to_string(),
            port: options.http_port,
            protocol: "http".to_string(),
            settings: None,
            sniffing: Some(sniffing()),
        },
    ]
}

fn proxy_outbound(server: &ServerDescriptor) -> Outbound {
    Outbound {
        tag: PROXY_TAG.to_string(),
        protocol: server.protocol.as_str().to_string(),
        settings: Some(outbound_settings(server)),
        stream_settings: stream_settings(server),
    }
}

fn outbound_settings(server: &ServerDescriptor) -> OutboundSettings {
    match &server.protocol {
        Protocol::Vmess => vnext(
            server,
            VnextUser {
                id: server.uuid.clone(),
                alter_id: Some(0),
                security: Some("auto".to_string()),
                encryption: None,
            },
        ),
        Protocol::Vless => vnext(
            server,
            VnextUser {
                id: server.uuid.clone(),
                alter_id: None,
                security: None,
                encryption: Some("none".to_string()),
            },
        ),
        Protocol::Trojan => servers(server, None),
        Protocol::Shadowsocks => servers(server, Some(server.method.clone())),
        Protocol::Other(tag) => {
            warn!(
                protocol = %tag,
                server = %server.name,
                "Unknown protocol, proxy outbound will have empty settings"
            );
            OutboundSettings::Empty {}
        }
    }
}

fn vnext(server: &ServerDescriptor, user: VnextUser) -> OutboundSettings {
    OutboundSettings::Vnext {
        vnext: vec![VnextServer {
            address: server.address.clone(),
            port: server.port,
            users: vec![user],
        }],
    }
}

fn servers(server: &ServerDescriptor, method: Option<String>) -> OutboundSettings {
    OutboundSettings::Servers {
        servers: vec![ServerEntry {
            address: server.address.clone(),
            port: server.port,
            method,
            password: server.password.clone(),
        }],
    }
}

/// Transport block, only for non-default transports.
///
/// TLS and WebSocket settings hang off the transport block, so a plain `tcp`
/// descriptor gets neither even when `tls` is set.
fn stream_settings(server: &ServerDescriptor) -> Option<StreamSettings> {
    let network = server.network_or_default();
    if network == DEFAULT_NETWORK {
        return None;
    }

    let mut stream = StreamSettings {
        network: network.to_string(),
        security: None,
        tls_settings: None,
        ws_settings: None,
    };

    if server.tls {
        stream.security = Some("tls".to_string());
        stream.tls_settings = Some(TlsSettings {
            server_name: server.sni.clone(),
        });
    }

    if network == "ws" {
        stream.ws_settings = Some(WsSettings {
            path: server.path.clone(),
            headers: WsHeaders {
                host: server.host.clone(),
            },
        });
    }

    Some(stream)
}

fn fixed_outbound(tag: &str, protocol: &str) -> Outbound {
    Outbound {
        tag: tag.to_string(),
        protocol: protocol.to_string(),
        settings: None,
        stream_settings: None,
    }
}

fn routing() -> RoutingConfig {
    RoutingConfig {
        domain_strategy: DOMAIN_STRATEGY.to_string(),
        rules: vec![
            RoutingRule {
                rule_type: "field".to_string(),
                outbound_tag: DIRECT_TAG.to_string(),
                domain: to_strings(&DIRECT_DOMAINS),
                ip: Vec::new(),
            },
            RoutingRule {
                rule_type: "field".to_string(),
                outbound_tag: DIRECT_TAG.to_string(),
                domain: Vec::new(),
                ip: to_strings(&DIRECT_IPS),
            },
        ],
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}
