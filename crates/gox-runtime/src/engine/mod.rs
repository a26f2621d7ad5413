//! Engine configuration document.
//!
//! - `document` - serde types mirroring the engine's JSON schema
//! - `synthesize` - `ServerDescriptor` to document, total over all protocols
//! - `writer` - canonical two-space JSON, written atomically

mod document;
mod synthesize;
mod writer;

pub use document::{
    EngineConfig, Inbound, LogConfig, Outbound, OutboundSettings, RoutingConfig, RoutingRule,
    ServerEntry, SniffingConfig, SocksSettings, StreamSettings, TlsSettings, VnextServer,
    VnextUser, WsHeaders, WsSettings,
};
pub use synthesize::{
    BLOCK_TAG, DIRECT_TAG, EngineOptions, HTTP_INBOUND_TAG, PROXY_TAG, SOCKS_INBOUND_TAG,
    synthesize, synthesize_with,
};
pub use writer::{ConfigWriteError, to_json, write_config};
