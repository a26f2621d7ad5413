//! Subcommand definitions.

use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    /// Show all resolved data paths
    Paths,
    /// Manage registered servers
    Servers {
        #[command(subcommand)]
        command: ServerCommand,
    },
    /// Print the engine config that would be written for a server
    Render {
        /// Server ID or name
        identifier: String,
    },
    /// Connect to a server and stay connected until Ctrl-C
    Connect {
        /// Server ID or name
        identifier: String,
    },
    /// View or change application settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Print the end of the newest log file
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value_t = 100)]
        lines: usize,
    },
}

/// Server registry commands.
#[derive(Subcommand)]
pub enum ServerCommand {
    /// List all registered servers
    List,
    /// Show one server in detail
    Show {
        /// Server ID or name
        identifier: String,
    },
    /// Register a new server
    Add(AddServerArgs),
    /// Remove a server from the registry
    Remove {
        /// Server ID or name
        identifier: String,
    },
    /// Give a server a new display name
    Rename {
        /// Server ID or name
        identifier: String,
        new_name: String,
    },
    /// Change connection fields of a server, keeping its ID
    Update(UpdateServerArgs),
}

#[derive(Args, Debug)]
pub struct AddServerArgs {
    /// Display name, unique within the registry
    pub name: String,
    /// vmess, vless, trojan or shadowsocks
    #[arg(long)]
    pub protocol: String,
    /// Host name or IP of the remote server
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub port: u16,
    /// User ID (vmess/vless)
    #[arg(long, default_value = "")]
    pub uuid: String,
    /// Password (trojan/shadowsocks)
    #[arg(long, default_value = "")]
    pub password: String,
    /// Cipher method (shadowsocks)
    #[arg(long, default_value = "")]
    pub method: String,
    /// Transport: tcp, ws, grpc, ...
    #[arg(long, default_value = "tcp")]
    pub network: String,
    /// WebSocket path
    #[arg(long, default_value = "")]
    pub path: String,
    /// WebSocket Host header
    #[arg(long, default_value = "")]
    pub host: String,
    /// Enable TLS (non-tcp transports only)
    #[arg(long)]
    pub tls: bool,
    /// TLS server name
    #[arg(long, default_value = "")]
    pub sni: String,
}

/// Fields of an existing server to overwrite. Omitted flags keep their value.
#[derive(Args, Debug, Default)]
pub struct UpdateServerArgs {
    /// Server ID or name
    pub identifier: String,
    #[arg(long)]
    pub protocol: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub uuid: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub method: Option<String>,
    #[arg(long)]
    pub network: Option<String>,
    #[arg(long)]
    pub path: Option<String>,
    #[arg(long)]
    pub host: Option<String>,
    /// `true` or `false`
    #[arg(long)]
    pub tls: Option<bool>,
    #[arg(long)]
    pub sni: Option<String>,
}

/// Settings commands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show all current settings
    Show,
    /// Set the application log level (trace, debug, info, warn, error)
    SetLogLevel { level: String },
    /// Change the local listener ports
    SetPorts {
        #[arg(long)]
        socks: Option<u16>,
        #[arg(long)]
        http: Option<u16>,
    },
}
