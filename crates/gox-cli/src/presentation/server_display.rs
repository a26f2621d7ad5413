//! Detailed view of one server descriptor.

use gox_core::ServerDescriptor;

use super::tables::{mask_secret, or_dash};

/// Print every field of `server`, one per line, with credentials masked.
pub fn display_server(server: &ServerDescriptor) {
    println!("ID:        {}", server.id);
    println!("Name:      {}", server.name);
    println!("Protocol:  {}", server.protocol);
    println!("Address:   {}:{}", server.address, server.port);
    println!("UUID:      {}", or_dash(&server.uuid));
    println!("Password:  {}", mask_secret(&server.password));
    println!("Method:    {}", or_dash(&server.method));
    println!("Network:   {}", server.network_or_default());
    println!("Path:      {}", or_dash(&server.path));
    println!("Host:      {}", or_dash(&server.host));
    println!("TLS:       {}", if server.tls { "yes" } else { "no" });
    println!("SNI:       {}", or_dash(&server.sni));
    println!("Created:   {}", server.created.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated:   {}", server.updated.format("%Y-%m-%d %H:%M:%S"));
}
