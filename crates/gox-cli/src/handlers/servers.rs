//! Server registry command handlers.

use anyhow::Result;
use gox_core::{Protocol, ServerDescriptor};

use super::resolve_server;
use crate::bootstrap::CliContext;
use crate::commands::{AddServerArgs, ServerCommand, UpdateServerArgs};
use crate::error::CliError;
use crate::presentation::{display_server, print_separator, truncate_string};

pub async fn execute(ctx: &CliContext, command: ServerCommand) -> Result<()> {
    match command {
        ServerCommand::List => list(ctx).await,
        ServerCommand::Show { identifier } => {
            display_server(&resolve_server(ctx, &identifier).await?);
            Ok(())
        }
        ServerCommand::Add(args) => add(ctx, args).await,
        ServerCommand::Remove { identifier } => remove(ctx, &identifier).await,
        ServerCommand::Rename {
            identifier,
            new_name,
        } => rename(ctx, &identifier, new_name).await,
        ServerCommand::Update(args) => update(ctx, args).await,
    }
}

async fn list(ctx: &CliContext) -> Result<()> {
    let servers = ctx.registry().list().await.map_err(CliError::from)?;

    if servers.is_empty() {
        println!("No servers registered.");
        println!("Use 'gox servers add <name> --protocol ... --address ... --port ...' to add one.");
        return Ok(());
    }

    println!("Found {} server(s):\n", servers.len());
    println!(
        "{:<36} {:<20} {:<12} {:<28} {:<6} {:<8} TLS",
        "ID", "Name", "Protocol", "Address", "Port", "Network"
    );
    print_separator(118);

    for server in servers {
        println!(
            "{:<36} {:<20} {:<12} {:<28} {:<6} {:<8} {}",
            server.id,
            truncate_string(&server.name, 19),
            server.protocol,
            truncate_string(&server.address, 27),
            server.port,
            server.network_or_default(),
            if server.tls { "yes" } else { "no" }
        );
    }

    Ok(())
}

fn descriptor_from_args(args: AddServerArgs) -> ServerDescriptor {
    let mut server = ServerDescriptor::new(args.name, args.protocol, args.address, args.port);
    server.uuid = args.uuid;
    server.password = args.password;
    server.method = args.method;
    server.network = args.network;
    server.path = args.path;
    server.host = args.host;
    server.tls = args.tls;
    server.sni = args.sni;
    server
}

async fn add(ctx: &CliContext, args: AddServerArgs) -> Result<()> {
    let created = ctx
        .registry()
        .create(descriptor_from_args(args))
        .await
        .map_err(CliError::from)?;
    println!("✓ Added server '{}' (ID: {})", created.name, created.id);
    Ok(())
}

async fn remove(ctx: &CliContext, identifier: &str) -> Result<()> {
    let server = resolve_server(ctx, identifier).await?;
    ctx.registry()
        .delete(&server.id)
        .await
        .map_err(CliError::from)?;
    println!("✓ Removed server '{}'", server.name);
    Ok(())
}

async fn rename(ctx: &CliContext, identifier: &str, new_name: String) -> Result<()> {
    let mut server = resolve_server(ctx, identifier).await?;
    let old_name = std::mem::replace(&mut server.name, new_name);
    let updated = ctx
        .registry()
        .update(server)
        .await
        .map_err(CliError::from)?;
    println!("✓ Renamed '{old_name}' to '{}'", updated.name);
    Ok(())
}

/// Overwrite the fields named in `args`. Returns false when none were given.
fn apply_changes(server: &mut ServerDescriptor, args: UpdateServerArgs) -> bool {
    let mut changed = false;
    let mut set = |field: &mut String, value: Option<String>| {
        if let Some(value) = value {
            *field = value;
            changed = true;
        }
    };
    set(&mut server.address, args.address);
    set(&mut server.uuid, args.uuid);
    set(&mut server.password, args.password);
    set(&mut server.method, args.method);
    set(&mut server.network, args.network);
    set(&mut server.path, args.path);
    set(&mut server.host, args.host);
    set(&mut server.sni, args.sni);

    if let Some(protocol) = args.protocol {
        server.protocol = Protocol::from(protocol);
        changed = true;
    }
    if let Some(port) = args.port {
        server.port = port;
        changed = true;
    }
    if let Some(tls) = args.tls {
        server.tls = tls;
        changed = true;
    }
    changed
}

async fn update(ctx: &CliContext, args: UpdateServerArgs) -> Result<()> {
    let mut server = resolve_server(ctx, &args.identifier).await?;
    if !apply_changes(&mut server, args) {
        return Err(CliError::Arguments(
            "Nothing to change. Pass at least one field flag, see 'gox servers update --help'."
                .to_string(),
        )
        .into());
    }

    let updated = ctx
        .registry()
        .update(server)
        .await
        .map_err(CliError::from)?;
    println!("✓ Updated server '{}' (ID: {})", updated.name, updated.id);
    Ok(())
}
