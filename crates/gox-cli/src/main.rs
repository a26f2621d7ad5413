//! CLI entry point.
//!
//! Parses arguments, wires infrastructure via `bootstrap`, and dispatches to
//! handlers. Errors are printed once here and mapped to an exit code.

use clap::{CommandFactory, Parser};

use gox_cli::error::exit_code_for;
use gox_cli::{Cli, CliConfig, Commands, bootstrap, handlers, logging};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code_for(&e));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = bootstrap(CliConfig {
        data_dir: cli.data_dir,
    })
    .await?;

    // The subscriber needs the loaded settings, so bootstrap runs unlogged and
    // its first-run event is reported here.
    let _log_guard = logging::init(&ctx.settings.log, cli.verbose, &ctx.paths.log_dir);
    if ctx.created_settings {
        tracing::info!(path = %ctx.paths.settings_path.display(), "Wrote default settings");
    }
    tracing::debug!(data_root = %ctx.paths.data_root.display(), "Bootstrapped");

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Paths => handlers::paths::execute(&ctx),
        Commands::Servers { command } => handlers::servers::execute(&ctx, command).await?,
        Commands::Render { identifier } => handlers::render::execute(&ctx, &identifier).await?,
        Commands::Connect { identifier } => handlers::connect::execute(&ctx, &identifier).await?,
        Commands::Config { command } => handlers::config::execute(&ctx, command).await?,
        Commands::Logs { lines } => handlers::logs::execute(&ctx, lines).await?,
    }

    Ok(())
}
