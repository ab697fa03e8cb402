// Main entry point for testwise-bridge

use anyhow::Result;
use clap::Parser;
use tracing::info;

use testwise_bridge::cli::{Cli, Commands};
use testwise_bridge::commands;
use testwise_bridge::logging;

// No Tokio runtime here: the HTTP agent owns one and waits on its tasks.
fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    if cli.verbose {
        info!("Starting testwise-bridge v{}", env!("CARGO_PKG_VERSION"));
    }

    match &cli.command {
        Commands::Replay(args) => {
            let config = commands::resolve_config(&cli)?;
            let summary = commands::handle_replay(args, &config)?;
            println!("{}", summary);
            Ok(())
        }
        Commands::ShowConfig => {
            let config = commands::resolve_config(&cli)?;
            commands::handle_show_config(&config)
        }
        Commands::InitConfig(args) => commands::handle_init_config(args),
        Commands::Completion(args) => commands::handle_completion(args.shell),
    }
}
