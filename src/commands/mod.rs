// Commands module - handles CLI command execution

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::path::Path;

use crate::cli::{Cli, InitConfigArgs};
use crate::config::{AgentConfig, Config};

pub mod replay;

pub use replay::handle_replay;

/// Resolve configuration: file, then `TESTWISE_AGENT_URL`, then `--agent-url`
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?.unwrap_or_default(),
    };

    Ok(config
        .with_env_overrides()
        .with_agent_url_override(cli.agent_url.clone()))
}

/// Print the resolved configuration
pub fn handle_show_config(config: &Config) -> Result<()> {
    println!("Current configuration:");
    match config.agent.agent_url() {
        Some(url) => println!("  Coverage agent: {}", url),
        None => println!("  Coverage agent: not configured (reporting disabled)"),
    }
    println!(
        "  Accept partial runs: {}",
        if config.agent.accept_partial {
            "yes"
        } else {
            "no"
        }
    );
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Write a default configuration file
pub fn handle_init_config(args: &InitConfigArgs) -> Result<()> {
    write_default_config(&args.path, args.force)?;
    println!("Configuration written to {}", args.path.display());
    Ok(())
}

pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = Config {
        agent: AgentConfig {
            url: Some("http://localhost:8000".to_string()),
            accept_partial: false,
        },
    };
    std::fs::write(path, config.to_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write the completion script for `shell` to stdout
pub fn handle_completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}
