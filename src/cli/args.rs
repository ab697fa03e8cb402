// CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Runner lifecycle model of a recorded event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LifecycleModel {
    /// Hierarchical execution-started/execution-finished callbacks
    Tree,
    /// Start/failure/finish/run-finished callbacks
    Flat,
}

/// Bridge test runner lifecycle events to a test-wise coverage agent
#[derive(Parser, Debug)]
#[command(name = "testwise-bridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Report test starts and ends to a test-wise coverage agent", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose debug output
    #[arg(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Coverage agent base URL (overrides config file and TESTWISE_AGENT_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub agent_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSON-lines lifecycle recording through an adapter
    Replay(ReplayArgs),

    /// Show the resolved configuration and exit
    ShowConfig,

    /// Create default configuration file
    InitConfig(InitConfigArgs),

    /// Print shell completion script
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Lifecycle model the recording was captured from
    #[arg(short = 'm', long, value_enum)]
    pub model: LifecycleModel,

    /// Recording to replay; reads stdin when omitted
    #[arg(required = false)]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InitConfigArgs {
    /// Where to write the configuration file
    #[arg(default_value = ".testwiserc.toml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    /// Shell to generate the script for
    #[arg(value_enum)]
    pub shell: Shell,
}
