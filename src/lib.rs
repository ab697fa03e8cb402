pub mod agent;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod listener;
pub mod logging;
pub mod report;
pub mod state;

pub use error::{BridgeError, Result};
pub use listener::{FlatListener, LifecycleAdapter, TreeListener};
pub use report::TestwiseReporter;
pub use state::{ExecutionOutcome, SourceStatus, TestPath};
