// Replay command - feeds a recorded lifecycle stream through an adapter

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::Arc;
use tracing::info;

use crate::cli::{LifecycleModel, ReplayArgs};
use crate::config::Config;
use crate::listener::{FlatListener, ReplaySummary, TreeListener, replay};
use crate::report::TestwiseReporter;

pub fn handle_replay(args: &ReplayArgs, config: &Config) -> Result<ReplaySummary> {
    let reporter = Arc::new(
        TestwiseReporter::from_config(&config.agent)
            .context("Failed to set up coverage agent client")?,
    );

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    info!(model = ?args.model, "Replaying lifecycle events");

    let summary = match args.model {
        LifecycleModel::Tree => replay(&TreeListener::new(reporter), reader)?,
        LifecycleModel::Flat => replay(&FlatListener::new(reporter), reader)?,
    };

    Ok(summary)
}
