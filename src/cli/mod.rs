pub mod args;

pub use args::{Cli, Commands, CompletionArgs, InitConfigArgs, LifecycleModel, ReplayArgs};
