pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{FsWatcher, LocalStorage, WatchFilter};
pub use config::Settings;
pub use crate::core::{
    engine::{BuildEngine, BuildOutcome},
    orchestrator::RebuildOrchestrator,
    pipeline::CardPipeline,
};
pub use utils::error::{CardError, Result};
