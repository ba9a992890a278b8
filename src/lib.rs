pub mod config;
pub mod core;
pub mod domain;
pub mod prophet;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, ForecastSettings};

pub use crate::core::{
    engine::{ForecastEngine, ForecastRun},
    pipeline::ForecastPipeline,
    provider::{ModelCache, ModelProvider, ModelSource},
};
pub use prophet::ProphetArtifact;
pub use utils::error::{ForecastError, Result};
