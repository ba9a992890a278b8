pub mod backfill;
pub mod engine;
pub mod export;
pub mod forecast;
pub mod pipeline;
pub mod provider;

pub use crate::domain::model::{DisplayFrame, ForecastFrame, ForecastResult, FutureFrame};
pub use crate::domain::ports::{ConfigProvider, ForecastModel, Pipeline, Storage};
pub use crate::utils::error::Result;
