pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod server;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub mod observability;
pub mod presentation;

pub use error::{Result, TrackerError};
pub use pipeline::{run, run_default, PipelineOutput};
