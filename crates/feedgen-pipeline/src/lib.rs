//! Feed generation runs: source → mapping → writer, per destination.

pub mod backend;
pub mod backup;
pub mod error;
pub mod metrics;
pub mod orchestrator;

pub use backend::run_configured;
pub use backup::{backup_path, backup_previous};
pub use error::PipelineError;
pub use metrics::{merge_metrics, read_metrics, write_metrics, DestinationMetrics, MetricsDocument};
pub use orchestrator::{Orchestrator, RunReport};
