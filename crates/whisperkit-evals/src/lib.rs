pub mod catalog;
pub mod config;
pub mod errors;
pub mod evals;
pub mod hub;
pub mod metrics;
pub mod model_ref;
pub mod records;
pub mod reporting;

#[cfg(test)]
mod test_helpers;

// Re-export main components for easier use
pub use config::Settings;
pub use errors::{ReportError, ReportResult};
pub use hub::{ArtifactStore, HubClient};
pub use model_ref::{parse_name, ModelMapping, ModelReference};
pub use reporting::ReportGenerator;
