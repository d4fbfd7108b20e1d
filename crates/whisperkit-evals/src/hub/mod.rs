pub mod client;
pub mod errors;

pub use client::HubClient;
pub use errors::HubError;

use crate::errors::ReportResult;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoType {
    Dataset,
    Model,
}

impl RepoType {
    /// Path segment used by the Hub API (`/api/datasets/...`, `/api/models/...`)
    pub fn api_segment(&self) -> &'static str {
        match self {
            RepoType::Dataset => "datasets",
            RepoType::Model => "models",
        }
    }

    /// Prefix in front of the repo id for file resolution; models have none
    pub fn url_prefix(&self) -> &'static str {
        match self {
            RepoType::Dataset => "datasets/",
            RepoType::Model => "",
        }
    }
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoType::Dataset => write!(f, "dataset"),
            RepoType::Model => write!(f, "model"),
        }
    }
}

/// Download every file matching `allow_pattern` into `local_dir`, mirroring the repo layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub repo_id: String,
    pub repo_type: RepoType,
    pub local_dir: PathBuf,
    pub allow_pattern: String,
}

/// Commit a local file to `path_in_repo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub path_in_repo: String,
    pub source_file: PathBuf,
    pub repo_id: String,
    pub repo_type: RepoType,
    pub commit_message: String,
}

/// Remote store hosting evaluation results and receiving the generated README
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Returns the local paths of the matching files
    async fn fetch(&self, request: &FetchRequest) -> ReportResult<Vec<PathBuf>>;

    async fn upload(&self, request: &UploadRequest) -> ReportResult<()>;
}
