use crate::config::Settings;
use crate::errors::{ReportError, ReportResult};
use crate::hub::{ArtifactStore, FetchRequest, RepoType};
use crate::records::EvaluationRecord;
use std::fmt;
use std::fs;
use std::path::Path;

/// An evaluation record together with the Hub page it was published under
#[derive(Debug, Clone)]
pub struct FetchedEval {
    pub record: EvaluationRecord,
    pub link: String,
}

/// Fetch the latest eval for the given code repo, model version and dataset.
///
/// Files are materialized under `settings.cache.local_dir`, mirroring the remote layout.
pub async fn fetch_latest_evaluation<S: ArtifactStore + ?Sized>(
    store: &S,
    settings: &Settings,
    code_repo: &str,
    dataset_name: &str,
    model_version: &str,
) -> ReportResult<FetchedEval> {
    let repo_rel_dir = format!("{}/{}/{}", code_repo, model_version, dataset_name);
    let local_dir = &settings.cache.local_dir;

    store
        .fetch(&FetchRequest {
            repo_id: settings.hub.evals_repo_id.clone(),
            repo_type: RepoType::Dataset,
            local_dir: local_dir.clone(),
            allow_pattern: format!("{}/*.json", repo_rel_dir),
        })
        .await?;

    let eval_dir = local_dir.join(&repo_rel_dir);
    let latest = latest_result_file(&eval_dir)?;
    tracing::info!("Fetched {}", latest);

    let record = EvaluationRecord::from_file(&eval_dir.join(&latest))?;
    Ok(FetchedEval {
        record,
        link: settings.eval_link(&repo_rel_dir),
    })
}

/// Filenames are chronological, so the lexicographically last one is the latest
fn latest_result_file(eval_dir: &Path) -> ReportResult<String> {
    let entries = match fs::read_dir(eval_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReportError::NotFound(eval_dir.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let mut all_results: Vec<String> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                Some(path.file_name()?.to_string_lossy().to_string())
            } else {
                None
            }
        })
        .collect();
    all_results.sort();

    all_results
        .pop()
        .ok_or_else(|| ReportError::NotFound(eval_dir.to_path_buf()))
}

/// Metadata fields that should match between two comparable evaluations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    CodeCommit,
    OsBuild,
    ToolsCommit,
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataField::CodeCommit => write!(f, "code commit"),
            MetadataField::OsBuild => write!(f, "OS version"),
            MetadataField::ToolsCommit => write!(f, "whisperkittools commit"),
        }
    }
}

/// Compare inference context metadata for potential discrepancies.
///
/// Mismatches are only warned about; the comparison still goes ahead.
pub fn verify_apples_to_apples(
    reference: &EvaluationRecord,
    optimized: &EvaluationRecord,
) -> Vec<MetadataField> {
    let checks = [
        (
            MetadataField::CodeCommit,
            reference.code_commit_hash(),
            optimized.code_commit_hash(),
        ),
        (
            MetadataField::OsBuild,
            reference.os_build_number(),
            optimized.os_build_number(),
        ),
        (
            MetadataField::ToolsCommit,
            reference.tools_commit_hash(),
            optimized.tools_commit_hash(),
        ),
    ];

    let mut mismatches = Vec::new();
    for (field, lhs, rhs) in checks {
        if lhs != rhs {
            tracing::warn!(
                "Reference and optimized evals weren't generated with the same {}! ({:?} vs {:?})",
                field,
                lhs,
                rhs
            );
            mismatches.push(field);
        }
    }
    mismatches
}
