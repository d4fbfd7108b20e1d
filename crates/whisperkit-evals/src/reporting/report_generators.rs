use crate::catalog;
use crate::config::Settings;
use crate::errors::{ReportError, ReportResult};
use crate::evals::{fetch_latest_evaluation, verify_apples_to_apples, FetchedEval};
use crate::hub::ArtifactStore;
use crate::metrics::{compute_average_wer, compute_quality_of_inference};
use crate::model_ref::{ModelMapping, ModelReference};
use crate::records::{EvaluationRecord, DEFAULT_METRIC};
use crate::reporting::table::{format_wer, ComparisonRow, FileSize, ReportTable};

/// QoI of the reference row, 100 by definition
const REFERENCE_QOI: f64 = 100.;

/// Builds Quality-of-Inference tables from the latest published evaluations
pub struct ReportGenerator<S> {
    store: S,
    settings: Settings,
}

impl<S: ArtifactStore> ReportGenerator<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// One section per dataset, one table per mapping within it
    pub async fn build_report(
        &self,
        dataset_names: &[String],
        mappings: &[ModelMapping],
    ) -> ReportResult<String> {
        let mut readme = String::new();

        for dataset_name in dataset_names {
            readme.push_str(&format!("\n## Dataset: `{}`\n", dataset_name));
            match catalog::dataset_caption(dataset_name) {
                Some(caption) => readme.push_str(&format!("{}\n", caption)),
                None => tracing::warn!("No caption registered for dataset {}", dataset_name),
            }

            for mapping in mappings {
                let table = self.build_table(dataset_name, mapping).await?;
                readme.push_str(&format!("\n{}\n", table.to_markdown()));
            }
        }

        tracing::info!("Generated README:\n{}", readme);
        Ok(readme)
    }

    /// Reference row first, then every optimized model whose results could be fetched
    pub async fn build_table(
        &self,
        dataset_name: &str,
        mapping: &ModelMapping,
    ) -> ReportResult<ReportTable> {
        let default_repo = &self.settings.report.primary_code_repo;
        let reference = ModelReference::parse(&mapping.reference, default_repo)?;
        let reference_eval = self.fetch(&reference, dataset_name).await?;

        let mut table = ReportTable::new();
        table.upsert(self.reference_row(&reference, &reference_eval)?);

        for optimized_id in &mapping.optimized {
            let optimized = ModelReference::parse(optimized_id, default_repo)?;
            let optimized_eval = match self.fetch(&optimized, dataset_name).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    tracing::warn!("Could not fetch eval JSON for {}: {}", optimized, e);
                    continue;
                }
            };

            tracing::info!("Compare {} vs {}", optimized_eval.link, reference_eval.link);
            table.upsert(self.optimized_row(&optimized, &optimized_eval, &reference_eval.record)?);
        }

        Ok(table)
    }

    async fn fetch(&self, model: &ModelReference, dataset_name: &str) -> ReportResult<FetchedEval> {
        fetch_latest_evaluation(
            &self.store,
            &self.settings,
            &model.code_repo,
            dataset_name,
            &model.model_version,
        )
        .await
    }

    fn reference_row(
        &self,
        reference: &ModelReference,
        eval: &FetchedEval,
    ) -> ReportResult<ComparisonRow> {
        let file_size = known_file_size(reference)
            .ok_or_else(|| ReportError::MissingFileSize(reference.identifier.clone()))?;

        Ok(ComparisonRow {
            label: self.row_label(reference),
            wer: wer_cell(eval)?,
            qoi: REFERENCE_QOI,
            file_size: FileSize::Megabytes(file_size),
            commit: commit_cell(reference, &eval.record),
        })
    }

    fn optimized_row(
        &self,
        optimized: &ModelReference,
        eval: &FetchedEval,
        reference: &EvaluationRecord,
    ) -> ReportResult<ComparisonRow> {
        verify_apples_to_apples(reference, &eval.record);
        let qoi = compute_quality_of_inference(
            &reference.results,
            &eval.record.results,
            DEFAULT_METRIC,
        )?;

        let file_size = known_file_size(optimized)
            .or_else(|| optimized.size_suffix_mb())
            .map_or(FileSize::NotAvailable, FileSize::Megabytes);

        Ok(ComparisonRow {
            label: self.row_label(optimized),
            wer: wer_cell(eval)?,
            qoi: qoi.no_regression,
            file_size,
            commit: commit_cell(optimized, &eval.record),
        })
    }

    /// Primary repository rows link to the model page, others name their repository
    pub fn row_label(&self, model: &ModelReference) -> String {
        let name = model.short_name();
        if model.code_repo == self.settings.report.primary_code_repo {
            format!("[{}]({})", name, self.settings.model_link(&model.model_version))
        } else {
            format!("{} ({})", name, model.code_repo)
        }
    }
}

fn known_file_size(model: &ModelReference) -> Option<u64> {
    catalog::known_file_size(&model.identifier)
        .or_else(|| catalog::known_file_size(&model.qualified()))
}

fn wer_cell(eval: &FetchedEval) -> ReportResult<String> {
    let wer = compute_average_wer(&eval.record.results)?;
    Ok(format!("[{}]({})", format_wer(wer), eval.link))
}

fn commit_cell(model: &ModelReference, record: &EvaluationRecord) -> String {
    let Some(commit_hash) = record.code_commit_hash() else {
        return "N/A".to_string();
    };
    match catalog::repo_url(&model.code_repo) {
        Some(url) => {
            let short: String = commit_hash.chars().take(7).collect();
            format!("[Link]({}/commit/{})", url, short)
        }
        None => {
            tracing::warn!("No repository URL known for {}", model.code_repo);
            "N/A".to_string()
        }
    }
}
