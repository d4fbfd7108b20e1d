use crate::errors::{util::malformed, ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Per-example metric used for Quality-of-Inference by default
pub const DEFAULT_METRIC: &str = "wer";

/// One persisted run of a model against a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub results: Vec<ExampleResult>,
    pub metadata: EvalMetadata,
}

/// Transcripts and metrics for a single dataset example
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleResult {
    pub reference: String,
    pub prediction: String,
    /// Everything else the harness wrote for this example (`wer`, `file`, timings, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ExampleResult {
    pub fn new(reference: impl Into<String>, prediction: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            prediction: prediction.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.extra.insert(name.to_string(), Value::from(value));
        self
    }

    /// Numeric value of a per-example metric
    pub fn metric(&self, name: &str) -> ReportResult<f64> {
        self.extra
            .get(name)
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                ReportError::MalformedRecord(format!(
                    "example is missing numeric metric '{}'",
                    name
                ))
            })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalMetadata {
    #[serde(default)]
    pub inference_context: InferenceContext,
    #[serde(default)]
    pub whisperkittools_commit_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceContext {
    #[serde(default)]
    pub code_spec: CodeSpec,
    #[serde(default)]
    pub os_spec: OsSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeSpec {
    pub code_commit_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OsSpec {
    pub os_build_number: Option<String>,
}

impl EvaluationRecord {
    pub fn from_file(path: &Path) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| malformed(e, &path.display().to_string()))
    }

    pub fn code_commit_hash(&self) -> Option<&str> {
        self.metadata
            .inference_context
            .code_spec
            .code_commit_hash
            .as_deref()
    }

    pub fn os_build_number(&self) -> Option<&str> {
        self.metadata
            .inference_context
            .os_spec
            .os_build_number
            .as_deref()
    }

    pub fn tools_commit_hash(&self) -> Option<&str> {
        self.metadata.whisperkittools_commit_hash.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_harness_output() {
        let raw = json!({
            "results": [
                {
                    "file": "1089-134686-0000.flac",
                    "reference": "he hoped there would be stew for dinner",
                    "prediction": "he hoped there would be stew for dinner",
                    "wer": 0.0,
                    "prediction_duration": 0.42
                }
            ],
            "metadata": {
                "inference_context": {
                    "code_spec": { "code_commit_hash": "a1b2c3d4e5f6" },
                    "os_spec": { "os_build_number": "23E214" }
                },
                "whisperkittools_commit_hash": "0f9e8d7"
            }
        });

        let record: EvaluationRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.results.len(), 1);
        assert_eq!(record.results[0].metric("wer").unwrap(), 0.0);
        assert!(record.results[0].extra.contains_key("file"));
        assert_eq!(record.code_commit_hash(), Some("a1b2c3d4e5f6"));
        assert_eq!(record.os_build_number(), Some("23E214"));
        assert_eq!(record.tools_commit_hash(), Some("0f9e8d7"));
    }

    #[test]
    fn test_null_commit_hash() {
        let raw = json!({
            "results": [],
            "metadata": {
                "inference_context": {
                    "code_spec": { "code_commit_hash": null },
                    "os_spec": { "os_build_number": "23E214" }
                },
                "whisperkittools_commit_hash": null
            }
        });

        let record: EvaluationRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.code_commit_hash(), None);
        assert_eq!(record.tools_commit_hash(), None);
    }

    #[test]
    fn test_missing_metric_is_malformed() {
        let example = ExampleResult::new("a b", "a b");
        assert!(matches!(
            example.metric("wer"),
            Err(ReportError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_from_file_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"results\": [").unwrap();

        assert!(matches!(
            EvaluationRecord::from_file(&path),
            Err(ReportError::MalformedRecord(_))
        ));
    }
}
