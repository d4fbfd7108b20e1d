use crate::config::{CacheSettings, HubSettings, ReportSettings, Settings};
use crate::errors::ReportResult;
use crate::hub::{ArtifactStore, FetchRequest, HubError, UploadRequest};
use async_trait::async_trait;
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;

pub fn settings_for(local_dir: &Path) -> Settings {
    Settings {
        hub: HubSettings {
            endpoint: "http://127.0.0.1:1".to_string(),
            link_base: "https://hf.co".to_string(),
            revision: "main".to_string(),
            evals_repo_id: "argmaxinc/whisperkit-evals".to_string(),
            model_repo_id: "argmaxinc/whisperkit-coreml".to_string(),
            token: None,
        },
        cache: CacheSettings {
            local_dir: local_dir.to_path_buf(),
        },
        report: ReportSettings {
            primary_code_repo: "WhisperKit".to_string(),
            readme_path: local_dir.join("README.md"),
            commit_message: "whisperkittools generated README.md".to_string(),
        },
    }
}

/// Serialized eval record; each example is `(wer, transcript)` with identical reference and prediction
pub fn record_json(examples: &[(f64, &str)], commit: Option<&str>, os_build: &str) -> String {
    let examples: Vec<_> = examples.iter().map(|(wer, text)| (*wer, *text, *text)).collect();
    transcripts_json(&examples, commit, os_build)
}

/// Serialized eval record; each example is `(wer, reference, prediction)`
pub fn transcripts_json(
    examples: &[(f64, &str, &str)],
    commit: Option<&str>,
    os_build: &str,
) -> String {
    let results: Vec<_> = examples
        .iter()
        .map(|(wer, reference, prediction)| {
            json!({ "reference": reference, "prediction": prediction, "wer": wer })
        })
        .collect();
    json!({
        "results": results,
        "metadata": {
            "inference_context": {
                "code_spec": { "code_commit_hash": commit },
                "os_spec": { "os_build_number": os_build }
            },
            "whisperkittools_commit_hash": "0f9e8d7"
        }
    })
    .to_string()
}

/// Log output collected by a thread-local subscriber
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Capture WARN and above on the current thread until the guard is dropped
pub fn capture_warnings() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

/// In-memory artifact store that materializes its files into the requested directory
#[derive(Default)]
pub struct FakeStore {
    files: Vec<(String, String)>,
    failing_prefixes: Vec<String>,
    pub uploads: Mutex<Vec<(UploadRequest, String)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: String) -> Self {
        self.files.push((path.to_string(), content));
        self
    }

    /// Any fetch whose pattern starts with `prefix` fails with a server error
    pub fn failing(mut self, prefix: &str) -> Self {
        self.failing_prefixes.push(prefix.to_string());
        self
    }
}

#[async_trait]
impl ArtifactStore for FakeStore {
    async fn fetch(&self, request: &FetchRequest) -> ReportResult<Vec<PathBuf>> {
        if self
            .failing_prefixes
            .iter()
            .any(|prefix| request.allow_pattern.starts_with(prefix.as_str()))
        {
            return Err(HubError::ServerError("Server error occurred. Status: 503".to_string()).into());
        }

        let dir = request
            .allow_pattern
            .strip_suffix("*.json")
            .unwrap_or(&request.allow_pattern);
        let mut fetched = Vec::new();
        for (path, content) in &self.files {
            let Some(name) = path.strip_prefix(dir) else {
                continue;
            };
            if name.contains('/') || !name.ends_with(".json") {
                continue;
            }
            let dest = request.local_dir.join(path);
            std::fs::create_dir_all(dest.parent().unwrap())?;
            std::fs::write(&dest, content)?;
            fetched.push(dest);
        }
        Ok(fetched)
    }

    async fn upload(&self, request: &UploadRequest) -> ReportResult<()> {
        let content = std::fs::read_to_string(&request.source_file)?;
        self.uploads
            .lock()
            .unwrap()
            .push((request.clone(), content));
        Ok(())
    }
}
