use super::errors::{non_ok_response_to_hub_error, HubError};
use super::{ArtifactStore, FetchRequest, RepoType, UploadRequest};
use crate::config::HubSettings;
use crate::errors::{ReportError, ReportResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};

/// One entry of the Hub tree listing API
#[derive(Debug, Deserialize)]
struct TreeEntry {
    #[serde(rename = "type")]
    kind: String,
    path: String,
    #[serde(default)]
    size: Option<u64>,
}

/// Hugging Face Hub client for snapshot downloads and single-file commits
#[derive(Debug, Clone)]
pub struct HubClient {
    client: Client,
    endpoint: String,
    revision: String,
    token: Option<String>,
}

impl HubClient {
    pub fn new(endpoint: &str, revision: &str, token: Option<String>) -> ReportResult<Self> {
        let client = Client::builder().build().map_err(HubError::from)?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            revision: revision.to_string(),
            token,
        })
    }

    pub fn from_settings(settings: &HubSettings) -> ReportResult<Self> {
        Self::new(&settings.endpoint, &settings.revision, settings.token.clone())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Recursively list files under `dir`, following cursor pagination
    async fn list_files(
        &self,
        repo_type: RepoType,
        repo_id: &str,
        dir: &str,
    ) -> ReportResult<Vec<TreeEntry>> {
        let mut next = Some(format!(
            "{}/api/{}/{}/tree/{}/{}?recursive=true",
            self.endpoint,
            repo_type.api_segment(),
            repo_id,
            self.revision,
            dir
        ));
        let mut entries = Vec::new();

        while let Some(url) = next.take() {
            let response = self
                .authorize(self.client.get(&url))
                .send()
                .await
                .map_err(HubError::from)?;

            match response.status() {
                StatusCode::OK => {}
                // Nothing has been uploaded under this path yet
                StatusCode::NOT_FOUND => {
                    tracing::debug!("No remote entries under {}", dir);
                    break;
                }
                _ => return Err(non_ok_response_to_hub_error(response).await.into()),
            }

            next = response
                .headers()
                .get("link")
                .and_then(|link| link.to_str().ok())
                .and_then(next_page_url);

            let page: Vec<TreeEntry> = response.json().await.map_err(HubError::from)?;
            entries.extend(page.into_iter().filter(|entry| entry.kind == "file"));
        }

        Ok(entries)
    }

    async fn download(
        &self,
        repo_type: RepoType,
        repo_id: &str,
        entry: &TreeEntry,
        dest: &Path,
    ) -> ReportResult<()> {
        if let (Some(size), Ok(meta)) = (entry.size, tokio::fs::metadata(dest).await) {
            if meta.len() == size {
                tracing::debug!("Reusing cached {}", dest.display());
                return Ok(());
            }
        }

        let url = format!(
            "{}/{}{}/resolve/{}/{}",
            self.endpoint,
            repo_type.url_prefix(),
            repo_id,
            self.revision,
            entry.path
        );
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(HubError::from)?;
        if !response.status().is_success() {
            return Err(non_ok_response_to_hub_error(response).await.into());
        }
        let bytes = response.bytes().await.map_err(HubError::from)?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;
        tracing::debug!("Downloaded {} ({} bytes)", entry.path, bytes.len());
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for HubClient {
    async fn fetch(&self, request: &FetchRequest) -> ReportResult<Vec<PathBuf>> {
        let matcher = pattern_to_regex(&request.allow_pattern)?;
        let dir = static_prefix(&request.allow_pattern);

        tokio::fs::create_dir_all(&request.local_dir).await?;

        let mut fetched = Vec::new();
        for entry in self
            .list_files(request.repo_type, &request.repo_id, &dir)
            .await?
        {
            if !matcher.is_match(&entry.path) {
                continue;
            }
            let dest = request.local_dir.join(&entry.path);
            self.download(request.repo_type, &request.repo_id, &entry, &dest)
                .await?;
            fetched.push(dest);
        }

        tracing::debug!(
            "Fetched {} files matching {} from {}",
            fetched.len(),
            request.allow_pattern,
            request.repo_id
        );
        Ok(fetched)
    }

    async fn upload(&self, request: &UploadRequest) -> ReportResult<()> {
        if self.token.is_none() {
            return Err(ReportError::ConfigError(
                "a Hub token (HF_TOKEN) is required to upload".to_string(),
            ));
        }

        let content = tokio::fs::read(&request.source_file).await?;
        let header = json!({
            "key": "header",
            "value": { "summary": request.commit_message, "description": "" }
        });
        let file = json!({
            "key": "file",
            "value": {
                "content": STANDARD.encode(&content),
                "path": request.path_in_repo,
                "encoding": "base64"
            }
        });
        let body = format!("{}\n{}\n", header, file);

        let url = format!(
            "{}/api/{}/{}/commit/{}",
            self.endpoint,
            request.repo_type.api_segment(),
            request.repo_id,
            self.revision
        );
        let response = self
            .authorize(self.client.post(&url))
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(HubError::from)?;

        if !response.status().is_success() {
            return Err(non_ok_response_to_hub_error(response).await.into());
        }

        tracing::info!(
            "Uploaded {} to {} ({})",
            request.path_in_repo,
            request.repo_id,
            request.repo_type
        );
        Ok(())
    }
}

/// Glob to regex; `*` and `?` never cross a `/`
fn pattern_to_regex(pattern: &str) -> ReportResult<Regex> {
    let body = regex::escape(pattern)
        .replace(r"\*", "[^/]*")
        .replace(r"\?", "[^/]");
    Regex::new(&format!("^{}$", body))
        .map_err(|e| ReportError::ConfigError(format!("invalid pattern {}: {}", pattern, e)))
}

/// Leading directories of a pattern that contain no wildcard
fn static_prefix(pattern: &str) -> String {
    let segments: Vec<&str> = pattern.split('/').collect();
    let dirs = &segments[..segments.len().saturating_sub(1)];
    dirs.iter()
        .take_while(|segment| !segment.contains(['*', '?']))
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

/// Extracts the `rel="next"` target of a `Link` header
fn next_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        params
            .contains("rel=\"next\"")
            .then(|| target.trim().trim_start_matches('<').trim_end_matches('>').to_string())
    })
}
