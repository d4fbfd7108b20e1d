use crate::errors::{ReportError, ReportResult};
use std::fmt;
use std::str::FromStr;

/// Repository assumed when an identifier carries no `repo/` qualifier
pub const DEFAULT_CODE_REPO: &str = "WhisperKit";

/// Model filename prefixes dropped from row labels for readability
const LABEL_PREFIXES: &[&str] = &["openai_whisper-", "distil-whisper_"];

/// A model version as published by one code repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReference {
    /// Identifier exactly as given on the command line
    pub identifier: String,
    pub code_repo: String,
    pub model_version: String,
}

/// Split `repo/model` into its parts, applying `default_code_repo` to bare model names
pub fn parse_name(identifier: &str, default_code_repo: &str) -> ReportResult<(String, String)> {
    let tokens: Vec<&str> = identifier.split('/').collect();
    match tokens.as_slice() {
        [model] => Ok((default_code_repo.to_string(), model.to_string())),
        [code_repo, model] => Ok((code_repo.to_string(), model.to_string())),
        _ => Err(ReportError::InvalidIdentifier(identifier.to_string())),
    }
}

impl ModelReference {
    pub fn parse(identifier: &str, default_code_repo: &str) -> ReportResult<Self> {
        let (code_repo, model_version) = parse_name(identifier, default_code_repo)?;
        Ok(Self {
            identifier: identifier.to_string(),
            code_repo,
            model_version,
        })
    }

    /// `repo/model`, regardless of how the identifier was written
    pub fn qualified(&self) -> String {
        format!("{}/{}", self.code_repo, self.model_version)
    }

    /// Trailing path segment of the identifier with known filename prefixes removed
    pub fn short_name(&self) -> String {
        let tail = self
            .identifier
            .rsplit('/')
            .next()
            .unwrap_or(&self.identifier);
        LABEL_PREFIXES
            .iter()
            .fold(tail.to_string(), |name, prefix| name.replace(prefix, ""))
    }

    /// Size encoded as a trailing `_<N>MB` component, e.g. `openai_whisper-large-v3_947MB`
    pub fn size_suffix_mb(&self) -> Option<u64> {
        let suffix = self.identifier.rsplit('_').next()?;
        suffix.strip_suffix("MB")?.parse().ok()
    }
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}

/// A reference model and the optimized variants to certify against it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMapping {
    pub reference: String,
    pub optimized: Vec<String>,
}

impl FromStr for ModelMapping {
    type Err = ReportError;

    /// Parses `<reference>:<optimized1,...,optimizedN>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [reference, optimized_csv] = parts.as_slice() else {
            return Err(ReportError::MalformedMapping(s.to_string()));
        };
        if reference.trim().is_empty() {
            return Err(ReportError::MalformedMapping(s.to_string()));
        }

        let optimized = optimized_csv
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            reference: reference.trim().to_string(),
            optimized,
        })
    }
}
