use crate::errors::{ReportError, ReportResult};
use crate::model_ref::DEFAULT_CODE_REPO;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `WHISPERKIT_EVALS_HUB__ENDPOINT`
pub const ENV_PREFIX: &str = "WHISPERKIT_EVALS";

#[derive(Debug, Clone, Deserialize)]
pub struct HubSettings {
    /// Base URL for Hub API calls
    pub endpoint: String,
    /// Base URL used for links rendered into the README
    pub link_base: String,
    pub revision: String,
    /// Dataset repository holding evaluation JSON files
    pub evals_repo_id: String,
    /// Model repository that also receives the README
    pub model_repo_id: String,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub local_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    /// Repository whose rows link to their model page; also the default for bare model names
    pub primary_code_repo: String,
    pub readme_path: PathBuf,
    pub commit_message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub hub: HubSettings,
    pub cache: CacheSettings,
    pub report: ReportSettings,
}

impl Settings {
    /// Defaults, then the optional TOML file, then the environment
    pub fn load(config_file: Option<&Path>) -> ReportResult<Self> {
        let mut builder = Config::builder()
            .set_default("hub.endpoint", "https://huggingface.co")?
            .set_default("hub.link_base", "https://hf.co")?
            .set_default("hub.revision", "main")?
            .set_default("hub.evals_repo_id", "argmaxinc/whisperkit-evals")?
            .set_default("hub.model_repo_id", "argmaxinc/whisperkit-coreml")?
            .set_default("cache.local_dir", "external")?
            .set_default("report.primary_code_repo", DEFAULT_CODE_REPO)?
            .set_default("report.readme_path", "/tmp/README.md")?
            .set_default(
                "report.commit_message",
                "whisperkittools generated README.md",
            )?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize().map_err(|e| {
            tracing::debug!("Configuration error: {:?}", &e);
            ReportError::from(e)
        })?;

        if settings.hub.token.is_none() {
            settings.hub.token = std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty());
        }

        Ok(settings)
    }

    /// Hub page for the evaluation directory of one model on one dataset
    pub fn eval_link(&self, repo_rel_dir: &str) -> String {
        format!(
            "{}/datasets/{}/tree/{}/{}",
            self.hub.link_base, self.hub.evals_repo_id, self.hub.revision, repo_rel_dir
        )
    }

    /// Hub page for a converted model version
    pub fn model_link(&self, model_version: &str) -> String {
        format!(
            "{}/{}/tree/{}/{}",
            self.hub.link_base, self.hub.model_repo_id, self.hub.revision, model_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with(ENV_PREFIX) || key == "HF_TOKEN" {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.hub.endpoint, "https://huggingface.co");
        assert_eq!(settings.hub.evals_repo_id, "argmaxinc/whisperkit-evals");
        assert_eq!(settings.hub.model_repo_id, "argmaxinc/whisperkit-coreml");
        assert_eq!(settings.hub.token, None);
        assert_eq!(settings.cache.local_dir, PathBuf::from("external"));
        assert_eq!(settings.report.primary_code_repo, "WhisperKit");
        assert_eq!(settings.report.readme_path, PathBuf::from("/tmp/README.md"));
        assert_eq!(
            settings.report.commit_message,
            "whisperkittools generated README.md"
        );
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("WHISPERKIT_EVALS_HUB__ENDPOINT", "http://127.0.0.1:9999");
        env::set_var("WHISPERKIT_EVALS_CACHE__LOCAL_DIR", "/var/cache/evals");
        env::set_var("HF_TOKEN", "hf_test");

        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.hub.endpoint, "http://127.0.0.1:9999");
        assert_eq!(settings.cache.local_dir, PathBuf::from("/var/cache/evals"));
        assert_eq!(settings.hub.token.as_deref(), Some("hf_test"));

        clean_env();
    }

    #[test]
    #[serial]
    fn test_file_source() {
        clean_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evals.toml");
        std::fs::write(
            &path,
            "[hub]\nevals_repo_id = \"me/my-evals\"\ntoken = \"hf_file\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.hub.evals_repo_id, "me/my-evals");
        assert_eq!(settings.hub.token.as_deref(), Some("hf_file"));
        assert_eq!(settings.hub.revision, "main");
    }

    #[test]
    #[serial]
    fn test_links() {
        clean_env();
        let settings = Settings::load(None).unwrap();
        assert_eq!(
            settings.eval_link("WhisperKit/openai_whisper-tiny/librispeech"),
            "https://hf.co/datasets/argmaxinc/whisperkit-evals/tree/main/WhisperKit/openai_whisper-tiny/librispeech"
        );
        assert_eq!(
            settings.model_link("openai_whisper-tiny"),
            "https://hf.co/argmaxinc/whisperkit-coreml/tree/main/openai_whisper-tiny"
        );
    }
}
