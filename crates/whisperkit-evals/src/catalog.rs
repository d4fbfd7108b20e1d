//! Static lookup tables. These are maintained by hand and must be kept in sync
//! with the models published on the Hub.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Total model file size in MB, keyed by `repo/model`
    static ref REFERENCE_MODEL_FILE_SIZES: HashMap<&'static str, u64> = HashMap::from([
        ("WhisperKit/openai_whisper-large-v2", 3100),
        ("WhisperKit/openai_whisper-large-v2_turbo", 3100),
        ("WhisperKit/openai_whisper-large-v3", 3100),
        ("WhisperKit/openai_whisper-large-v3_turbo", 3100),
        ("WhisperKit/openai_whisper-small", 483),
        ("WhisperKit/openai_whisper-small.en", 483),
        ("WhisperKit/openai_whisper-base", 145),
        ("WhisperKit/openai_whisper-base.en", 145),
        ("WhisperKit/openai_whisper-tiny", 66),
        ("WhisperKit/openai_whisper-tiny.en", 66),
        ("whisper.cpp/openai_whisper-large-v2-q5_0", 1080),
        ("whisper.cpp/openai_whisper-large-v3-q5_0", 1080),
        ("whisper.cpp/openai_whisper-large-v3", 3100),
        ("whisper.cpp/openai_whisper-large-v2", 3100),
        ("WhisperOpenAIAPI/openai_whisper-large-v2", 3100),
        ("WhisperKit/distil-whisper_distil-large-v3", 1510),
        ("WhisperKit/distil-whisper_distil-large-v3_turbo", 1510),
    ]);

    static ref DATASET_CAPTIONS: HashMap<&'static str, &'static str> = HashMap::from([
        (
            "librispeech",
            "Short-form Audio (<30s/clip) - 5 hours of English audiobook clips",
        ),
        (
            "earnings22",
            "Long-Form Audio (>1hr/clip) - 120 hours of earnings call recordings in English with various accents",
        ),
    ]);

    static ref REPO_URLS: HashMap<&'static str, &'static str> = HashMap::from([
        ("whisper.cpp", "https://github.com/ggerganov/whisper.cpp"),
        ("WhisperKit", "https://github.com/argmaxinc/WhisperKit"),
    ]);
}

/// Known file size for a model, looked up by `repo/model` key
pub fn known_file_size(key: &str) -> Option<u64> {
    REFERENCE_MODEL_FILE_SIZES.get(key).copied()
}

pub fn dataset_caption(dataset_name: &str) -> Option<&'static str> {
    DATASET_CAPTIONS.get(dataset_name).copied()
}

/// Source repository URL for a code repository name
pub fn repo_url(code_repo: &str) -> Option<&'static str> {
    REPO_URLS.get(code_repo).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        assert_eq!(known_file_size("WhisperKit/openai_whisper-tiny"), Some(66));
        assert_eq!(known_file_size("openai_whisper-tiny"), None);
        assert!(dataset_caption("librispeech").unwrap().starts_with("Short-form"));
        assert_eq!(dataset_caption("common_voice"), None);
        assert_eq!(
            repo_url("whisper.cpp"),
            Some("https://github.com/ggerganov/whisper.cpp")
        );
        assert_eq!(repo_url("WhisperOpenAIAPI"), None);
    }
}
