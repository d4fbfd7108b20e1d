use crate::config::Settings;
use crate::errors::ReportResult;
use crate::hub::{ArtifactStore, RepoType, UploadRequest};
use indoc::indoc;
use std::path::{Path, PathBuf};

pub const README_PATH_IN_REPO: &str = "README.md";

const DATASET_CARD_YAML_PREFIX: &str = indoc! {r#"

    ---
    pretty_name: "WhisperKit ASR Evaluation Results"
    viewer: false
    library_name: whisperkit
    tags:
    - whisper
    - whisperkit
    - coreml
    - asr
    - quantized
    ---
    # WhisperKit Transcription Quality

"#};

const METRIC_EXPLANATION: &str = indoc! {r#"

    ### Explanation

    We believe that rigorously measuring the quality of inference is necessary for developers and
    enterprises to make informed decisions when opting to use optimized or compressed variants of
    any machine learning model in production. To contextualize `WhisperKit`, we take the following Whisper
    implementations and benchmark them using a consistent evaluation harness:

    Server-side:
    - `WhisperOpenAIAPI`: [OpenAI's Whisper API](https://platform.openai.com/docs/guides/speech-to-text)

    ($0.36 per hour of audio as of 02/29/24, 25MB file size limit per request)

    On-device:
    - `WhisperKit`: Argmax's implementation [[Eval Harness]](https://github.com/argmaxinc/whisperkittools/blob/main/whisperkit/pipelines.py#L100) [[Repo]](https://github.com/argmaxinc/WhisperKit)
    - `whisper.cpp`: A C++ implementation form ggerganov [[Eval Harness]](https://github.com/argmaxinc/whisperkittools/blob/main/whisperkit/pipelines.py#L212) [[Repo]](https://github.com/ggerganov/whisper.cpp)
    - `WhisperMLX`: A Python implementation from Apple MLX [[Eval Harness]](https://github.com/argmaxinc/whisperkittools/blob/main/whisperkit/pipelines.py#L338) [[Repo]](https://github.com/ml-explore/mlx-examples/blob/main/whisper/whisper/transcribe.py)

    (All on-device implementations are available for free under MIT license as of 03/19/2024)

    `WhisperOpenAIAPI` sets the reference and we assume that it is using the equivalent of [openai/whisper-large-v2](https://huggingface.co/openai/whisper-large-v2)
    in float16 precision along with additional undisclosed optimizations from OpenAI. In all measurements, we care primarily about per-example no-regressions (quantified as `qoi` below)
    which is a stricter metric compared to dataset average [Word Error RATE (WER)](https://en.wikipedia.org/wiki/Word_error_rate). A 100% `qoi` preserves perfect backwards-compatibility on the test distribution and avoids "perceived regressions", the phenomenon
    where per-example known behavior changes after a code/model update and causes divergence in downstream code or breaks the user experience itself (even if dataset averages might stay flat
    across updates). Pseudocode for `qoi`:

    ```python
    qoi = []
    for example in dataset:
        no_regression = wer(optimized_model(example)) <= wer(reference_model(example))
        qoi.append(no_regression)
    qoi = (sum(qoi) / len(qoi)) * 100.
    ```

    Note that the ordering of models with respect to `WER` does not necessarily match the ordering with respect to `QoI`. This is because the reference model gets assigned
    a QoI of 100% by definition. Any per-example regression by other implementations get penalized while per-example improvements are not rewarded. `QoI` (higher is better) matters
    where the production behavior is established by the reference results and the goal is to not regress when switching to an optimized or compressed model. On the other hand,
    `WER` (lower is better) matters when there is no established production behavior and one is picking the best quality versus model size trade off point.

    We anticipate developers that use Whisper (or similar models) in production to have their own Quality Assurance test sets and [whisperkittools](https://github.com/argmaxinc/whisperkittools) offers
    the tooling necessary to run the same measurements on such custom test sets, please see the [Model Evaluation on Custom Dataset]((https://github.com/argmaxinc/whisperkittools)) for details.

    ### Why are there so many Whisper versions?
    WhisperKit is an SDK for building speech-to-text features in apps across a wide range of Apple devices. We are working towards abstracting away the model versioning from the developer so WhisperKit
    "just works" by deploying the highest-quality model version that a particular device can execute. In the interim, we leave the choice to the developer by providing quality and size trade-offs.


    ### Datasets
    - [librispeech](https://huggingface.co/datasets/argmaxinc/librispeech): ~5 hours of short English audio clips, tests short-form transcription quality
    - [earnings22](https://huggingface.co/datasets/argmaxinc/earnings22): ~120 hours of English audio clips from earnings calls with various accents, tests long-form transcription quality

    ### Reproducing Results
    Benchmark results on this page were automatically generated by [whisperkittools](https://github.com/argmaxinc/whisperkittools) using our cluster of Apple Silicon Macs as self-hosted runners on
    Github Actions. We periodically recompute these benchmarks as part of our CI pipeline. Due to [security concerns](https://docs.github.com/en/actions/security-guides/security-hardening-for-github-actions#hardening-for-self-hosted-runners),
    we are unable to open up the cluster to the public. However, any Apple Silicon Mac (even with 8GB RAM) can be used to
    run identical [evaluation jobs](#evaluation) locally. For reference, our M2 Ultra devices complete a `librispeech` + `openai/whisper-large-v3`
    evaluation in under 1 hour regardless of the Whisper implementation. Oldest Apple Silicon Macs should take less than 1 day to complete the same evaluation.

"#};

const GLOSSARY: &str = indoc! {r#"

    ### Glossary

    - `_turbo`: Indicates the presence of additional optimizations (not compression) to unlock streaming transcription
    as described in our [Blog Post](https://www.takeargmax.com/blog/whisperkit).

    - `_*MB`: Indicates the presence of model compression. Instead of cluttering the filename with details like
    `_AudioEncoder-5.8bits_TextDecoder-6.1bits_QLoRA-rank=16`, we choose to summarize the compression spec as the
    resulting total file size since this is what matters to developers in production.

"#};

/// Full Hub README: dataset card header, generated tables, then the static sections
pub fn wrap_readme(tables: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        DATASET_CARD_YAML_PREFIX, tables, METRIC_EXPLANATION, GLOSSARY
    )
}

pub fn write_readme(path: &Path, tables: &str) -> ReportResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, wrap_readme(tables))?;
    tracing::debug!("Wrote README to {}", path.display());
    Ok(())
}

/// Write the README to the configured temporary path and commit it to both the evals
/// dataset repo and the model repo. Upload failures are returned as-is.
pub async fn publish<S: ArtifactStore + ?Sized>(
    store: &S,
    settings: &Settings,
    tables: &str,
) -> ReportResult<PathBuf> {
    let temp_path = settings.report.readme_path.clone();
    write_readme(&temp_path, tables)?;

    let destinations = [
        (&settings.hub.evals_repo_id, RepoType::Dataset),
        (&settings.hub.model_repo_id, RepoType::Model),
    ];
    for (repo_id, repo_type) in destinations {
        store
            .upload(&UploadRequest {
                path_in_repo: README_PATH_IN_REPO.to_string(),
                source_file: temp_path.clone(),
                repo_id: repo_id.clone(),
                repo_type,
                commit_message: settings.report.commit_message.clone(),
            })
            .await?;
    }

    tracing::info!("Uploaded to HF Hub");
    Ok(temp_path)
}
