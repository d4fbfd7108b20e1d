use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use whisperkit_evals::reporting::{publish, write_readme};
use whisperkit_evals::{HubClient, ModelMapping, ReportGenerator, Settings};

mod logging;

use logging::setup_logging;

/// Generates the README for the WhisperKit evals dataset, containing
/// Quality-of-Inference (QoI) certifications for Whisper models.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(
        long = "reference-to-optimized-mapping",
        value_name = "REFERENCE:OPTIMIZED,...",
        help = "Mapping of reference model version to optimized model versions",
        long_help = "Mapping of reference model version to optimized model version. \
            Syntax: <reference>:<optimized1,...,optimizedN>. \
            Specify multiple times to add more mappings."
    )]
    reference_to_optimized_mapping: Vec<ModelMapping>,

    #[arg(
        long = "upload-results",
        help = "Upload the generated README to the evals dataset and model repositories"
    )]
    upload_results: bool,

    #[arg(
        long = "dataset-names",
        value_name = "DATASET",
        help = "Dataset names to generate README for. Specify multiple times to add more datasets."
    )]
    dataset_names: Vec<String>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Local cache directory for downloaded eval results (overrides config)"
    )]
    local_dir: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Also write the full README to this path")]
    output: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "TOML settings file")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Write a daily rolling log file into this directory")]
    log_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_dir.as_deref())?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(local_dir) = cli.local_dir {
        settings.cache.local_dir = local_dir;
    }

    let store = HubClient::from_settings(&settings.hub)?;
    let generator = ReportGenerator::new(store, settings);

    let readme = generator
        .build_report(&cli.dataset_names, &cli.reference_to_optimized_mapping)
        .await?;

    if let Some(output) = &cli.output {
        write_readme(output, &readme)?;
        tracing::info!("Wrote README to {}", output.display());
    }

    if cli.upload_results {
        publish(generator.store(), generator.settings(), &readme).await?;
    }

    Ok(())
}
