use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use writing_feature_extractor::clients::{FeatureModel, ModelSettings, ModelSpec, create_model};
use writing_feature_extractor::config::{RuntimeConfig, load_env_file};
use writing_feature_extractor::export::save_results_to_csv;
use writing_feature_extractor::extraction::RunProgress;
use writing_feature_extractor::text::{load_text, split_into_sections};
use writing_feature_extractor::{
    Config, ExtractionMode, FeatureExtractor, FeatureExtractorError, SectionHook,
    build_feature_set,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract writing features from a manuscript with language models", long_about = None)]
struct Args {
    /// Text file to analyze; sections are separated by ***
    file: PathBuf,

    /// Unit of analysis (overrides the configuration)
    #[arg(long, value_enum)]
    mode: Option<ExtractionMode>,

    /// Save final results to CSV
    #[arg(long)]
    save: bool,

    /// CSV output path (default: feature_results.csv)
    #[arg(long)]
    csv_file: Option<PathBuf>,

    /// Feature configuration file (default: $WFE_CONFIG or feature_config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Primary model provider (openai, anthropic, openrouter, groq, google)
    #[arg(long)]
    provider: Option<String>,

    /// Primary model name
    #[arg(long)]
    model: Option<String>,

    /// Triangulation model as provider:model; repeat for several
    #[arg(long, value_name = "PROVIDER:MODEL")]
    triangulate: Vec<ModelSpec>,

    /// Do not wait for Enter between sections in paragraph mode
    #[arg(long)]
    no_pause: bool,
}

/// Saves intermediate results after each section and optionally waits for Enter.
struct CheckpointHook {
    csv_file: PathBuf,
    pause: bool,
    stdin: BufReader<Stdin>,
}

#[async_trait]
impl SectionHook for CheckpointHook {
    async fn section_complete(
        &mut self,
        progress: &RunProgress<'_>,
    ) -> writing_feature_extractor::Result<()> {
        info!("Saving results to CSV...");
        save_results_to_csv(
            &self.csv_file,
            progress.collectors,
            progress.text_units,
            progress.text_metrics,
        )?;
        if self.pause {
            println!(
                "Section {}/{} complete. Press Enter to continue...",
                progress.section_index + 1,
                progress.section_count
            );
            let mut line = String::new();
            self.stdin.read_line(&mut line).await?;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    load_env_file();
    let runtime = RuntimeConfig::load_from_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&runtime.log_level))
        .init();

    if let Err(e) = run(args).await {
        let configuration = e
            .downcast_ref::<FeatureExtractorError>()
            .is_some_and(FeatureExtractorError::is_configuration);
        error!("{:#}", e);
        std::process::exit(if configuration { 2 } else { 1 });
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load_unvalidated(args.config.as_deref())?;
    apply_cli_overrides(&mut config, &args);
    config.validate()?;

    let (collectors, schema) = build_feature_set(&config.feature_descriptors()?)?;
    let settings = config.model_settings()?;

    let provider = config.primary_provider()?;
    let primary = build_model(
        &config,
        &ModelSpec::new(provider.as_str(), config.model.name.clone()),
        &settings,
    )?;
    let secondary_settings = settings.for_triangulation();
    let mut triangulation = Vec::with_capacity(config.model.triangulation.len());
    for spec in &config.model.triangulation {
        triangulation.push(build_model(&config, spec, &secondary_settings)?);
    }

    let text = load_text(&args.file)?;
    let sections = split_into_sections(&text);
    info!(
        "Loaded {} ({} sections, {} features)",
        args.file.display(),
        sections.len(),
        collectors.len()
    );

    let extractor = FeatureExtractor::new(primary, schema)
        .with_triangulation(triangulation)
        .with_settings(config.extraction_settings());
    let mut hook = CheckpointHook {
        csv_file: config.output.csv_file.clone(),
        pause: config.extraction.pause_between_sections,
        stdin: BufReader::new(tokio::io::stdin()),
    };

    let report = extractor
        .extract(&sections, config.extraction.mode, collectors, &mut hook)
        .await;

    for collector in &report.collectors {
        let sentinels = collector
            .results()
            .iter()
            .filter(|v| v.is_sentinel())
            .count();
        info!(
            "{}: {} results ({} without a usable answer)",
            collector.display_label(),
            collector.len(),
            sentinels
        );
    }

    if config.output.save {
        save_results_to_csv(
            &config.output.csv_file,
            &report.collectors,
            &report.text_units,
            &report.text_metrics,
        )?;
    }
    Ok(())
}

fn apply_cli_overrides(config: &mut Config, args: &Args) {
    if let Some(mode) = args.mode {
        config.extraction.mode = mode;
    }
    if let Some(provider) = &args.provider {
        config.model.provider = provider.clone();
    }
    if let Some(model) = &args.model {
        config.model.name = model.clone();
    }
    if !args.triangulate.is_empty() {
        config.model.triangulation = args.triangulate.clone();
    }
    if let Some(csv_file) = &args.csv_file {
        config.output.csv_file = csv_file.clone();
    }
    if args.save {
        config.output.save = true;
    }
    if args.no_pause {
        config.extraction.pause_between_sections = false;
    }
}

/// Client construction problems (unknown provider, missing key) are configuration errors.
fn build_model(
    config: &Config,
    spec: &ModelSpec,
    settings: &ModelSettings,
) -> Result<Box<dyn FeatureModel>, FeatureExtractorError> {
    let provider = spec
        .provider()
        .map_err(|e| FeatureExtractorError::config(e.to_string()))?;
    create_model(
        provider,
        &spec.name,
        config.runtime.api_key_for(provider),
        settings,
    )
    .map_err(|e| FeatureExtractorError::config(format!("{}: {}", spec, e)))
}
