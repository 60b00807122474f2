use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imagestag_enhance::{
    output_file_name, Algorithm, BorderMode, EnhanceConfig, EnhanceError, EnhancementService,
    OutputFormat,
};

#[derive(Parser, Debug)]
#[command(name = "imagestag-enhance")]
#[command(about = "Median filter or histogram-equalize an image and chart its histograms")]
struct Cli {
    #[arg(help = "Input image file path")]
    input: PathBuf,

    #[arg(help = "Output image file path, or a directory to use the derived name")]
    output: PathBuf,

    /// Algorithm selector: "Med_Filter" or "Hist_Equalization"
    #[arg(short, long)]
    algorithm: String,

    /// Median window side (odd)
    #[arg(short, long)]
    filter_size: Option<usize>,

    /// Median border handling: "zero" or "reference-compat"
    #[arg(long)]
    border: Option<BorderMode>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save the input histogram chart (PNG)
    #[arg(long)]
    histogram_before: Option<PathBuf>,

    /// Save the output histogram chart (PNG)
    #[arg(long)]
    histogram_after: Option<PathBuf>,

    /// Print both charts as base64 PNG strings
    #[arg(long, default_value_t = false)]
    base64: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imagestag_enhance=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let rejected = err
                .downcast_ref::<EnhanceError>()
                .is_some_and(EnhanceError::is_rejection);
            ExitCode::from(if rejected { 2 } else { 1 })
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => EnhanceConfig::load(path)?,
        None => EnhanceConfig::default(),
    };
    if let Some(filter_size) = cli.filter_size {
        config.filter_size = filter_size;
    }
    if let Some(border) = cli.border {
        config.border_mode = border;
    }
    if config.output_format.is_none() {
        config.output_format = cli
            .output
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(OutputFormat::from_extension);
    }

    let service = EnhancementService::new(config)?;

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let result = service.process_bytes(&bytes, Some(&cli.algorithm))?;

    let output = resolve_output(&cli.input, &cli.output, result.algorithm);
    write_file(&output, &result.encoded)?;
    info!(path = %output.display(), "Wrote enhanced image");

    if let Some(path) = &cli.histogram_before {
        write_file(path, &result.histogram_before_png)?;
    }
    if let Some(path) = &cli.histogram_after {
        write_file(path, &result.histogram_after_png)?;
    }

    if cli.base64 {
        println!("histogram_before: {}", result.histogram_before_base64());
        println!("histogram_after: {}", result.histogram_after_base64());
    }

    Ok(())
}

/// A directory output gets the `{stem}_medfil{ext}` / `{stem}_hiseq{ext}` name.
fn resolve_output(input: &Path, output: &Path, algorithm: Algorithm) -> PathBuf {
    if !output.is_dir() {
        return output.to_path_buf();
    }
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.join(output_file_name(&name, algorithm))
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
