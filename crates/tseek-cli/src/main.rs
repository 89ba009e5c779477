mod display;
mod predict;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tseek_core::illustration::Illustration;
use tseek_core::{LabelCatalog, LabelSource};

use crate::predict::PredictArgs;

/// Chart trend and pattern predictor.
#[derive(Debug, Parser)]
#[command(name = "tseek", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify a chart image with a trained model.
    Predict(PredictArgs),
    /// List the pattern labels and whether their illustrations exist.
    Patterns(PatternsArgs),
}

#[derive(Debug, Args)]
struct PatternsArgs {
    /// Directory holding the `Patron/` illustrations.
    #[arg(long, env = "TSEEK_ASSETS", default_value = ".")]
    assets: PathBuf,

    /// JSON label catalog replacing the built-in pattern labels.
    #[arg(long, env = "TSEEK_LABELS")]
    labels: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    tracing::info!("tseek v{}", env!("CARGO_PKG_VERSION"));

    match Cli::parse().command {
        Command::Predict(args) => predict::execute(&args),
        Command::Patterns(args) => {
            list_patterns(&args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn list_patterns(args: &PatternsArgs) -> anyhow::Result<()> {
    let catalog = match &args.labels {
        Some(path) => LabelCatalog::from_path(path)
            .with_context(|| format!("loading label catalog {}", path.display()))?,
        None => LabelCatalog::chart_patterns(),
    };
    let (labels, images) = catalog.into_parts();

    let rows: Vec<(String, Illustration)> = labels
        .names()
        .iter()
        .map(|label| {
            let relative = images.image_for(label, LabelSource::Curated);
            (label.clone(), Illustration::locate(&args.assets, relative))
        })
        .collect();

    print!("{}", display::render_catalog(&rows));
    Ok(())
}
