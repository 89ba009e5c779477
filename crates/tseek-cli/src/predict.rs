//! `tseek predict`: build a request from CLI arguments, run it, render it.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::error;
use tseek_core::illustration::Illustration;
use tseek_core::{LabelCatalog, Mode, ModelSource, Outcome, PredictionReport, PredictionRequest};

use crate::display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Bullish vs bearish from a single sigmoid output.
    Binary,
    /// Fifteen chart patterns.
    Patterns,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Binary => Mode::Binary,
            ModeArg::Patterns => Mode::Patterns,
        }
    }
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    /// ONNX model file, or `-` to read the model from stdin.
    #[arg(long, env = "TSEEK_MODEL")]
    pub model: PathBuf,

    /// Chart image (PNG or JPEG).
    #[arg(long)]
    pub image: PathBuf,

    #[arg(long, value_enum, env = "TSEEK_MODE", default_value_t = ModeArg::Binary)]
    pub mode: ModeArg,

    /// Directory holding the `Patron/` illustrations.
    #[arg(long, env = "TSEEK_ASSETS", default_value = ".")]
    pub assets: PathBuf,

    /// JSON label catalog replacing the built-in pattern labels.
    #[arg(long, env = "TSEEK_LABELS")]
    pub labels: Option<PathBuf>,

    /// Print the report as JSON instead of a card.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    analyzed_at: String,
    image: String,
    #[serde(flatten)]
    report: &'a PredictionReport,
    asset: &'a Illustration,
}

pub fn execute(args: &PredictArgs) -> anyhow::Result<ExitCode> {
    let request = build_request(args, std::io::stdin())?;

    let report = match tseek_ai::run(&request) {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "prediction failed");
            eprint!("{}", display::render_error(&err));
            return Ok(ExitCode::FAILURE);
        }
    };

    let asset = illustration_for(&report, &args.assets);
    if args.json {
        let out = JsonReport {
            analyzed_at: chrono::Utc::now().to_rfc3339(),
            image: args.image.display().to_string(),
            report: &report,
            asset: &asset,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", display::render_report(&report, &asset));
    }
    Ok(ExitCode::SUCCESS)
}

/// Assemble a request; `stdin` supplies model bytes when `--model -` is given.
fn build_request(args: &PredictArgs, mut stdin: impl Read) -> anyhow::Result<PredictionRequest> {
    let image = std::fs::read(&args.image)
        .with_context(|| format!("reading image {}", args.image.display()))?;

    let model = if args.model == Path::new("-") {
        let mut bytes = Vec::new();
        stdin
            .read_to_end(&mut bytes)
            .context("reading model from stdin")?;
        ModelSource::Bytes(bytes)
    } else {
        ModelSource::Path(args.model.clone())
    };

    let mut request = PredictionRequest::new(args.mode.into(), model, image);
    if let Some(path) = &args.labels {
        let (labels, images) = LabelCatalog::from_path(path)
            .with_context(|| format!("loading label catalog {}", path.display()))?
            .into_parts();
        request = request.with_labels(labels, images);
    }
    Ok(request)
}

fn illustration_for(report: &PredictionReport, assets: &Path) -> Illustration {
    match &report.outcome {
        Outcome::Patterns { illustration, .. } => {
            Illustration::locate(assets, illustration.as_deref())
        }
        Outcome::Binary { .. } => Illustration::Unmapped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn args(dir: &Path, model: &str) -> PredictArgs {
        PredictArgs {
            model: PathBuf::from(model),
            image: dir.join("chart.png"),
            mode: ModeArg::Patterns,
            assets: dir.to_path_buf(),
            labels: None,
            json: false,
        }
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("chart.png"), b"\x89PNG fake").unwrap();
        dir
    }

    #[test]
    fn model_path_request() {
        let dir = fixture();
        let request = build_request(&args(dir.path(), "models/trend.onnx"), Cursor::new(vec![])).unwrap();

        assert_eq!(request.mode, Mode::Patterns);
        assert!(matches!(request.model, ModelSource::Path(ref p) if p == Path::new("models/trend.onnx")));
        assert_eq!(request.image, b"\x89PNG fake");
        assert_eq!(request.labels.len(), 15);
    }

    #[test]
    fn model_from_stdin() {
        let dir = fixture();
        let stdin = Cursor::new(b"onnx-bytes".to_vec());
        let request = build_request(&args(dir.path(), "-"), stdin).unwrap();

        match request.model {
            ModelSource::Bytes(bytes) => assert_eq!(bytes, b"onnx-bytes"),
            other => panic!("unexpected model source: {other:?}"),
        }
    }

    #[test]
    fn missing_image_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = build_request(&args(dir.path(), "m.onnx"), Cursor::new(vec![])).unwrap_err();
        assert!(format!("{err:#}").contains("reading image"));
    }

    #[test]
    fn label_catalog_overrides_builtin() {
        let dir = fixture();
        let catalog = dir.path().join("labels.json");
        let mut file = std::fs::File::create(&catalog).unwrap();
        write!(file, r#"{{"labels": ["Up", "Down"]}}"#).unwrap();

        let mut args = args(dir.path(), "m.onnx");
        args.labels = Some(catalog);
        let request = build_request(&args, Cursor::new(vec![])).unwrap();

        assert_eq!(request.labels.names(), ["Up", "Down"]);
        assert!(request.images.is_empty());
    }

    #[test]
    fn illustration_resolved_against_assets() {
        let dir = fixture();
        std::fs::create_dir(dir.path().join("Patron")).unwrap();
        std::fs::write(dir.path().join("Patron/CNA.png"), b"png").unwrap();

        let request = build_request(&args(dir.path(), "m.onnx"), Cursor::new(vec![])).unwrap();
        let mut predictions = vec![0.0; 15];
        predictions[2] = 0.9;
        let report = request.reduce(&predictions).unwrap();

        assert_eq!(
            illustration_for(&report, dir.path()),
            Illustration::Available(dir.path().join("Patron/CNA.png"))
        );

        predictions[2] = 0.0;
        predictions[3] = 0.9;
        let report = request.reduce(&predictions).unwrap();
        assert_eq!(
            illustration_for(&report, dir.path()),
            Illustration::Missing(dir.path().join("Patron/CND.png"))
        );
    }

    #[test]
    fn json_report_shape() {
        let request = PredictionRequest::new(Mode::Binary, ModelSource::Bytes(vec![]), vec![]);
        let report = request.reduce(&[0.8]).unwrap();
        let out = JsonReport {
            analyzed_at: "2026-01-01T00:00:00+00:00".into(),
            image: "chart.png".into(),
            report: &report,
            asset: &Illustration::Unmapped,
        };

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["mode"], "binary");
        assert_eq!(json["verdict"]["trend"], "bullish");
        assert_eq!(json["asset"]["status"], "unmapped");
        assert_eq!(json["image"], "chart.png");
    }
}
