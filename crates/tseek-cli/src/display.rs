//! Terminal rendering for prediction reports.
//!
//! Renders a report as a card: headline, confidence bar, detail section,
//! and a horizontal bar chart of every class on a fixed 0–1 scale.

use std::fmt::{self, Write};

use tseek_ai::InferenceError;
use tseek_core::illustration::Illustration;
use tseek_core::{BinaryVerdict, CoreError, Outcome, PredictionReport, Ranking};

const PROGRESS_WIDTH: usize = 30;
const CHART_WIDTH: usize = 40;

// ── Public API ──

/// Render a report as a text card.
pub fn render_report(report: &PredictionReport, illustration: &Illustration) -> String {
    ReportCard {
        report,
        illustration,
    }
    .to_string()
}

/// Render a failure with a hint that depends on what went wrong.
pub fn render_error(err: &InferenceError) -> String {
    let hint = match err {
        InferenceError::ModelLoad { .. } => {
            "Check that the file is an ONNX export of the trained chart model."
        }
        InferenceError::ShapeMismatch { .. } => {
            "The model must take a single RGB image batch (e.g. [N, 150, 150, 3])."
        }
        InferenceError::ImageDecode(_) => "Use a PNG or JPEG chart image.",
        InferenceError::Io(_) => "Check that the files are readable.",
        InferenceError::Inference(_)
        | InferenceError::EmptyOutput
        | InferenceError::Core(CoreError::EmptyPrediction) => {
            "Check that the model and the image are compatible."
        }
        InferenceError::Core(_) => "Check the label catalog and assets directory.",
    };
    format!("❌ Processing failed: {err}\n💡 {hint}\n")
}

/// Render the curated pattern list with the on-disk status of each illustration.
pub fn render_catalog(rows: &[(String, Illustration)]) -> String {
    CatalogListing { rows }.to_string()
}

// ── Cards ──

struct ReportCard<'a> {
    report: &'a PredictionReport,
    illustration: &'a Illustration,
}

impl fmt::Display for ReportCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.report.outcome {
            Outcome::Binary { verdict } => write_binary(f, verdict)?,
            Outcome::Patterns { ranking, .. } => write_patterns(f, ranking, self.illustration)?,
        }
        writeln!(f)?;
        writeln!(f, "✅ Analysis complete")
    }
}

struct CatalogListing<'a> {
    rows: &'a [(String, Illustration)],
}

impl fmt::Display for CatalogListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = label_width(self.rows.iter().map(|(l, _)| l.as_str()));

        writeln!(f, "Chart patterns ({})", self.rows.len())?;
        for (i, (label, illustration)) in self.rows.iter().enumerate() {
            let status = match illustration {
                Illustration::Available(p) => format!("{}", p.display()),
                Illustration::Missing(p) => format!("{} (file not found)", p.display()),
                Illustration::Unmapped => "(no illustration)".to_string(),
            };
            writeln!(f, "  {:>2}. {:<label_width$}  {}", i + 1, label, status)?;
        }
        Ok(())
    }
}

fn write_binary(out: &mut impl Write, verdict: &BinaryVerdict) -> fmt::Result {
    writeln!(out, "### {}", verdict.trend.headline())?;
    writeln!(out, "Confidence: {:.1}%", verdict.confidence * 100.0)?;
    writeln!(out, "{}", progress_bar(verdict.confidence, PROGRESS_WIDTH))?;
    writeln!(out)?;

    writeln!(out, "Detailed probabilities")?;
    writeln!(out, "  {:<10} {:>7.2}%", "Bullish", verdict.bullish * 100.0)?;
    writeln!(out, "  {:<10} {:>7.2}%", "Bearish", verdict.bearish * 100.0)?;
    writeln!(out)?;

    let ranking = verdict.ranking();
    let rows: Vec<(&str, f32, bool)> = ranking
        .in_output_order()
        .into_iter()
        .map(|e| (e.label.as_str(), e.probability, false))
        .collect();
    writeln!(out, "Probability distribution")?;
    bar_chart(out, &rows, CHART_WIDTH)
}

fn write_patterns(
    out: &mut impl Write,
    ranking: &Ranking,
    illustration: &Illustration,
) -> fmt::Result {
    let top = ranking.top();
    writeln!(out, "### 🎯 {}", top.label)?;
    writeln!(out, "Confidence: {:.1}%", top.probability * 100.0)?;
    writeln!(out, "{}", progress_bar(top.probability, PROGRESS_WIDTH))?;

    if ranking.is_substituted() {
        writeln!(
            out,
            "⚠ Label set does not match the model's {} classes; showing positional labels.",
            ranking.len()
        )?;
    }

    match illustration {
        Illustration::Available(path) => {
            writeln!(out, "Pattern illustration: {}", path.display())?
        }
        Illustration::Missing(path) => {
            writeln!(out, "Pattern illustration: file not found ({})", path.display())?
        }
        Illustration::Unmapped => {
            writeln!(out, "Pattern illustration: not available for this pattern")?
        }
    }
    writeln!(out)?;

    writeln!(out, "Top 3 patterns")?;
    let top3 = ranking.top3();
    let width = label_width(top3.iter().map(|e| e.label.as_str()));
    for (i, entry) in top3.iter().enumerate() {
        writeln!(
            out,
            "  {}. {:<width$} {:>7.2}%",
            i + 1,
            entry.label,
            entry.probability * 100.0
        )?;
    }
    writeln!(out)?;

    let rows: Vec<(&str, f32, bool)> = ranking
        .in_output_order()
        .into_iter()
        .map(|e| (e.label.as_str(), e.probability, e.index == top.index))
        .collect();
    writeln!(out, "Probabilities by pattern")?;
    bar_chart(out, &rows, CHART_WIDTH)
}

// ── Bars ──

/// `[█████░░░░░]` filled in proportion to `p`, clamped to 0–1.
fn progress_bar(p: f32, width: usize) -> String {
    let filled = filled_cells(p, width);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

/// One row per `(label, probability, highlighted)`, on a 0–1 scale.
fn bar_chart(out: &mut impl Write, rows: &[(&str, f32, bool)], width: usize) -> fmt::Result {
    let label_width = label_width(rows.iter().map(|(l, _, _)| *l));
    for &(label, p, highlighted) in rows {
        let marker = if highlighted { '▶' } else { ' ' };
        let filled = filled_cells(p, width);
        writeln!(
            out,
            "  {:<label_width$} {} │{}{} {:.2}",
            label,
            marker,
            "█".repeat(filled),
            " ".repeat(width - filled),
            p
        )?;
    }
    Ok(())
}

fn filled_cells(p: f32, width: usize) -> usize {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    ((p * width as f32).round() as usize).min(width)
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}
