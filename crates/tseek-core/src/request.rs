//! Request and report types for one prediction run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::CoreError;
use crate::binary::BinaryVerdict;
use crate::illustration::LabelImageMap;
use crate::labels::LabelSet;
use crate::ranking::{Ranking, rank};

/// Which head the loaded model has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Single sigmoid output: bullish vs bearish.
    Binary,
    /// Probability distribution over chart patterns.
    Patterns,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Patterns => "patterns",
        }
    }
}

/// Where the model comes from.
#[derive(Debug, Clone)]
pub enum ModelSource {
    Path(PathBuf),
    /// Raw model bytes, e.g. an upload.
    Bytes(Vec<u8>),
}

/// Everything needed to run one prediction.
#[derive(Debug, Clone)]
pub struct PredictionRequest {
    pub mode: Mode,
    pub model: ModelSource,
    /// Encoded PNG or JPEG bytes.
    pub image: Vec<u8>,
    pub labels: LabelSet,
    pub images: LabelImageMap,
}

impl PredictionRequest {
    /// A request using the built-in chart-pattern labels.
    pub fn new(mode: Mode, model: ModelSource, image: Vec<u8>) -> Self {
        Self {
            mode,
            model,
            image,
            labels: LabelSet::chart_patterns(),
            images: LabelImageMap::chart_patterns(),
        }
    }

    pub fn with_labels(mut self, labels: LabelSet, images: LabelImageMap) -> Self {
        self.labels = labels;
        self.images = images;
        self
    }

    /// Reduce raw model output according to this request's mode and labels.
    pub fn reduce(&self, predictions: &[f32]) -> Result<PredictionReport, CoreError> {
        let outcome = match self.mode {
            Mode::Binary => Outcome::Binary {
                verdict: BinaryVerdict::from_predictions(predictions)?,
            },
            Mode::Patterns => {
                let ranking = rank(predictions, &self.labels)?;
                let illustration = ranking.top_illustration(&self.images).map(PathBuf::from);
                Outcome::Patterns {
                    ranking,
                    illustration,
                }
            }
        };
        Ok(PredictionReport {
            class_count: predictions.len(),
            outcome,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Outcome {
    Binary {
        verdict: BinaryVerdict,
    },
    Patterns {
        ranking: Ranking,
        /// Relative illustration path of the top pattern.
        illustration: Option<PathBuf>,
    },
}

/// Result of one prediction run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    /// Width of the model output.
    pub class_count: usize,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl PredictionReport {
    pub fn mode(&self) -> Mode {
        match self.outcome {
            Outcome::Binary { .. } => Mode::Binary,
            Outcome::Patterns { .. } => Mode::Patterns,
        }
    }

    /// Label and probability of the winning class.
    pub fn winner(&self) -> (&str, f32) {
        match &self.outcome {
            Outcome::Binary { verdict } => (verdict.trend.label(), verdict.confidence),
            Outcome::Patterns { ranking, .. } => {
                let top = ranking.top();
                (top.label.as_str(), top.probability)
            }
        }
    }
}
