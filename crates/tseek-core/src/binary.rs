//! Bullish/bearish verdict from a single sigmoid output.

use serde::Serialize;
use tracing::debug;

use crate::CoreError;
use crate::labels::{LabelSource, TREND_LABELS};
use crate::ranking::{Ranking, rank_with};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bearish,
    Bullish,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bearish => "bearish",
            Self::Bullish => "bullish",
        }
    }

    /// Display label, as used in rankings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bearish => TREND_LABELS[0],
            Self::Bullish => TREND_LABELS[1],
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::Bearish => "📉 BEARISH",
            Self::Bullish => "📈 BULLISH",
        }
    }
}

/// Outcome of the binary trend model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BinaryVerdict {
    pub trend: Trend,
    /// Probability of the winning trend.
    pub confidence: f32,
    pub bullish: f32,
    pub bearish: f32,
}

impl BinaryVerdict {
    /// Build a verdict from the positive-class probability `p`.
    ///
    /// Bearish is `1 - p`. Bullish only wins when strictly more likely, so
    /// `p = 0.5` is bearish.
    pub fn from_output(p: f32) -> Self {
        let bullish = p;
        let bearish = 1.0 - p;
        let (trend, confidence) = if bullish > bearish {
            (Trend::Bullish, bullish)
        } else {
            (Trend::Bearish, bearish)
        };
        Self {
            trend,
            confidence,
            bullish,
            bearish,
        }
    }

    /// Build a verdict from raw model output, reading the first value.
    pub fn from_predictions(predictions: &[f32]) -> Result<Self, CoreError> {
        let &p = predictions.first().ok_or(CoreError::EmptyPrediction)?;
        if predictions.len() > 1 {
            debug!(
                outputs = predictions.len(),
                "binary model emitted more than one value; using the first"
            );
        }
        Ok(Self::from_output(p))
    }

    /// The verdict as a two-class ranking (Bearish at index 0, Bullish at 1).
    pub fn ranking(&self) -> Ranking {
        let names = TREND_LABELS.map(String::from);
        rank_with(&[self.bearish, self.bullish], &names, LabelSource::Curated)
    }
}
