//! Prediction-to-ranking reduction.
//!
//! Turns a raw probability vector into every class ordered by descending
//! probability, each paired with its label and original output index.

use std::path::Path;

use serde::Serialize;

use crate::CoreError;
use crate::illustration::LabelImageMap;
use crate::labels::{LabelSet, LabelSource};

/// One class of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub label: String,
    pub probability: f32,
    /// Position in the model output.
    pub index: usize,
}

/// All classes of one prediction, highest probability first.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    entries: Vec<RankingEntry>,
    source: LabelSource,
}

/// Rank `predictions` using `labels`.
///
/// Ties keep output order. If `labels` does not have one name per
/// prediction it is replaced by `Pattern 1` .. `Pattern N`.
pub fn rank(predictions: &[f32], labels: &LabelSet) -> Result<Ranking, CoreError> {
    if predictions.is_empty() {
        return Err(CoreError::EmptyPrediction);
    }
    let resolved = labels.resolve(predictions.len());
    Ok(rank_with(predictions, &resolved.names, resolved.source))
}

/// Rank with labels already known to match `predictions` in length.
pub(crate) fn rank_with(predictions: &[f32], names: &[String], source: LabelSource) -> Ranking {
    debug_assert_eq!(predictions.len(), names.len());

    let mut order: Vec<usize> = (0..predictions.len()).collect();
    // Stable, so equal probabilities stay in ascending index order.
    // Adding zero folds -0.0 into +0.0, which `total_cmp` would otherwise split.
    order.sort_by(|&a, &b| (predictions[b] + 0.0).total_cmp(&(predictions[a] + 0.0)));

    let entries = order
        .into_iter()
        .map(|index| RankingEntry {
            label: names[index].clone(),
            probability: predictions[index],
            index,
        })
        .collect();

    Ranking { entries, source }
}

impl Ranking {
    /// The winning class.
    pub fn top(&self) -> &RankingEntry {
        &self.entries[0]
    }

    /// Up to `k` best classes.
    pub fn top_k(&self, k: usize) -> &[RankingEntry] {
        &self.entries[..k.min(self.entries.len())]
    }

    pub fn top3(&self) -> &[RankingEntry] {
        self.top_k(3)
    }

    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    /// Entries in model output order, for charts that keep class positions fixed.
    pub fn in_output_order(&self) -> Vec<&RankingEntry> {
        let mut by_index: Vec<&RankingEntry> = self.entries.iter().collect();
        by_index.sort_by_key(|e| e.index);
        by_index
    }

    /// Probabilities in ranked order.
    pub fn probabilities(&self) -> Vec<f32> {
        self.entries.iter().map(|e| e.probability).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source(&self) -> LabelSource {
        self.source
    }

    /// Whether the configured labels were replaced by placeholders.
    pub fn is_substituted(&self) -> bool {
        self.source == LabelSource::Placeholder
    }

    /// Illustration for the winning class, if any.
    pub fn top_illustration<'m>(&self, images: &'m LabelImageMap) -> Option<&'m Path> {
        images.image_for(&self.top().label, self.source)
    }
}
