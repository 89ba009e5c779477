//! Class labels for chart-pattern models.
//!
//! The curated set names the fifteen patterns the multi-class model was
//! trained on, in model output order. When a model emits a different number
//! of classes, the curated names cannot be trusted positionally and are
//! replaced by `Pattern 1`, `Pattern 2`, ... for the duration of one ranking.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::CoreError;
use crate::illustration::LabelImageMap;

/// Curated pattern labels and their illustration, in model output order.
pub const CHART_PATTERNS: &[(&str, &str)] = &[
    ("Bandera Alcista", "Patron/BAlc.png"),
    ("Bandera Bajista", "Patron/BBaj.png"),
    ("Canal Alcista", "Patron/CNA.png"),
    ("Canal Bajista", "Patron/CND.png"),
    ("Cuña Alcista", "Patron/CAlc.png"),
    ("Cuña Bajista", "Patron/CBaj.png"),
    ("Hombro-Cabeza-Hombro", "Patron/HCHB.png"),
    ("Doble Techo", "Patron/DT.png"),
    ("Doble Piso", "Patron/DP.png"),
    ("Rectángulo Alcista", "Patron/RAlc.png"),
    ("Rectángulo Bajista", "Patron/RBaj.png"),
    ("Triángulo Alcista", "Patron/TAlc.png"),
    ("Triángulo Bajista", "Patron/TBaj.png"),
    ("Triángulo Simétrico Alc", "Patron/TSAlc.png"),
    ("Triángulo Simétrico Baj", "Patron/TSBaj.png"),
];

/// Labels of the binary trend model. The negative class comes first.
pub const TREND_LABELS: [&str; 2] = ["Bearish", "Bullish"];

/// Prefix for positional labels generated on a class-count mismatch.
pub const PLACEHOLDER_PREFIX: &str = "Pattern";

/// Where the labels of a ranking came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    /// The configured label set matched the model output width.
    Curated,
    /// The configured set was discarded in favour of positional names.
    Placeholder,
}

/// An ordered sequence of human-readable class names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
}

/// Labels resolved against a concrete model output width.
#[derive(Debug, Clone)]
pub struct ResolvedLabels<'a> {
    pub names: Cow<'a, [String]>,
    pub source: LabelSource,
}

impl LabelSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The fifteen curated chart patterns.
    pub fn chart_patterns() -> Self {
        Self::new(CHART_PATTERNS.iter().map(|(name, _)| *name))
    }

    /// `Pattern 1` .. `Pattern n`.
    pub fn placeholder(n: usize) -> Self {
        Self::new((1..=n).map(|i| format!("{PLACEHOLDER_PREFIX} {i}")))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve this set against a model that emits `class_count` outputs.
    ///
    /// A length mismatch is not an error: the set is replaced by placeholder
    /// names and a warning is logged.
    pub fn resolve(&self, class_count: usize) -> ResolvedLabels<'_> {
        if self.names.len() == class_count {
            return ResolvedLabels {
                names: Cow::Borrowed(self.names.as_slice()),
                source: LabelSource::Curated,
            };
        }

        warn!(
            labels = self.names.len(),
            classes = class_count,
            "label count does not match model output; using positional labels"
        );
        ResolvedLabels {
            names: Cow::Owned(Self::placeholder(class_count).names),
            source: LabelSource::Placeholder,
        }
    }
}

/// A label set plus its illustrations, as stored in a JSON catalog file.
///
/// ```json
/// { "labels": ["Doble Techo", "Doble Piso"],
///   "images": { "Doble Techo": "Patron/DT.png" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelCatalog {
    pub labels: Vec<String>,
    #[serde(default)]
    pub images: BTreeMap<String, PathBuf>,
}

impl LabelCatalog {
    /// The built-in fifteen-pattern catalog.
    pub fn chart_patterns() -> Self {
        Self {
            labels: CHART_PATTERNS.iter().map(|(n, _)| n.to_string()).collect(),
            images: CHART_PATTERNS
                .iter()
                .map(|(n, p)| (n.to_string(), PathBuf::from(p)))
                .collect(),
        }
    }

    /// Read a catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| CoreError::LabelCatalog {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn into_parts(self) -> (LabelSet, LabelImageMap) {
        (LabelSet::new(self.labels), LabelImageMap::new(self.images))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn curated_set_has_fifteen_patterns() {
        let labels = LabelSet::chart_patterns();
        assert_eq!(labels.len(), 15);
        assert_eq!(labels.get(0), Some("Bandera Alcista"));
        assert_eq!(labels.get(14), Some("Triángulo Simétrico Baj"));
    }

    #[test]
    fn placeholder_names_are_one_based() {
        let labels = LabelSet::placeholder(3);
        assert_eq!(labels.names(), ["Pattern 1", "Pattern 2", "Pattern 3"]);
    }

    #[test]
    fn resolve_keeps_matching_set() {
        let labels = LabelSet::chart_patterns();
        let resolved = labels.resolve(15);
        assert_eq!(resolved.source, LabelSource::Curated);
        assert_eq!(&*resolved.names, labels.names());
    }

    #[test]
    fn resolve_substitutes_on_mismatch() {
        let labels = LabelSet::chart_patterns();
        let resolved = labels.resolve(4);
        assert_eq!(resolved.source, LabelSource::Placeholder);
        assert_eq!(
            &*resolved.names,
            ["Pattern 1", "Pattern 2", "Pattern 3", "Pattern 4"]
        );
    }

    #[test]
    fn resolve_empty_set_falls_back() {
        let labels = LabelSet::new(Vec::<String>::new());
        let resolved = labels.resolve(2);
        assert_eq!(resolved.source, LabelSource::Placeholder);
        assert_eq!(resolved.names.len(), 2);
    }

    #[test]
    fn builtin_catalog_maps_every_label() {
        let catalog = LabelCatalog::chart_patterns();
        for label in &catalog.labels {
            assert!(catalog.images.contains_key(label), "no image for {label}");
        }
    }

    #[test]
    fn catalog_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"labels": ["Up", "Down"], "images": {{"Up": "art/up.png"}}}}"#
        )
        .unwrap();

        let (labels, images) = LabelCatalog::from_path(file.path()).unwrap().into_parts();
        assert_eq!(labels.names(), ["Up", "Down"]);
        assert_eq!(
            images.image_for("Up", LabelSource::Curated),
            Some(Path::new("art/up.png"))
        );
        assert_eq!(images.image_for("Down", LabelSource::Curated), None);
    }

    #[test]
    fn catalog_images_are_optional() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"labels": ["A"]}}"#).unwrap();

        let catalog = LabelCatalog::from_path(file.path()).unwrap();
        assert!(catalog.images.is_empty());
    }

    #[test]
    fn malformed_catalog_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = LabelCatalog::from_path(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::LabelCatalog { .. }));
    }
}
