//! Reference illustrations for predicted labels.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::CoreError;
use crate::labels::{CHART_PATTERNS, LabelSource};

/// Label → relative illustration path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelImageMap {
    images: BTreeMap<String, PathBuf>,
}

impl LabelImageMap {
    pub fn new(images: BTreeMap<String, PathBuf>) -> Self {
        Self { images }
    }

    /// Illustrations for the fifteen curated chart patterns.
    pub fn chart_patterns() -> Self {
        Self::new(
            CHART_PATTERNS
                .iter()
                .map(|(label, path)| (label.to_string(), PathBuf::from(path)))
                .collect(),
        )
    }

    /// Look up the illustration for `label`.
    ///
    /// Placeholder labels never have an illustration, even if a catalog
    /// happens to contain a key with the same text.
    pub fn image_for(&self, label: &str, source: LabelSource) -> Option<&Path> {
        match source {
            LabelSource::Curated => self.images.get(label).map(PathBuf::as_path),
            LabelSource::Placeholder => None,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// An illustration checked against the assets directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum Illustration {
    Available(PathBuf),
    /// Mapped, but the file is not on disk.
    Missing(PathBuf),
    /// No illustration for this label.
    Unmapped,
}

impl Illustration {
    /// Resolve a mapped relative path under `assets_root`.
    pub fn locate(assets_root: &Path, relative: Option<&Path>) -> Self {
        let Some(relative) = relative else {
            return Self::Unmapped;
        };
        match require_asset(assets_root, relative) {
            Ok(path) => Self::Available(path),
            Err(err) => {
                warn!(error = %err, "illustration unavailable");
                Self::Missing(assets_root.join(relative))
            }
        }
    }
}

/// Join `relative` onto `assets_root` and check that the file exists.
pub fn require_asset(assets_root: &Path, relative: &Path) -> Result<PathBuf, CoreError> {
    let path = assets_root.join(relative);
    if path.is_file() {
        Ok(path)
    } else {
        Err(CoreError::AssetMissing(path))
    }
}
