//! Core types for tseek: label sets, prediction ranking, binary verdicts,
//! and illustration lookup.

pub mod binary;
mod error;
pub mod illustration;
pub mod labels;
pub mod ranking;
pub mod request;

pub use binary::{BinaryVerdict, Trend};
pub use error::CoreError;
pub use illustration::{Illustration, LabelImageMap};
pub use labels::{LabelCatalog, LabelSet, LabelSource};
pub use ranking::{Ranking, RankingEntry, rank};
pub use request::{ModelSource, Mode, Outcome, PredictionReport, PredictionRequest};
