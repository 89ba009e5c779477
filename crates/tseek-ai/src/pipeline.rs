//! One blocking prediction run: load model, decode image, infer, reduce.

use tracing::info;
use tseek_core::{ModelSource, PredictionReport, PredictionRequest};

use crate::InferenceError;
use crate::model::ChartModel;
use crate::preprocess::preprocess;

impl ChartModel {
    /// Load the model named by `source`.
    pub fn open(source: &ModelSource) -> Result<Self, InferenceError> {
        match source {
            ModelSource::Path(path) => Self::load(path),
            ModelSource::Bytes(bytes) => Self::load_from_bytes(bytes),
        }
    }
}

/// Run `request` end to end.
pub fn run(request: &PredictionRequest) -> Result<PredictionReport, InferenceError> {
    let mut model = ChartModel::open(&request.model)?;
    let tensor = preprocess(&request.image, model.input_spec())?;
    let predictions = model.predict(tensor)?;
    let report = request.reduce(&predictions)?;

    let (label, confidence) = report.winner();
    info!(
        mode = report.mode().as_str(),
        classes = report.class_count,
        label,
        confidence,
        "prediction complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tseek_core::Mode;

    #[test]
    fn model_failure_stops_pipeline() {
        let request = PredictionRequest::new(
            Mode::Patterns,
            ModelSource::Bytes(b"not a model".to_vec()),
            Vec::new(),
        );
        let err = run(&request).unwrap_err();
        assert!(matches!(err, InferenceError::ModelLoad { .. }));
    }

    #[test]
    fn missing_model_path() {
        let request = PredictionRequest::new(
            Mode::Binary,
            ModelSource::Path("/nonexistent/trend.onnx".into()),
            Vec::new(),
        );
        let err = run(&request).unwrap_err();
        assert!(matches!(err, InferenceError::ModelLoad { .. }));
    }
}
