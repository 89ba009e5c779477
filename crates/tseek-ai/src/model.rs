//! ONNX Runtime session for chart classification models.
//!
//! The model takes one RGB image batch and emits either a single sigmoid
//! value (binary trend) or a probability per chart pattern.

use std::io::Write;
use std::path::Path;

use ort::session::Session;
use ort::value::{Tensor, ValueType};
use tracing::{debug, info};

use crate::InferenceError;
use crate::preprocess::{ImageTensor, InputSpec};

/// A loaded chart classifier.
pub struct ChartModel {
    session: Session,
    input: InputSpec,
}

impl ChartModel {
    /// Load a model from an `.onnx` file.
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let model = path.display().to_string();
        if !path.is_file() {
            return Err(InferenceError::ModelLoad {
                model,
                reason: "file not found".into(),
            });
        }

        let session = open_session(path).map_err(|e| InferenceError::ModelLoad {
            model: model.clone(),
            reason: e.to_string(),
        })?;

        let input = match session.inputs().first().map(|i| i.dtype()) {
            Some(ValueType::Tensor { shape, .. }) => {
                let dims: Vec<i64> = shape.iter().copied().collect();
                debug!(?dims, "model input");
                InputSpec::from_dims(&dims)?
            }
            _ => {
                return Err(InferenceError::ModelLoad {
                    model,
                    reason: "model has no tensor input".into(),
                });
            }
        };

        info!(
            %model,
            width = input.width,
            height = input.height,
            layout = ?input.layout,
            "loaded chart model"
        );
        Ok(Self { session, input })
    }

    /// Load a model from raw bytes, e.g. an upload.
    ///
    /// The bytes are staged in a temporary file that is removed when this
    /// returns, whether or not loading succeeded.
    pub fn load_from_bytes(bytes: &[u8]) -> Result<Self, InferenceError> {
        Self::load_from_bytes_in(bytes, &std::env::temp_dir())
    }

    /// Like [`load_from_bytes`](Self::load_from_bytes), staging under `dir`.
    pub fn load_from_bytes_in(bytes: &[u8], dir: &Path) -> Result<Self, InferenceError> {
        let mut staged = tempfile::Builder::new()
            .prefix("tseek-model-")
            .suffix(".onnx")
            .tempfile_in(dir)?;
        staged.write_all(bytes)?;
        staged.flush()?;

        Self::load(staged.path()).map_err(|e| match e {
            InferenceError::ModelLoad { reason, .. } => InferenceError::ModelLoad {
                model: format!("uploaded model ({} bytes)", bytes.len()),
                reason,
            },
            other => other,
        })
    }

    /// Image input the model expects.
    pub fn input_spec(&self) -> &InputSpec {
        &self.input
    }

    /// Run the model on one preprocessed image, returning its output row.
    pub fn predict(&mut self, image: ImageTensor) -> Result<Vec<f32>, InferenceError> {
        let shape = image.shape.map(|d| d as i64);
        let tensor = Tensor::from_array((shape, image.data.into_boxed_slice()))
            .map_err(|e| InferenceError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|e| InferenceError::Inference(e.to_string()))?;

        let (output_shape, output_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Inference(e.to_string()))?;
        let dims: &[i64] = output_shape;
        debug!(?dims, "model output");
        first_row(dims, output_data)
    }
}

/// The first batch row of a model output with shape `dims`.
///
/// A scalar or a dynamic batch axis counts as a batch of one.
fn first_row(dims: &[i64], data: &[f32]) -> Result<Vec<f32>, InferenceError> {
    let batch = dims.first().copied().filter(|&d| d > 0).unwrap_or(1) as usize;
    let row = data.len() / batch;
    if row == 0 {
        return Err(InferenceError::EmptyOutput);
    }
    Ok(data[..row].to_vec())
}

fn open_session(path: &Path) -> ort::Result<Session> {
    Ok(Session::builder()?.commit_from_file(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn model_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
            .join("patterns.onnx")
    }

    #[test]
    fn missing_file() {
        let err = ChartModel::load(Path::new("/nonexistent/model.onnx"))
            .err()
            .expect("load should fail");
        match err {
            InferenceError::ModelLoad { model, reason } => {
                assert!(model.contains("model.onnx"));
                assert_eq!(reason, "file not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        let err = ChartModel::load_from_bytes(b"this is not an onnx graph")
            .err()
            .expect("load should fail");
        match err {
            InferenceError::ModelLoad { model, .. } => {
                assert_eq!(model, "uploaded model (25 bytes)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn staged_file_removed_after_failed_load() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(ChartModel::load_from_bytes_in(b"garbage", dir.path()).is_err());

        let leftover = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftover, 0, "staged model file was not cleaned up");
    }

    #[test]
    fn first_row_of_pattern_output() {
        let data: Vec<f32> = (0..15).map(|i| i as f32 / 100.0).collect();
        assert_eq!(first_row(&[1, 15], &data).unwrap(), data);
        assert_eq!(first_row(&[-1, 15], &data).unwrap(), data);
    }

    #[test]
    fn first_row_of_sigmoid_output() {
        assert_eq!(first_row(&[1, 1], &[0.8]).unwrap(), vec![0.8]);
        assert_eq!(first_row(&[], &[0.3]).unwrap(), vec![0.3]);
    }

    #[test]
    fn first_row_keeps_only_first_batch() {
        let data = [0.1, 0.9, 0.6, 0.4];
        assert_eq!(first_row(&[2, 2], &data).unwrap(), vec![0.1, 0.9]);
    }

    #[test]
    fn zero_width_output_is_error() {
        assert!(matches!(first_row(&[1, 0], &[]), Err(InferenceError::EmptyOutput)));
        assert!(matches!(first_row(&[0, 15], &[]), Err(InferenceError::EmptyOutput)));
    }

    #[test]
    fn predict_with_real_model() {
        let path = model_path();
        if !path.exists() {
            eprintln!("skipping: {} not found", path.display());
            return;
        }

        let mut model = ChartModel::load(&path).unwrap();
        let spec = *model.input_spec();
        let (h, w) = (spec.height as usize, spec.width as usize);
        let image = ImageTensor {
            shape: spec.shape(),
            data: vec![0.5; h * w * 3],
        };

        let output = model.predict(image).unwrap();
        assert!(!output.is_empty());
        assert!(output.iter().all(|p| p.is_finite()));
    }
}
