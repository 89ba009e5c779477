use thiserror::Error;
use tseek_core::CoreError;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("failed to load {model}: {reason}")]
    ModelLoad { model: String, reason: String },

    #[error("model input shape {dims:?} does not accept an RGB image: {reason}")]
    ShapeMismatch { dims: Vec<i64>, reason: String },

    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model produced an empty output")]
    EmptyOutput,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
