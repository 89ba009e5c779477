//! Chart classification: image preprocessing and ONNX Runtime inference.

mod error;
pub mod preprocess;

pub use error::InferenceError;
pub use preprocess::{ImageTensor, InputSpec, Layout, preprocess};

#[cfg(feature = "onnx")]
mod model;
#[cfg(feature = "onnx")]
pub use model::ChartModel;
#[cfg(feature = "onnx")]
mod pipeline;
#[cfg(feature = "onnx")]
pub use pipeline::run;
