//! Chart image preprocessing.
//!
//! Decodes PNG/JPEG bytes, resizes to the model's input size, scales pixels
//! to `[0, 1]`, and lays them out as a single-image batch.

use image::imageops::{self, FilterType};
use tracing::debug;

use crate::InferenceError;

/// Input size used when the model leaves spatial dimensions dynamic.
pub const DEFAULT_INPUT_SIZE: u32 = 150;

const CHANNELS: usize = 3;

/// Memory layout of the model's image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `[batch, height, width, channels]`, as exported from Keras.
    ChannelsLast,
    /// `[batch, channels, height, width]`.
    ChannelsFirst,
}

/// What the model expects as its image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    pub width: u32,
    pub height: u32,
    pub layout: Layout,
}

impl Default for InputSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_INPUT_SIZE,
            height: DEFAULT_INPUT_SIZE,
            layout: Layout::ChannelsLast,
        }
    }
}

impl InputSpec {
    /// Derive the input spec from a model's declared input dimensions.
    ///
    /// Non-positive dimensions are dynamic. Spatial dimensions that are
    /// dynamic fall back to [`DEFAULT_INPUT_SIZE`].
    pub fn from_dims(dims: &[i64]) -> Result<Self, InferenceError> {
        let mismatch = |reason: &str| InferenceError::ShapeMismatch {
            dims: dims.to_vec(),
            reason: reason.to_string(),
        };

        let &[_, d1, d2, d3] = dims else {
            return Err(mismatch("expected a rank-4 input"));
        };

        let channels = CHANNELS as i64;
        // A dynamic last axis reads as channels-last unless the second axis is 3.
        let (layout, height, width) = if d3 == channels || (d3 <= 0 && d1 != channels) {
            (Layout::ChannelsLast, d1, d2)
        } else if d1 == channels {
            (Layout::ChannelsFirst, d2, d3)
        } else {
            return Err(mismatch("no 3-channel axis"));
        };

        Ok(Self {
            width: spatial(width),
            height: spatial(height),
            layout,
        })
    }

    /// Tensor shape for a batch of one image.
    pub fn shape(&self) -> [usize; 4] {
        let (h, w) = (self.height as usize, self.width as usize);
        match self.layout {
            Layout::ChannelsLast => [1, h, w, CHANNELS],
            Layout::ChannelsFirst => [1, CHANNELS, h, w],
        }
    }
}

fn spatial(dim: i64) -> u32 {
    u32::try_from(dim)
        .ok()
        .filter(|&d| d > 0)
        .unwrap_or(DEFAULT_INPUT_SIZE)
}

/// A normalized image ready to feed to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub shape: [usize; 4],
    pub data: Vec<f32>,
}

/// Decode `bytes` and convert them to a model input tensor.
pub fn preprocess(bytes: &[u8], spec: &InputSpec) -> Result<ImageTensor, InferenceError> {
    let decoded = image::load_from_memory(bytes)?.to_rgb8();
    debug!(
        width = decoded.width(),
        height = decoded.height(),
        target_width = spec.width,
        target_height = spec.height,
        "decoded chart image"
    );

    let resized = imageops::resize(&decoded, spec.width, spec.height, FilterType::CatmullRom);
    let data = match spec.layout {
        Layout::ChannelsLast => resized
            .into_raw()
            .into_iter()
            .map(|v| v as f32 / 255.0)
            .collect(),
        Layout::ChannelsFirst => {
            let plane = (spec.width * spec.height) as usize;
            let mut data = vec![0.0f32; plane * CHANNELS];
            for (i, pixel) in resized.pixels().enumerate() {
                for (c, &v) in pixel.0.iter().enumerate() {
                    data[c * plane + i] = v as f32 / 255.0;
                }
            }
            data
        }
    };

    Ok(ImageTensor {
        shape: spec.shape(),
        data,
    })
}
