use crate::decoder::Decoder;
use crate::detection::Detection;
use crate::error::Error;

use ndarray::prelude::*;

/// An object detection model taking a `1x3xHxW` RGB tensor in `[0, 1]`.
pub trait Detector {
    /// Model input as `(width, height)`.
    fn input_size(&self) -> (u32, u32);

    /// Raw output rows, flattened.
    fn infer(&mut self, input: ArrayView4<'_, f32>) -> Result<Vec<f32>, Error>;
}

/// Runs the model on a preprocessed frame and decodes its output into
/// frame-space detections.
pub fn detect<D: Detector + ?Sized>(
    detector: &mut D,
    decoder: &Decoder,
    input: ArrayView4<'_, f32>,
    original_size: (u32, u32),
) -> Result<Vec<Detection>, Error> {
    let (w, h) = detector.input_size();
    let shape = input.shape();

    if shape[0] != 1 || shape[1] != 3 || shape[2] != h as usize || shape[3] != w as usize {
        return Err(Error::Model(format!(
            "expected input 1x3x{}x{}, got {:?}",
            h, w, shape
        )));
    }

    let raw = detector.infer(input)?;
    let dets = decoder.decode(&raw, original_size)?;

    log::trace!("{} detections after nms", dets.len());

    Ok(dets)
}

#[cfg(feature = "onnx")]
pub use self::onnx::YoloDetector;

#[cfg(feature = "onnx")]
mod onnx {
    use super::Detector;
    use crate::error::Error;

    use ndarray::prelude::*;
    use ort::session::{builder::GraphOptimizationLevel, Session};
    use std::path::Path;

    pub struct YoloDetector {
        session: Session,
        input_size: (u32, u32),
    }

    impl YoloDetector {
        pub fn new<P: AsRef<Path>>(model: P, input_size: (u32, u32)) -> Result<Self, Error> {
            let model = model.as_ref();
            if !model.is_file() {
                return Err(Error::Model(format!(
                    "model file not found: {}",
                    model.display()
                )));
            }

            log::info!("loading model {}", model.display());

            let mut builder = Session::builder().map_err(|e| load_error(model, e))?;
            builder = builder
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| load_error(model, e))?;
            let session = builder
                .commit_from_file(model)
                .map_err(|e| load_error(model, e))?;

            Ok(Self {
                session,
                input_size,
            })
        }
    }

    fn load_error<E: std::fmt::Display>(model: &Path, err: E) -> Error {
        Error::Model(format!("failed to load {}: {}", model.display(), err))
    }

    impl Detector for YoloDetector {
        #[inline]
        fn input_size(&self) -> (u32, u32) {
            self.input_size
        }

        fn infer(&mut self, input: ArrayView4<'_, f32>) -> Result<Vec<f32>, Error> {
            let shape = input.shape().to_vec();
            let data: Vec<f32> = input.iter().copied().collect();

            let value = ort::value::Value::from_array((shape.as_slice(), data.into_boxed_slice()))?;
            let outputs = self.session.run(ort::inputs![value])?;

            let (out_shape, out) = outputs[0].try_extract_tensor::<f32>()?;
            log::trace!("model output shape {:?}", out_shape);

            Ok(out.to_vec())
        }
    }
}
