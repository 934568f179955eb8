use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid media path: {0}")]
    MediaNotFound(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    #[error("Detection log line {line}: {reason}")]
    DetectionLog { line: usize, reason: String },

    #[error("Model Error: {0}")]
    Model(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "onnx")]
    #[error("OnnxRuntime Error: {0}")]
    Ort(#[from] ort::Error),

    #[cfg(feature = "video")]
    #[error("OpenCV Error: {0}")]
    OpenCv(#[from] opencv::Error),
}

impl Error {
    /// Process exit code: 2 for inference failures, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Model(_) => 2,
            #[cfg(feature = "onnx")]
            Error::Ort(_) => 2,
            _ => 1,
        }
    }
}
