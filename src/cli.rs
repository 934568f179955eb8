use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

/// Computer-assisted sperm analysis of a video or a still image
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArguments {
    /// Kind of analysis to run
    #[arg(long = "type", value_enum)]
    pub kind: MediaType,
    /// Video, image or `.dets` detection log to analyze
    #[arg(long)]
    pub media: PathBuf,
    /// Patient identifier copied into the report
    #[arg(long, default_value = "1")]
    pub patient: String,
    /// Seconds of video to analyze
    #[arg(long, default_value_t = 15.0)]
    pub duration: f64,
    /// Frame rate, overrides the one reported by the media
    #[arg(long)]
    pub fps: Option<f64>,
    /// Calibration in micrometers per pixel
    #[arg(long)]
    pub px2um: Option<f64>,
    /// Path to the ONNX detection model
    #[arg(long, default_value = "models/yolov5s.onnx")]
    pub model: PathBuf,
    /// Path to configuration json
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}
