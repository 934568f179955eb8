pub mod analysis;
pub mod assembler;
pub mod bbox;
pub mod config;
pub mod decoder;
pub mod detection;
pub mod detector;
pub mod error;
pub mod frame;
pub mod kinematics;
pub mod math;
pub mod motility;
pub mod report;
pub mod source;
pub mod track;
pub mod tracker;

#[cfg(feature = "video")]
pub mod video;

pub use detection::Detection;
pub use frame::Frame;
pub use track::Track;

/// Associates per-frame detections into trajectories.
pub trait Tracking {
    fn update(&mut self, frame: &Frame);
    fn tracks(&self) -> &[Track];
}
