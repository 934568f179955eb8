use crate::assembler::{self, AnalysisResult, TrackAnalysis};
use crate::config::CasaConfig;
use crate::detection::Detection;
use crate::error::Error;
use crate::frame::Frame;
use crate::kinematics::TrackKinematics;
use crate::source::DetectionSource;
use crate::tracker::IouTracker;

use rayon::prelude::*;

/// Caller-supplied parameters of one video analysis.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub duration_seconds: f64,
    /// Overrides the frame rate reported by the source.
    pub fps: Option<f64>,
    /// Overrides the configured calibration.
    pub microns_per_pixel: Option<f64>,
}

impl VideoRequest {
    pub fn new(duration_seconds: f64) -> Self {
        Self {
            duration_seconds,
            fps: None,
            microns_per_pixel: None,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        positive("duration", self.duration_seconds)?;

        if let Some(fps) = self.fps {
            positive("fps", fps)?;
        }

        if let Some(mpp) = self.microns_per_pixel {
            positive("px2um", mpp)?;
        }

        Ok(())
    }
}

// products within this distance of an integer count as that integer
const FRAME_BUDGET_EPSILON: f64 = 1e-9;

/// Whole frames in `duration_seconds` at `fps`, ⌊duration × fps⌋ without
/// losing a frame to rounding error (4.1 s at 30 fps is 123 frames).
pub fn frame_budget(duration_seconds: f64, fps: f64) -> usize {
    let frames = duration_seconds * fps;
    let nearest = frames.round();

    if (frames - nearest).abs() < FRAME_BUDGET_EPSILON * nearest.max(1.0) {
        nearest.max(0.0) as usize
    } else {
        frames.floor().max(0.0) as usize
    }
}

fn positive(name: &str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}

#[derive(Debug, Clone)]
pub struct VideoAnalysis {
    pub result: AnalysisResult,
    /// Valid tracks in creation order.
    pub tracks: Vec<TrackAnalysis>,
    /// Mean confidence of every detection seen, 0 without detections.
    pub mean_confidence: f64,
}

pub struct Analyzer {
    config: CasaConfig,
}

impl Analyzer {
    pub fn new(config: CasaConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &CasaConfig {
        &self.config
    }

    /// Frame rate used for timestamps: the request, then the source, then
    /// the configured default.
    pub fn resolve_fps<S: DetectionSource + ?Sized>(&self, source: &S, request: &VideoRequest) -> f64 {
        request
            .fps
            .or_else(|| source.fps().filter(|fps| fps.is_finite() && *fps > 0.0))
            .unwrap_or(self.config.default_fps)
    }

    pub fn analyze_video<S: DetectionSource + ?Sized>(
        &self,
        source: &mut S,
        request: &VideoRequest,
    ) -> Result<VideoAnalysis, Error> {
        request.validate()?;

        let fps = self.resolve_fps(source, request);
        positive("fps", fps)?;

        let microns_per_pixel = request
            .microns_per_pixel
            .unwrap_or(self.config.microns_per_pixel);
        positive("px2um", microns_per_pixel)?;

        let mut budget = frame_budget(request.duration_seconds, fps);
        if let Some(count) = source.frame_count() {
            budget = budget.min(count);
        }

        log::info!(
            "analyzing up to {} frames at {} fps, {} µm/px",
            budget,
            fps,
            microns_per_pixel
        );

        let mut tracker = IouTracker::new(self.config.tracker.clone());
        let mut frames_read = 0;
        let mut confidence_sum = 0.0f64;
        let mut detection_count = 0usize;

        while frames_read < budget {
            let detections = match source.next_detections()? {
                Some(detections) => detections,
                None => {
                    log::info!("source ended after {} of {} frames", frames_read, budget);
                    break;
                }
            };

            confidence_sum += detections.iter().map(|d| d.confidence as f64).sum::<f64>();
            detection_count += detections.len();

            tracker.update(&Frame::new(frames_read, fps, detections));
            frames_read += 1;
        }

        let tracks = tracker.into_tracks();
        let min_points = self.config.min_track_points(fps);

        let valid: Vec<TrackAnalysis> = tracks
            .par_iter()
            .filter(|track| track.len() >= min_points)
            .map(|track| {
                let kinematics = TrackKinematics::compute(track, microns_per_pixel);

                let grade = self.config.motility.classify(&kinematics);
                log::debug!(
                    "track {}: {} points, vsl {:.1}, lin {:.1}, grade {}",
                    track.id.0,
                    track.len(),
                    kinematics.vsl,
                    kinematics.lin,
                    grade.letter()
                );

                TrackAnalysis {
                    id: track.id,
                    points: track.len(),
                    quality: kinematics.movement_quality(),
                    grade,
                    kinematics,
                }
            })
            .collect();

        log::info!(
            "{} tracks, {} valid (at least {} points)",
            tracks.len(),
            valid.len(),
            min_points
        );

        let result = assembler::assemble(
            tracks.len(),
            &valid,
            frames_read,
            request.duration_seconds,
            fps,
        );

        let mean_confidence = if detection_count == 0 {
            0.0
        } else {
            confidence_sum / detection_count as f64
        };

        Ok(VideoAnalysis {
            result,
            tracks: valid,
            mean_confidence,
        })
    }

    /// Detections of the first frame; an empty source yields none.
    pub fn analyze_image<S: DetectionSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<Vec<Detection>, Error> {
        let detections = source.next_detections()?.unwrap_or_default();
        log::info!("{} detections", detections.len());

        Ok(detections)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(CasaConfig::default())
    }
}
