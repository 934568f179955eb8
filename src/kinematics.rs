use crate::math;
use crate::track::Track;
use nalgebra as na;
use serde_derive::Serialize;

const SMOOTHING_WINDOW: usize = 5;

// floor for the trajectory duration, in seconds
const MIN_DURATION: f64 = 1e-6;

/// CASA motion parameters of one trajectory.
///
/// Velocities are in µm/s, `lin`, `str` and `wob` in percent, `alh` in µm
/// and `bcf` in Hz.
///
/// `alh` and `bcf` are approximations: `alh` is the RMS distance of the raw
/// points from their centroid (not from the smoothed path) and `bcf` counts
/// direction reversals per second instead of crossings of the average path.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackKinematics {
    pub vcl: f64,
    pub vsl: f64,
    pub vap: f64,
    pub lin: f64,
    pub str: f64,
    pub wob: f64,
    pub alh: f64,
    pub bcf: f64,
}

impl TrackKinematics {
    #[inline]
    pub fn compute(track: &Track, microns_per_pixel: f64) -> Self {
        Self::from_trajectory(track.points(), track.times(), microns_per_pixel)
    }

    pub fn from_trajectory(
        points: &[na::Point2<f32>],
        times: &[f64],
        microns_per_pixel: f64,
    ) -> Self {
        let points: Vec<na::Point2<f64>> = points
            .iter()
            .map(|p| na::Point2::new(p.x as f64, p.y as f64) * microns_per_pixel)
            .collect();

        let (first, last) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Self::default(),
        };

        let duration = match (times.first(), times.last()) {
            (Some(t0), Some(t1)) => (t1 - t0).max(MIN_DURATION),
            _ => MIN_DURATION,
        };

        let vcl = math::path_length(&points) / duration;
        let vsl = na::distance(first, last) / duration;
        let vap = math::path_length(&math::moving_average(&points, SMOOTHING_WINDOW)) / duration;

        Self {
            vcl,
            vsl,
            vap,
            lin: percent(vsl, vcl),
            str: percent(vsl, vap),
            wob: percent(vap, vcl),
            alh: math::rms_radius(&points),
            bcf: math::direction_reversals(&points) as f64 / duration,
        }
    }

    /// Weighted 0..100 score: VCL up to 30 points (saturating at 100 µm/s),
    /// LIN up to 25, VSL up to 25 (saturating at 50 µm/s) and STR up to 20.
    pub fn movement_quality(&self) -> f64 {
        let velocity = (self.vcl / 100.0 * 30.0).min(30.0);
        let linearity = (self.lin / 100.0 * 25.0).min(25.0);
        let progression = (self.vsl / 50.0 * 25.0).min(25.0);
        let straightness = (self.str / 100.0 * 20.0).min(20.0);

        (velocity + linearity + progression + straightness).clamp(0.0, 100.0)
    }
}

#[inline]
fn percent(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den * 100.0
    } else {
        0.0
    }
}
