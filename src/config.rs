use crate::decoder::DecoderConfig;
use crate::error::Error;
use crate::motility::MotilityThresholds;
use crate::report::WhoReferenceLimits;
use crate::tracker::TrackerConfig;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CasaConfig {
    pub decoder: DecoderConfig,
    pub tracker: TrackerConfig,
    pub motility: MotilityThresholds,
    pub who: WhoReferenceLimits,

    // used when neither the caller nor the source reports a frame rate
    pub default_fps: f64,

    // µm per pixel
    pub microns_per_pixel: f64,

    // a track is valid with at least max(min_track_points, fps * min_track_seconds) points
    pub min_track_points: usize,
    pub min_track_seconds: f64,
}

impl Default for CasaConfig {
    fn default() -> Self {
        Self {
            decoder: DecoderConfig::default(),
            tracker: TrackerConfig::default(),
            motility: MotilityThresholds::default(),
            who: WhoReferenceLimits::default(),
            default_fps: 30.0,
            microns_per_pixel: 0.5,
            min_track_points: 3,
            min_track_seconds: 0.5,
        }
    }
}

impl CasaConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    pub fn min_track_points(&self, fps: f64) -> usize {
        let by_time = (fps * self.min_track_seconds).max(0.0) as usize;
        self.min_track_points.max(by_time)
    }
}
