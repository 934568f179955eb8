use crate::kinematics::TrackKinematics;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotilityGrade {
    /// Grade A
    RapidProgressive,
    /// Grade B
    SlowProgressive,
    /// Grade C
    NonProgressive,
    /// Grade D
    Immotile,
}

impl MotilityGrade {
    pub const ALL: [MotilityGrade; 4] = [
        MotilityGrade::RapidProgressive,
        MotilityGrade::SlowProgressive,
        MotilityGrade::NonProgressive,
        MotilityGrade::Immotile,
    ];

    pub fn letter(&self) -> char {
        match self {
            MotilityGrade::RapidProgressive => 'A',
            MotilityGrade::SlowProgressive => 'B',
            MotilityGrade::NonProgressive => 'C',
            MotilityGrade::Immotile => 'D',
        }
    }

    #[inline]
    pub fn is_progressive(&self) -> bool {
        matches!(
            self,
            MotilityGrade::RapidProgressive | MotilityGrade::SlowProgressive
        )
    }

    #[inline]
    pub fn is_motile(&self) -> bool {
        *self != MotilityGrade::Immotile
    }
}

/// Grading cutoffs, velocities in µm/s and linearity in percent.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MotilityThresholds {
    pub rapid_min_vsl: f64,
    pub rapid_min_lin: f64,
    pub slow_min_vsl: f64,
    pub slow_min_lin: f64,
    /// Non-progressive requires VSL strictly below this.
    pub non_progressive_max_vsl: f64,
    /// Non-progressive requires VCL strictly above this.
    pub non_progressive_min_vcl: f64,
}

impl Default for MotilityThresholds {
    fn default() -> Self {
        Self {
            rapid_min_vsl: 25.0,
            rapid_min_lin: 50.0,
            slow_min_vsl: 10.0,
            slow_min_lin: 30.0,
            non_progressive_max_vsl: 10.0,
            non_progressive_min_vcl: 5.0,
        }
    }
}

impl MotilityThresholds {
    pub fn classify(&self, k: &TrackKinematics) -> MotilityGrade {
        if k.vsl >= self.rapid_min_vsl && k.lin >= self.rapid_min_lin {
            MotilityGrade::RapidProgressive
        } else if k.vsl >= self.slow_min_vsl && k.lin >= self.slow_min_lin {
            MotilityGrade::SlowProgressive
        } else if k.vsl < self.non_progressive_max_vsl && k.vcl > self.non_progressive_min_vcl {
            MotilityGrade::NonProgressive
        } else {
            MotilityGrade::Immotile
        }
    }
}

/// Grades with the default cutoffs.
#[inline]
pub fn classify(k: &TrackKinematics) -> MotilityGrade {
    MotilityThresholds::default().classify(k)
}
