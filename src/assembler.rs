use crate::kinematics::TrackKinematics;
use crate::math;
use crate::motility::MotilityGrade;
use crate::track::TrackId;
use serde_derive::Serialize;

/// One valid track after kinematics and grading.
#[derive(Serialize, Debug, Clone)]
pub struct TrackAnalysis {
    pub id: TrackId,
    pub points: usize,
    pub kinematics: TrackKinematics,
    /// Movement quality score in `[0, 100]`.
    pub quality: f64,
    pub grade: MotilityGrade,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CasaMetrics {
    pub vcl_mean: f64,
    pub vsl_mean: f64,
    pub vap_mean: f64,
    pub lin_mean: f64,
    pub str_mean: f64,
    pub wob_mean: f64,
    pub alh_mean: f64,
    pub bcf_mean: f64,
    pub vcl_std: f64,
    pub vsl_std: f64,
}

impl CasaMetrics {
    pub fn from_kinematics(ks: &[TrackKinematics]) -> Self {
        let column = |f: fn(&TrackKinematics) -> f64| ks.iter().map(f).collect::<Vec<_>>();

        let vcl = column(|k| k.vcl);
        let vsl = column(|k| k.vsl);

        Self {
            vcl_mean: math::mean(&vcl),
            vsl_mean: math::mean(&vsl),
            vap_mean: math::mean(&column(|k| k.vap)),
            lin_mean: math::mean(&column(|k| k.lin)),
            str_mean: math::mean(&column(|k| k.str)),
            wob_mean: math::mean(&column(|k| k.wob)),
            alh_mean: math::mean(&column(|k| k.alh)),
            bcf_mean: math::mean(&column(|k| k.bcf)),
            vcl_std: math::std_dev(&vcl),
            vsl_std: math::std_dev(&vsl),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MotilityAnalysis {
    pub rapid_progressive_percent: f64,
    pub slow_progressive_percent: f64,
    pub non_progressive_percent: f64,
    pub immotile_percent: f64,
    pub total_progressive_percent: f64,
    pub total_motile_percent: f64,
    pub rapid_progressive_count: usize,
    pub slow_progressive_count: usize,
    pub non_progressive_count: usize,
    pub immotile_count: usize,
}

impl MotilityAnalysis {
    /// With no graded tracks everything is reported immotile.
    pub fn from_grades<I: IntoIterator<Item = MotilityGrade>>(grades: I) -> Self {
        let mut counts = [0usize; 4];
        let mut progressive = 0;
        let mut motile = 0;

        for grade in grades {
            counts[grade as usize] += 1;
            progressive += grade.is_progressive() as usize;
            motile += grade.is_motile() as usize;
        }

        let total: usize = counts.iter().sum();
        let pct = |n: usize| {
            if total == 0 {
                0.0
            } else {
                n as f64 / total as f64 * 100.0
            }
        };

        let [a, b, c, d] = counts;
        let immotile_percent = if total == 0 { 100.0 } else { pct(d) };

        Self {
            rapid_progressive_percent: pct(a),
            slow_progressive_percent: pct(b),
            non_progressive_percent: pct(c),
            immotile_percent,
            total_progressive_percent: pct(progressive),
            total_motile_percent: pct(motile),
            rapid_progressive_count: a,
            slow_progressive_count: b,
            non_progressive_count: c,
            immotile_count: d,
        }
    }
}

/// Video-level outcome of one analysis.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub casa_metrics: CasaMetrics,
    pub motility_analysis: MotilityAnalysis,
    pub total_frames: usize,
    pub total_tracks: usize,
    pub valid_tracks: usize,
    pub fps: f64,
    pub requested_duration_seconds: f64,
    pub actual_duration_seconds: f64,
}

pub fn assemble(
    total_tracks: usize,
    valid: &[TrackAnalysis],
    total_frames: usize,
    duration_seconds: f64,
    fps: f64,
) -> AnalysisResult {
    let kinematics: Vec<TrackKinematics> = valid.iter().map(|t| t.kinematics).collect();

    AnalysisResult {
        casa_metrics: CasaMetrics::from_kinematics(&kinematics),
        motility_analysis: MotilityAnalysis::from_grades(valid.iter().map(|t| t.grade)),
        total_frames,
        total_tracks,
        valid_tracks: valid.len(),
        fps,
        requested_duration_seconds: duration_seconds,
        actual_duration_seconds: if fps > 0.0 {
            total_frames as f64 / fps
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn analysis(id: u32, vcl: f64, vsl: f64, grade: MotilityGrade) -> TrackAnalysis {
        TrackAnalysis {
            id: TrackId(id),
            points: 20,
            kinematics: TrackKinematics {
                vcl,
                vsl,
                ..Default::default()
            },
            quality: 0.0,
            grade,
        }
    }

    #[test]
    fn no_valid_tracks_is_all_immotile() {
        let result = assemble(7, &[], 90, 3.0, 30.0);

        assert_eq!(result.casa_metrics, CasaMetrics::default());
        assert_eq!(result.motility_analysis.immotile_percent, 100.0);
        assert_eq!(result.motility_analysis.rapid_progressive_percent, 0.0);
        assert_eq!(result.motility_analysis.slow_progressive_percent, 0.0);
        assert_eq!(result.motility_analysis.non_progressive_percent, 0.0);
        assert_eq!(result.motility_analysis.total_motile_percent, 0.0);
        assert_eq!(result.total_tracks, 7);
        assert_eq!(result.valid_tracks, 0);
        assert_relative_eq!(result.actual_duration_seconds, 3.0);
    }

    #[test]
    fn means_and_percentages() {
        let valid = [
            analysis(1, 100.0, 60.0, MotilityGrade::RapidProgressive),
            analysis(2, 50.0, 20.0, MotilityGrade::SlowProgressive),
            analysis(4, 30.0, 2.0, MotilityGrade::NonProgressive),
        ];

        let result = assemble(5, &valid, 45, 15.0, 30.0);
        let m = &result.motility_analysis;

        assert_relative_eq!(result.casa_metrics.vcl_mean, 60.0);
        assert_relative_eq!(result.casa_metrics.vsl_mean, 82.0 / 3.0);
        assert_relative_eq!(m.rapid_progressive_percent, 100.0 / 3.0);
        assert_relative_eq!(m.total_progressive_percent, 200.0 / 3.0);
        assert_relative_eq!(m.total_motile_percent, 100.0);
        assert_eq!(m.immotile_count, 0);
        assert_eq!(result.valid_tracks, 3);
        assert_relative_eq!(result.requested_duration_seconds, 15.0);
        assert_relative_eq!(result.actual_duration_seconds, 1.5);
    }

    #[test]
    fn percentages_sum_to_hundred() {
        for n in 1..40usize {
            let grades = (0..n).map(|i| MotilityGrade::ALL[(i * 7 + n) % 4]);
            let m = MotilityAnalysis::from_grades(grades);

            let sum = m.rapid_progressive_percent
                + m.slow_progressive_percent
                + m.non_progressive_percent
                + m.immotile_percent;

            assert_relative_eq!(sum, 100.0, epsilon = 1e-9);
        }
    }
}
