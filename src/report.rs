use crate::assembler::{AnalysisResult, CasaMetrics, MotilityAnalysis};
use crate::error::Error;
use serde_derive::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lower reference limits used for the compliance flag.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WhoReferenceLimits {
    pub min_progressive_percent: f64,
    pub min_motile_percent: f64,
    pub min_image_count: usize,
}

impl Default for WhoReferenceLimits {
    fn default() -> Self {
        Self {
            min_progressive_percent: 32.0,
            min_motile_percent: 40.0,
            min_image_count: 1,
        }
    }
}

impl WhoReferenceLimits {
    pub fn video_compliant(&self, motility: &MotilityAnalysis) -> bool {
        motility.total_progressive_percent >= self.min_progressive_percent
            && motility.total_motile_percent >= self.min_motile_percent
    }

    pub fn image_compliant(&self, count: usize) -> bool {
        count >= self.min_image_count
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "analysisType", rename_all = "lowercase")]
pub enum Report {
    Image(ImageReport),
    Video(VideoReport),
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageReport {
    pub schema_version: u32,
    pub patient_id: String,
    pub timestamp: String,
    pub total_count: usize,
    pub ai_confidence: f64,
    pub concentration_estimation: f64,
    pub who_compliance: bool,
    pub original_image_path: String,
    pub analyzed_image_path: String,
    pub heatmap_path: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VideoReport {
    pub schema_version: u32,
    pub patient_id: String,
    pub timestamp: String,
    pub total_tracks: usize,
    pub valid_tracks: usize,
    pub total_frames: usize,
    pub duration_seconds: f64,
    pub actual_duration_seconds: f64,
    pub fps: f64,
    pub casa_metrics: CasaMetrics,
    pub motility_analysis: MotilityAnalysis,
    pub ai_confidence: f64,
    pub who_compliance: bool,
    pub original_video_path: String,
}

impl VideoReport {
    pub fn new(
        patient_id: String,
        media_path: String,
        result: AnalysisResult,
        ai_confidence: f64,
        limits: &WhoReferenceLimits,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            patient_id,
            timestamp: timestamp_now(),
            who_compliance: limits.video_compliant(&result.motility_analysis),
            total_tracks: result.total_tracks,
            valid_tracks: result.valid_tracks,
            total_frames: result.total_frames,
            duration_seconds: result.requested_duration_seconds,
            actual_duration_seconds: result.actual_duration_seconds,
            fps: result.fps,
            casa_metrics: result.casa_metrics,
            motility_analysis: result.motility_analysis,
            ai_confidence,
            original_video_path: media_path,
        }
    }
}

impl ImageReport {
    pub fn new(
        patient_id: String,
        media_path: String,
        confidences: &[f32],
        limits: &WhoReferenceLimits,
    ) -> Self {
        let count = confidences.len();
        let ai_confidence = if count == 0 {
            // nothing detected is reported with the detector's nominal confidence
            0.92
        } else {
            confidences.iter().map(|&c| c as f64).sum::<f64>() / count as f64
        };

        Self {
            schema_version: SCHEMA_VERSION,
            patient_id,
            timestamp: timestamp_now(),
            total_count: count,
            ai_confidence,
            concentration_estimation: (count as f64 * 0.1).max(0.0),
            who_compliance: limits.image_compliant(count),
            original_image_path: media_path,
            analyzed_image_path: String::new(),
            heatmap_path: String::new(),
        }
    }
}

impl Report {
    pub fn to_json(&self, pretty: bool) -> Result<String, Error> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };

        Ok(json)
    }
}

pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;

    #[test]
    fn video_report_fields() {
        let result = assemble(3, &[], 30, 1.0, 30.0);
        let report = Report::Video(VideoReport::new(
            "42".into(),
            "sample.dets".into(),
            result,
            0.0,
            &WhoReferenceLimits::default(),
        ));

        let value: serde_json::Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();

        assert_eq!(value["analysisType"], "video");
        assert_eq!(value["schemaVersion"], 1);
        assert_eq!(value["patientId"], "42");
        assert_eq!(value["totalTracks"], 3);
        assert_eq!(value["validTracks"], 0);
        assert_eq!(value["whoCompliance"], false);
        assert_eq!(value["motilityAnalysis"]["immotilePercent"], 100.0);
        assert_eq!(value["casaMetrics"]["vclMean"], 0.0);
        assert_eq!(value["originalVideoPath"], "sample.dets");
    }

    #[test]
    fn image_report_defaults() {
        let limits = WhoReferenceLimits::default();

        let empty = ImageReport::new("1".into(), "a.png".into(), &[], &limits);
        assert_eq!(empty.total_count, 0);
        assert_eq!(empty.ai_confidence, 0.92);
        assert!(!empty.who_compliance);

        let some = ImageReport::new("1".into(), "a.png".into(), &[0.5, 0.7], &limits);
        assert_eq!(some.total_count, 2);
        assert!((some.ai_confidence - 0.6).abs() < 1e-6);
        assert!((some.concentration_estimation - 0.2).abs() < 1e-12);
        assert!(some.who_compliance);

        let json = Report::Image(some).to_json(true).unwrap();
        assert!(json.contains("\"analysisType\": \"image\""));
        assert!(json.contains("\"heatmapPath\": \"\""));
    }

    #[test]
    fn video_compliance_limits() {
        let limits = WhoReferenceLimits::default();
        let mut m = crate::assembler::MotilityAnalysis::from_grades(std::iter::empty());

        m.total_progressive_percent = 32.0;
        m.total_motile_percent = 40.0;
        assert!(limits.video_compliant(&m));

        m.total_progressive_percent = 31.9;
        assert!(!limits.video_compliant(&m));
    }

    #[test]
    fn timestamp_shape() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }
}
