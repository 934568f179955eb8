use crate::bbox::{BBox, Ltrb};
use crate::detection::Detection;
use crate::error::Error;

use ndarray::prelude::*;
use serde_derive::{Deserialize, Serialize};

const BOX_FIELDS: usize = 5;

/// How frames were resized to the detector input.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Each axis scaled independently to fill the input.
    Stretch,
    /// Uniform scale with centered padding.
    Letterbox,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DecoderConfig {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub num_classes: usize,
    pub input_width: u32,
    pub input_height: u32,
    pub resize: ResizeMode,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
            iou_threshold: 0.45,
            num_classes: 80,
            input_width: 640,
            input_height: 640,
            resize: ResizeMode::Stretch,
        }
    }
}

/// Maps boxes from detector input space back to frame pixels.
#[derive(Debug, Clone, Copy)]
pub struct Scaling {
    gain_x: f32,
    gain_y: f32,
    pad_x: f32,
    pad_y: f32,
    width: f32,
    height: f32,
}

impl Scaling {
    pub fn new(input_size: (u32, u32), original_size: (u32, u32), mode: ResizeMode) -> Self {
        let (iw, ih) = (input_size.0 as f32, input_size.1 as f32);
        let (ow, oh) = (original_size.0 as f32, original_size.1 as f32);

        match mode {
            ResizeMode::Stretch => Self {
                gain_x: iw / ow,
                gain_y: ih / oh,
                pad_x: 0.0,
                pad_y: 0.0,
                width: ow,
                height: oh,
            },
            ResizeMode::Letterbox => {
                let gain = (iw / ow).min(ih / oh);

                Self {
                    gain_x: gain,
                    gain_y: gain,
                    pad_x: (iw - ow * gain) / 2.0,
                    pad_y: (ih - oh * gain) / 2.0,
                    width: ow,
                    height: oh,
                }
            }
        }
    }

    pub fn apply(&self, bbox: &BBox<Ltrb>) -> BBox<Ltrb> {
        BBox::ltrb(
            (bbox.left() - self.pad_x) / self.gain_x,
            (bbox.top() - self.pad_y) / self.gain_y,
            (bbox.right() - self.pad_x) / self.gain_x,
            (bbox.bottom() - self.pad_y) / self.gain_y,
        )
        .clamp(self.width, self.height)
    }
}

/// Decodes rows of `cx, cy, w, h, objectness, class scores...` into frame
/// detections, then suppresses overlapping ones.
pub fn decode(
    view: ArrayView2<'_, f32>,
    scaling: &Scaling,
    confidence_threshold: f32,
    iou_threshold: f32,
) -> Vec<Detection> {
    let mut candidates = Vec::new();

    for row in view.outer_iter() {
        if row.len() < BOX_FIELDS {
            continue;
        }

        let (class, class_score) = best_class(row.slice(s![BOX_FIELDS..]));
        let score = row[4] * class_score;

        // also drops NaN scores
        if !(score >= confidence_threshold) {
            continue;
        }

        let bbox = scaling
            .apply(&BBox::xywh(row[0], row[1], row[2], row[3]).as_ltrb())
            .as_ltwh();

        if bbox.area() <= 0.0 {
            continue;
        }

        candidates.push(Detection::new(bbox, score, class));
    }

    non_maximum_suppression(candidates, iou_threshold)
}

fn best_class(scores: ArrayView1<'_, f32>) -> (i32, f32) {
    if scores.is_empty() {
        return (0, 1.0);
    }

    let mut class_index = 0;
    let mut confidence = scores[0];

    for (idx, val) in scores.iter().copied().enumerate().skip(1) {
        if val > confidence {
            class_index = idx;
            confidence = val;
        }
    }

    (class_index as i32, confidence)
}

/// Greedy class-agnostic NMS. Equal scores keep their input order.
pub fn non_maximum_suppression(mut dets: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    dets.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::with_capacity(dets.len());
    for det in dets {
        if kept.iter().all(|k| k.iou(&det) < iou_threshold) {
            kept.push(det);
        }
    }

    kept
}

pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    #[inline]
    pub fn input_size(&self) -> (u32, u32) {
        (self.config.input_width, self.config.input_height)
    }

    /// Decodes a flat detector output; a trailing partial row is ignored.
    pub fn decode(&self, raw: &[f32], original_size: (u32, u32)) -> Result<Vec<Detection>, Error> {
        let stride = BOX_FIELDS + self.config.num_classes;
        let rows = raw.len() / stride;

        let view = ArrayView2::from_shape((rows, stride), &raw[..rows * stride])
            .map_err(|e| Error::Model(format!("unexpected output shape: {}", e)))?;
        let scaling = Scaling::new(self.input_size(), original_size, self.config.resize);

        Ok(decode(
            view,
            &scaling,
            self.config.confidence_threshold,
            self.config.iou_threshold,
        ))
    }
}
