use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltwh};
use nalgebra as na;

/// Contains (x,y) of the left top corner and (width,height) of bbox, in frame pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c", default)]
    pub class: i32,
}

impl Detection {
    pub fn new(bbox: BBox<Ltwh>, confidence: f32, class: i32) -> Self {
        Self {
            x: bbox.left(),
            y: bbox.top(),
            w: bbox.width(),
            h: bbox.height(),
            confidence,
            class,
        }
    }

    #[inline]
    pub fn iou(&self, other: &Detection) -> f32 {
        self.bbox().iou(&other.bbox())
    }

    #[inline(always)]
    pub fn bbox(&self) -> BBox<Ltwh> {
        BBox::ltwh(self.x, self.y, self.w, self.h)
    }

    #[inline(always)]
    pub fn center(&self) -> na::Point2<f32> {
        self.bbox().center()
    }
}
