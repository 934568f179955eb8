use crate::detection::Detection;

pub struct Frame {
    pub index: usize,
    pub detections: Vec<Detection>,
    pub timestamp: f64, // in seconds
}

impl Frame {
    pub fn new(index: usize, fps: f64, detections: Vec<Detection>) -> Self {
        Self {
            index,
            detections,
            timestamp: index as f64 / fps,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
