use crate::bbox::{BBox, Ltwh};
use crate::detection::Detection;
use nalgebra as na;
use serde_derive::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// Created this frame from an unmatched detection.
    New,
    /// Extended at least once, matched in the latest frame.
    Active,
    /// Missed `missed` consecutive frames, still inside the tolerance window.
    Occluded { missed: u32 },
    /// Never receives data again.
    Terminated,
}

#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub state: TrackState,
    pub last_bbox: BBox<Ltwh>,

    // detection centers, in px
    points: Vec<na::Point2<f32>>,

    // in seconds, same length as `points`
    times: Vec<f64>,
}

impl Track {
    pub fn new(id: TrackId, timestamp: f64, det: &Detection) -> Self {
        Self {
            id,
            state: TrackState::New,
            last_bbox: det.bbox(),
            points: vec![det.center()],
            times: vec![timestamp],
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state != TrackState::Terminated
    }

    pub fn extend(&mut self, timestamp: f64, det: &Detection) {
        debug_assert!(self.is_active());
        debug_assert!(self.times.last().map_or(true, |&t| t <= timestamp));

        self.last_bbox = det.bbox();
        self.points.push(det.center());
        self.times.push(timestamp);
        self.state = TrackState::Active;
    }

    /// Records a frame without a match; terminates once more than
    /// `max_missed_frames` consecutive frames were missed.
    pub fn miss(&mut self, max_missed_frames: u32) {
        let missed = match self.state {
            TrackState::Occluded { missed } => missed + 1,
            TrackState::Terminated => return,
            _ => 1,
        };

        self.state = if missed > max_missed_frames {
            TrackState::Terminated
        } else {
            TrackState::Occluded { missed }
        };
    }

    #[inline]
    pub fn points(&self) -> &[na::Point2<f32>] {
        &self.points
    }

    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
