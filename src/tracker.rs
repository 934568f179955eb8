use crate::frame::Frame;
use crate::track::{Track, TrackId};
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TrackerConfig {
    pub iou_threshold: f32,

    // consecutive unmatched frames a track survives; 0 ends it on the first miss
    pub max_missed_frames: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.3,
            max_missed_frames: 0,
        }
    }
}

/// Greedy frame-to-frame tracker matching boxes by overlap.
///
/// Tracks live in an arena ordered by creation; a `TrackId` addresses the
/// same track for the whole analysis.
pub struct IouTracker {
    config: TrackerConfig,
    tracks: Vec<Track>,
    next_id: u32,
}

impl IouTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            tracks: Vec::with_capacity(64),
            next_id: 1,
        }
    }

    pub fn update(&mut self, frame: &Frame) {
        let timestamp = frame.timestamp;
        let mut claimed = vec![false; frame.len()];
        let mut extended = 0;

        for track in self.tracks.iter_mut().filter(|t| t.is_active()) {
            let mut best: Option<(usize, f32)> = None;

            for (idx, det) in frame.iter().enumerate() {
                if claimed[idx] {
                    continue;
                }

                let iou = track.last_bbox.iou(&det.bbox());
                if iou > best.map_or(0.0, |(_, b)| b) {
                    best = Some((idx, iou));
                }
            }

            match best {
                Some((idx, iou)) if iou >= self.config.iou_threshold => {
                    track.extend(timestamp, &frame.detections[idx]);
                    claimed[idx] = true;
                    extended += 1;
                }
                _ => track.miss(self.config.max_missed_frames),
            }
        }

        let mut created = 0;
        for (idx, det) in frame.iter().enumerate() {
            if claimed[idx] {
                continue;
            }

            let id = TrackId(self.next_id);
            self.next_id += 1;
            self.tracks.push(Track::new(id, timestamp, det));
            created += 1;
        }

        log::debug!(
            "frame {}: {} detections, {} tracks extended, {} created, {} active",
            frame.index,
            frame.len(),
            extended,
            created,
            self.active_count()
        );
    }

    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_active()).count()
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

impl Default for IouTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl crate::Tracking for IouTracker {
    #[inline]
    fn update(&mut self, frame: &Frame) {
        IouTracker::update(self, frame)
    }

    #[inline]
    fn tracks(&self) -> &[Track] {
        IouTracker::tracks(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::track::TrackState;
    use crate::Detection;
    use nalgebra as na;

    const FPS: f64 = 30.0;

    fn det(x: f32, y: f32) -> Detection {
        Detection::new(BBox::ltwh(x, y, 10.0, 10.0), 0.9, 0)
    }

    fn run(tracker: &mut IouTracker, frames: Vec<Vec<Detection>>) {
        for (idx, dets) in frames.into_iter().enumerate() {
            tracker.update(&Frame::new(idx, FPS, dets));
        }
    }

    #[test]
    fn extends_overlapping_detection() {
        let mut tracker = IouTracker::default();
        run(
            &mut tracker,
            vec![vec![det(0.0, 0.0)], vec![det(1.0, 0.0)], vec![det(2.0, 1.0)]],
        );

        assert_eq!(tracker.tracks().len(), 1);

        let track = &tracker.tracks()[0];
        assert_eq!(track.id, TrackId(1));
        assert_eq!(track.state, TrackState::Active);
        assert_eq!(track.len(), 3);
        assert_eq!(track.points()[2], na::Point2::new(7.0, 6.0));
        assert_eq!(track.times(), &[0.0, 1.0 / FPS, 2.0 / FPS]);
    }

    #[test]
    fn first_miss_terminates_without_resurrection() {
        let mut tracker = IouTracker::default();
        run(
            &mut tracker,
            vec![vec![det(0.0, 0.0)], vec![], vec![det(0.0, 0.0)]],
        );

        let tracks = tracker.tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].state, TrackState::Terminated);
        assert_eq!(tracks[0].len(), 1);
        assert_eq!(tracks[1].id, TrackId(2));
        assert_eq!(tracks[1].state, TrackState::New);
    }

    #[test]
    fn low_overlap_starts_new_track() {
        let mut tracker = IouTracker::default();
        // iou of 10x10 boxes shifted by 6px is 4/16 = 0.25
        run(&mut tracker, vec![vec![det(0.0, 0.0)], vec![det(6.0, 0.0)]]);

        let tracks = tracker.tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].state, TrackState::Terminated);
        assert_eq!(tracker.active_count(), 1);
    }

    #[test]
    fn first_declared_track_wins_ties() {
        let mut tracker = IouTracker::default();
        run(
            &mut tracker,
            vec![
                vec![det(0.0, 0.0), det(0.0, 0.0)],
                vec![det(0.0, 0.0)],
            ],
        );

        let tracks = tracker.tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].len(), 2);
        assert_eq!(tracks[1].state, TrackState::Terminated);
    }

    #[test]
    fn detection_claimed_once_per_frame() {
        let mut tracker = IouTracker::default();
        run(
            &mut tracker,
            vec![
                vec![det(0.0, 0.0), det(100.0, 100.0)],
                vec![det(1.0, 0.0), det(101.0, 100.0), det(50.0, 50.0)],
            ],
        );

        let tracks = tracker.tracks();
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].len(), 2);
        assert_eq!(tracks[1].len(), 2);
        assert_eq!(tracks[2].points()[0], na::Point2::new(55.0, 55.0));
    }

    #[test]
    fn occlusion_window_keeps_track_alive() {
        let mut tracker = IouTracker::new(TrackerConfig {
            max_missed_frames: 1,
            ..Default::default()
        });

        run(
            &mut tracker,
            vec![
                vec![det(0.0, 0.0)],
                vec![det(1.0, 0.0)],
                vec![],
                vec![det(2.0, 0.0)],
                vec![],
                vec![],
                vec![det(3.0, 0.0)],
            ],
        );

        let tracks = tracker.tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].len(), 3);
        assert_eq!(tracks[0].times(), &[0.0, 1.0 / FPS, 3.0 / FPS]);
        assert_eq!(tracks[0].state, TrackState::Terminated);
        assert_eq!(tracks[1].state, TrackState::New);
    }

    #[test]
    fn rerun_is_deterministic() {
        let frames = || {
            (0..20)
                .map(|i| {
                    let t = i as f32;
                    vec![
                        det(t * 2.0, 0.0),
                        det(50.0, t * 3.0),
                        det(200.0 - t * 8.0, 200.0),
                    ]
                })
                .collect::<Vec<_>>()
        };

        let mut a = IouTracker::default();
        let mut b = IouTracker::default();
        run(&mut a, frames());
        run(&mut b, frames());

        assert_eq!(a.tracks().len(), b.tracks().len());
        for (ta, tb) in a.tracks().iter().zip(b.tracks()) {
            assert_eq!(ta.id, tb.id);
            assert_eq!(ta.points(), tb.points());
            assert_eq!(ta.times(), tb.times());
        }
    }
}
