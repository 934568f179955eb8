use crate::detection::Detection;
use crate::error::Error;

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const DETECTION_LOG_EXTENSION: &str = "dets";

/// Per-frame detections in capture order.
///
/// `Ok(None)` marks the end of the stream, which may come before the
/// requested number of frames.
pub trait DetectionSource {
    fn fps(&self) -> Option<f64> {
        None
    }

    fn frame_count(&self) -> Option<usize> {
        None
    }

    fn next_detections(&mut self) -> Result<Option<Vec<Detection>>, Error>;
}

/// Detections recorded one frame per line as `<frame>:<json array>`.
///
/// Lines starting with `#` are comments; a leading `# fps=<value>` comment
/// sets the frame rate. A line without `:`, blank ones included, is a frame
/// with no detections.
pub struct DetectionLog<R: BufRead> {
    lines: std::io::Lines<R>,
    line_no: usize,
    pending: Option<String>,
    fps: Option<f64>,
}

impl DetectionLog<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: BufRead> DetectionLog<R> {
    pub fn from_reader(reader: R) -> Result<Self, Error> {
        let mut log = Self {
            lines: reader.lines(),
            line_no: 0,
            pending: None,
            fps: None,
        };

        // header comments
        while let Some(line) = log.read_line()? {
            match line.strip_prefix('#') {
                Some(comment) => {
                    if let Some(value) = comment.trim().strip_prefix("fps=") {
                        let fps = value.trim().parse::<f64>().map_err(|_| Error::DetectionLog {
                            line: log.line_no,
                            reason: format!("bad fps value `{}`", value),
                        })?;
                        log.fps = Some(fps);
                    }
                }
                None => {
                    log.pending = Some(line);
                    break;
                }
            }
        }

        Ok(log)
    }

    fn read_line(&mut self) -> Result<Option<String>, Error> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    fn parse(&self, line: &str) -> Result<Vec<Detection>, Error> {
        let idx = match line.find(':') {
            Some(idx) => idx,
            None => return Ok(Vec::new()),
        };

        let (_, vector) = line.split_at(idx + 1);
        serde_json::from_str(vector).map_err(|e| Error::DetectionLog {
            line: self.line_no,
            reason: e.to_string(),
        })
    }
}

impl<R: BufRead> DetectionSource for DetectionLog<R> {
    fn fps(&self) -> Option<f64> {
        self.fps
    }

    fn next_detections(&mut self) -> Result<Option<Vec<Detection>>, Error> {
        loop {
            let line = match self.pending.take() {
                Some(line) => line,
                None => match self.read_line()? {
                    Some(line) => line,
                    None => return Ok(None),
                },
            };

            if line.starts_with('#') {
                continue;
            }

            return self.parse(&line).map(Some);
        }
    }
}

/// Detections already held in memory.
pub struct Replay {
    frames: VecDeque<Vec<Detection>>,
    fps: Option<f64>,
    total: usize,
}

impl Replay {
    pub fn new(frames: Vec<Vec<Detection>>, fps: Option<f64>) -> Self {
        Self {
            total: frames.len(),
            frames: frames.into(),
            fps,
        }
    }
}

impl DetectionSource for Replay {
    fn fps(&self) -> Option<f64> {
        self.fps
    }

    fn frame_count(&self) -> Option<usize> {
        Some(self.total)
    }

    fn next_detections(&mut self) -> Result<Option<Vec<Detection>>, Error> {
        Ok(self.frames.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LOG: &str = r#"# recorded at 640x480
# fps=25
0:[{"x":1.0,"y":2.0,"w":3.0,"h":4.0,"p":0.9,"c":0}]
1:[]
# dropped frame follows

3:[{"x":1.0,"y":2.0,"w":3.0,"h":4.0,"p":0.5},{"x":9.0,"y":9.0,"w":3.0,"h":4.0,"p":0.4}]
"#;

    #[test]
    fn reads_frames_in_order() {
        let mut log = DetectionLog::from_reader(Cursor::new(LOG)).unwrap();
        assert_eq!(log.fps(), Some(25.0));

        let mut sizes = Vec::new();
        while let Some(dets) = log.next_detections().unwrap() {
            sizes.push(dets.len());
        }

        assert_eq!(sizes, vec![1, 0, 0, 2]);
    }

    #[test]
    fn blank_line_is_an_empty_frame() {
        let mut log = DetectionLog::from_reader(Cursor::new("0:[]\n\n# note\n2:[]\n")).unwrap();

        assert_eq!(log.next_detections().unwrap(), Some(vec![]));
        assert_eq!(log.next_detections().unwrap(), Some(vec![]));
        assert_eq!(log.next_detections().unwrap(), Some(vec![]));
        assert_eq!(log.next_detections().unwrap(), None);
    }

    #[test]
    fn reports_malformed_line() {
        let mut log = DetectionLog::from_reader(Cursor::new("0:[]\n1:[{\"x\":1}]\n")).unwrap();
        assert!(log.next_detections().unwrap().is_some());

        match log.next_detections() {
            Err(Error::DetectionLog { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {:?}", other.map(|d| d.map(|d| d.len()))),
        }
    }

    #[test]
    fn rejects_bad_fps_header() {
        assert!(DetectionLog::from_reader(Cursor::new("# fps=fast\n")).is_err());
    }

    #[test]
    fn replay_reports_length() {
        let mut replay = Replay::new(vec![vec![], vec![]], None);

        assert_eq!(replay.frame_count(), Some(2));
        assert!(replay.next_detections().unwrap().is_some());
        assert!(replay.next_detections().unwrap().is_some());
        assert!(replay.next_detections().unwrap().is_none());
    }
}
