use crate::decoder::Decoder;
use crate::detection::Detection;
use crate::detector::{self, Detector};
use crate::error::Error;
use crate::source::DetectionSource;

use ndarray::prelude::*;
use opencv::{
    core::{self, Mat},
    dnn, imgcodecs,
    prelude::*,
    videoio,
};
use std::path::Path;

fn detect_mat<D: Detector + ?Sized>(
    detector: &mut D,
    decoder: &Decoder,
    frame: &Mat,
) -> Result<Vec<Detection>, Error> {
    let fsize = frame.size()?;
    let (w, h) = detector.input_size();

    let blob = dnn::blob_from_image(
        frame,
        1.0 / 255.0,
        core::Size::new(w as _, h as _),
        core::Scalar::default(),
        true,
        false,
        core::CV_32F,
    )?;

    let data = blob.data_typed::<f32>()?;
    let input = ArrayView4::from_shape((1, 3, h as usize, w as usize), data)
        .map_err(|e| Error::Model(format!("bad input blob: {}", e)))?;

    detector::detect(
        detector,
        decoder,
        input,
        (fsize.width as u32, fsize.height as u32),
    )
}

fn path_str(path: &Path) -> Result<&str, Error> {
    path.to_str()
        .ok_or_else(|| Error::UnsupportedMedia(path.display().to_string()))
}

/// Frames of a video file run through a detector.
pub struct VideoSource<'a, D: Detector> {
    cam: videoio::VideoCapture,
    detector: &'a mut D,
    decoder: &'a Decoder,
    fps: Option<f64>,
    frame_count: Option<usize>,
}

impl<'a, D: Detector> VideoSource<'a, D> {
    pub fn open<P: AsRef<Path>>(
        path: P,
        detector: &'a mut D,
        decoder: &'a Decoder,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        let cam = videoio::VideoCapture::from_file(path_str(path)?, videoio::CAP_ANY)?;

        if !videoio::VideoCapture::is_opened(&cam)? {
            return Err(Error::UnsupportedMedia(format!(
                "unable to open video {}",
                path.display()
            )));
        }

        let fps = cam.get(videoio::CAP_PROP_FPS)?;
        let frame_count = cam.get(videoio::CAP_PROP_FRAME_COUNT)?;

        log::info!(
            "opened {}: {}x{} at {} fps, {} frames",
            path.display(),
            cam.get(videoio::CAP_PROP_FRAME_WIDTH)?,
            cam.get(videoio::CAP_PROP_FRAME_HEIGHT)?,
            fps,
            frame_count
        );

        Ok(Self {
            cam,
            detector,
            decoder,
            fps: Some(fps).filter(|fps| *fps > 0.0),
            frame_count: Some(frame_count as usize).filter(|&n| n > 0),
        })
    }
}

impl<'a, D: Detector> DetectionSource for VideoSource<'a, D> {
    fn fps(&self) -> Option<f64> {
        self.fps
    }

    fn frame_count(&self) -> Option<usize> {
        self.frame_count
    }

    fn next_detections(&mut self) -> Result<Option<Vec<Detection>>, Error> {
        let mut frame = Mat::default();
        if !self.cam.read(&mut frame)? || frame.rows() == 0 || frame.cols() == 0 {
            return Ok(None);
        }

        detect_mat(&mut *self.detector, self.decoder, &frame).map(Some)
    }
}

impl<'a, D: Detector> Drop for VideoSource<'a, D> {
    fn drop(&mut self) {
        if let Err(err) = self.cam.release() {
            log::warn!("failed to release capture: {}", err);
        }
    }
}

/// A single still image run through a detector.
pub struct ImageSource<'a, D: Detector> {
    image: Option<Mat>,
    detector: &'a mut D,
    decoder: &'a Decoder,
}

impl<'a, D: Detector> ImageSource<'a, D> {
    pub fn open<P: AsRef<Path>>(
        path: P,
        detector: &'a mut D,
        decoder: &'a Decoder,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        let image = imgcodecs::imread(path_str(path)?, imgcodecs::IMREAD_COLOR)?;

        if image.rows() == 0 || image.cols() == 0 {
            return Err(Error::UnsupportedMedia(format!(
                "unable to decode image {}",
                path.display()
            )));
        }

        Ok(Self {
            image: Some(image),
            detector,
            decoder,
        })
    }
}

impl<'a, D: Detector> DetectionSource for ImageSource<'a, D> {
    fn frame_count(&self) -> Option<usize> {
        Some(1)
    }

    fn next_detections(&mut self) -> Result<Option<Vec<Detection>>, Error> {
        match self.image.take() {
            Some(image) => detect_mat(&mut *self.detector, self.decoder, &image).map(Some),
            None => Ok(None),
        }
    }
}
