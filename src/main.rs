mod cli;

use casa::analysis::{Analyzer, VideoRequest};
use casa::config::CasaConfig;
use casa::error::Error;
use casa::report::{ImageReport, Report, VideoReport};
use casa::source::{DetectionLog, DetectionSource, DETECTION_LOG_EXTENSION};
use clap::Parser;
use cli::{CommandLineArguments, MediaType};
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match CommandLineArguments::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    match run(&args) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(err.exit_code());
        }
    }
}

fn run(args: &CommandLineArguments) -> Result<String, Error> {
    if !args.media.is_file() {
        return Err(Error::MediaNotFound(args.media.clone()));
    }

    let config = match &args.config {
        Some(path) => CasaConfig::load(path)?,
        None => CasaConfig::default(),
    };

    let request = VideoRequest {
        duration_seconds: args.duration,
        fps: args.fps,
        microns_per_pixel: args.px2um,
    };
    request.validate()?;

    let analyzer = Analyzer::new(config);

    let report = if is_detection_log(&args.media) {
        let mut source = DetectionLog::open(&args.media)?;
        analyze(args, &analyzer, &request, &mut source)?
    } else {
        analyze_media(args, &analyzer, &request)?
    };

    report.to_json(args.pretty)
}

fn is_detection_log(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext == DETECTION_LOG_EXTENSION)
}

fn analyze(
    args: &CommandLineArguments,
    analyzer: &Analyzer,
    request: &VideoRequest,
    source: &mut dyn DetectionSource,
) -> Result<Report, Error> {
    let media = args.media.display().to_string();
    let limits = &analyzer.config().who;

    Ok(match args.kind {
        MediaType::Video => {
            let analysis = analyzer.analyze_video(source, request)?;

            Report::Video(VideoReport::new(
                args.patient.clone(),
                media,
                analysis.result,
                analysis.mean_confidence,
                limits,
            ))
        }

        MediaType::Image => {
            let confidences: Vec<f32> = analyzer
                .analyze_image(source)?
                .iter()
                .map(|d| d.confidence)
                .collect();

            Report::Image(ImageReport::new(
                args.patient.clone(),
                media,
                &confidences,
                limits,
            ))
        }
    })
}

#[cfg(feature = "video")]
fn analyze_media(
    args: &CommandLineArguments,
    analyzer: &Analyzer,
    request: &VideoRequest,
) -> Result<Report, Error> {
    use casa::decoder::Decoder;
    use casa::detector::YoloDetector;
    use casa::video::{ImageSource, VideoSource};

    let decoder = Decoder::new(analyzer.config().decoder.clone());
    let mut detector = YoloDetector::new(&args.model, decoder.input_size())?;

    match args.kind {
        MediaType::Video => {
            let mut source = VideoSource::open(&args.media, &mut detector, &decoder)?;
            analyze(args, analyzer, request, &mut source)
        }
        MediaType::Image => {
            let mut source = ImageSource::open(&args.media, &mut detector, &decoder)?;
            analyze(args, analyzer, request, &mut source)
        }
    }
}

#[cfg(not(feature = "video"))]
fn analyze_media(
    args: &CommandLineArguments,
    _analyzer: &Analyzer,
    _request: &VideoRequest,
) -> Result<Report, Error> {
    Err(Error::UnsupportedMedia(format!(
        "{}: built without the `video` feature, only .{} detection logs are supported",
        args.media.display(),
        DETECTION_LOG_EXTENSION
    )))
}
