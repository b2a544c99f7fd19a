//! Lunalight - place the light on a moon model for a given date and place.
//!
//! Usage: lunalight [OPTIONS]
//!
//! Options:
//!   --config <PATH>   Scene config JSON (default: built-in defaults)
//!   --date <DATE>     RFC 3339 timestamp or YYYY-MM-DD (default: now)
//!   --lat <DEG>       Observer latitude, overrides the config
//!   --lon <DEG>       Observer longitude, overrides the config
//!   --serve           Serve the control protocol and tick the scene at 60 Hz
//!   --port <N>        Control port (default: from config)
//!   --frames <N>      Frames to tick before printing (or before exiting with --serve)

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use lunalight::asset::AssetLoader;
use lunalight::astro::{parse_timestamp, LowPrecisionEphemeris, ObserverLocation};
use lunalight::core::logging;
use lunalight::core::time::FrameTimer;
use lunalight::core::{Error, Result};
use lunalight::scene::{MoonScene, SceneConfig, SceneController};
use lunalight_control::ControlServer;

const FRAME_STEP: Duration = Duration::from_micros(16_667);

struct Options {
    at: DateTime<Utc>,
    observer: ObserverLocation,
    serve: bool,
    port: u16,
    frames: Option<u64>,
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_arg::<String>(&args, "--config")? {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if let Some(lat) = parse_arg(&args, "--lat")? {
        config.latitude = lat;
    }
    if let Some(lon) = parse_arg(&args, "--lon")? {
        config.longitude = lon;
    }

    let at = match parse_arg::<String>(&args, "--date")? {
        Some(date) => parse_timestamp(&date)?,
        None => Utc::now(),
    };
    let options = Options {
        at,
        observer: config.observer()?,
        serve: args.iter().any(|a| a == "--serve"),
        port: parse_arg(&args, "--port")?.unwrap_or(config.control_port),
        frames: parse_arg(&args, "--frames")?,
    };

    log::info!(
        "Moon for {} at {:.4}, {:.4}",
        options.at,
        options.observer.latitude(),
        options.observer.longitude()
    );

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(run_scene(config, options))
}

async fn run_scene(config: SceneConfig, options: Options) -> Result<()> {
    let mut handle = AssetLoader::load(config.model_path.clone());
    let scene = MoonScene::new(config);
    let mut controller = SceneController::new(scene, LowPrecisionEphemeris, options.at, options.observer);

    // Nothing to light until the model arrives
    controller.refresh()?;
    let asset = handle.wait().await?;
    controller.scene_mut().attach_model(asset);
    controller.refresh()?;

    if !options.serve {
        for _ in 0..options.frames.unwrap_or(0) {
            controller.tick(FRAME_STEP.as_secs_f64());
        }
        println!("{}", serde_json::to_string_pretty(&controller.report())?);
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&controller.report())?);

    let controller = Arc::new(Mutex::new(controller));
    let _server = ControlServer::start(controller.clone(), options.port);

    let mut interval = tokio::time::interval(FRAME_STEP);
    let mut timer = FrameTimer::new();
    loop {
        interval.tick().await;
        timer.tick();
        controller.lock().await.tick(timer.delta_secs() as f64);

        if timer.frame_count() % 600 == 0 {
            log::debug!("{} frames, {:.1} fps", timer.frame_count(), timer.fps());
        }
        if options.frames.is_some_and(|n| timer.frame_count() >= n) {
            break;
        }
    }

    println!("{}", serde_json::to_string_pretty(&controller.lock().await.report())?);
    Ok(())
}

/// Value following `flag`, if the flag is present.
///
/// A flag with no value, or one that does not parse as `T`, is an error
/// rather than silently falling back to the default.
fn parse_arg<T: FromStr>(args: &[String], flag: &str) -> Result<Option<T>> {
    let Some(i) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    let value = args.get(i + 1);
    match value.map(|s| s.parse::<T>()) {
        Some(Ok(v)) => Ok(Some(v)),
        _ => Err(Error::InvalidArgument {
            flag: flag.to_string(),
            value: value.cloned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_absent_flag_is_none() {
        let a = args(&["lunalight", "--serve"]);
        assert_eq!(parse_arg::<f64>(&a, "--lat").unwrap(), None);
        assert_eq!(parse_arg::<u16>(&a, "--port").unwrap(), None);
    }

    #[test]
    fn test_flag_values_parse() {
        let a = args(&["lunalight", "--lat", "-33.9", "--port", "9000", "--frames", "120"]);
        assert_eq!(parse_arg::<f64>(&a, "--lat").unwrap(), Some(-33.9));
        assert_eq!(parse_arg::<u16>(&a, "--port").unwrap(), Some(9000));
        assert_eq!(parse_arg::<u64>(&a, "--frames").unwrap(), Some(120));
    }

    #[test]
    fn test_malformed_value_is_error() {
        let a = args(&["lunalight", "--lat", "abc", "--port", "70000"]);
        let err = parse_arg::<f64>(&a, "--lat").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArgument { ref flag, value: Some(ref v) } if flag == "--lat" && v == "abc"
        ));
        // Out of range for u16
        assert!(parse_arg::<u16>(&a, "--port").is_err());
    }

    #[test]
    fn test_missing_value_is_error() {
        let a = args(&["lunalight", "--frames"]);
        let err = parse_arg::<u64>(&a, "--frames").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { value: None, .. }));
        assert_eq!(err.to_string(), "Invalid value for --frames: None");
    }
}
