#![warn(missing_docs)]
//! # photobooth-app binary
//!
//! Headless demo: fills a strip from the synthetic camera, retakes the middle
//! photo and writes the exported PNG.

use std::fs;
use std::path::PathBuf;

use log::info;
use photobooth_app::{BoothConfig, BoothError, Photobooth, app_version};
use photobooth_capture::SyntheticCamera;
use photobooth_core::SlotIndex;
use photobooth_frames::FrameLibrary;
use time::OffsetDateTime;

/// CLI entry point.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(path) => println!("{}", path.display()),
        Err(error) => {
            eprintln!("photobooth demo failed: {error}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<PathBuf, DemoError> {
    info!("photobooth-app {}", app_version());

    let config = BoothConfig::from_env();
    let mut booth = Photobooth::new(config, SyntheticCamera::default(), FrameLibrary::new())?;

    for _ in 0..config.slot_count {
        booth.capture(OffsetDateTime::now_utc())?;
    }

    let middle = SlotIndex::new(config.slot_count / 2);
    booth.begin_retake(middle)?;
    booth.capture(OffsetDateTime::now_utc())?;

    let exported = booth.export_collage(OffsetDateTime::now_utc())?;
    let output_dir = std::env::var_os("PHOTOBOOTH_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let path = output_dir.join(&exported.suggested_filename);

    let png = exported.bitmap.to_png().map_err(|error| DemoError::Encode(error.to_string()))?;
    fs::write(&path, png).map_err(|source| DemoError::Write {
        path: path.clone(),
        source,
    })?;
    info!(
        "strip written ({}x{}, gallery holds {})",
        exported.bitmap.width(),
        exported.bitmap.height(),
        booth.gallery().len()
    );
    Ok(path)
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Booth(#[from] BoothError),
    #[error("png encode failed: {0}")]
    Encode(String),
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    //! Unit tests for demo error rendering.

    use super::*;

    #[test]
    fn write_error_names_the_path_and_cause() {
        let error = DemoError::Write {
            path: PathBuf::from("out/strip.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(error.to_string(), "cannot write out/strip.png: denied");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn booth_errors_pass_through_unchanged() {
        let error = DemoError::from(BoothError::NothingToExport);
        assert_eq!(error.to_string(), BoothError::NothingToExport.to_string());
    }
}
