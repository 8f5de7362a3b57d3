//! Command line entry point: `driftboard-replay <scene.json>`.
//!
//! Prints the replay report as pretty JSON on stdout. Set `RUST_LOG=debug`
//! to trace every event.

use driftboard_replay::{Scene, replay};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("usage: driftboard-replay <scene.json>");
        return ExitCode::from(2);
    };

    let scene = match Scene::load(&path) {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("{}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("Loaded {} entities from {}", scene.entities.len(), path.display());

    let report = replay(&scene);
    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize report: {}", e);
            ExitCode::FAILURE
        }
    }
}
