use std::process::ExitCode;

use engine::run_app;
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        scene,
        assets,
        audio,
    } = app;

    let result = run_app(config, scene, assets);
    info!(audio_available = audio.is_available(), "audio_released");
    drop(audio);

    if let Err(err) = result {
        error!(error = %err, "app_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
