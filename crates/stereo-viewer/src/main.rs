mod app;

use std::process::ExitCode;

use stereo_engine::device::GpuInit;
use stereo_engine::logging::{init_logging, LoggingConfig};
use stereo_engine::stereo::StereoConfig;
use stereo_engine::window::{Runtime, RuntimeConfig};

use crate::app::StereoApp;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let app = StereoApp::new(StereoConfig::default());

    match Runtime::run(RuntimeConfig::default(), GpuInit::default(), app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("stereo viewer error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
