use std::process::ExitCode;

use anyhow::Context;
use mandel_engine::logging::{init_logging, LoggingConfig};
use mandel_engine::window::{Shell, WinitPlatform};
use mandel_viewer::{Viewer, ViewerConfig};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = ViewerConfig::default();
    let size = config.size;

    let mut shell = Shell::new(Viewer::new(config), WinitPlatform::default());
    shell
        .init(size.x, size.y)
        .context("failed to start the viewer")?;
    shell.run()
}
