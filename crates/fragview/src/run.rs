use std::time::Duration;

use anyhow::Result;
use renderer::{Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::defaults;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    defaults::install_missing(&cli.shaders)?;

    let config = RendererConfig {
        surface_size: cli.size,
        vertex_source: cli.shaders.join(defaults::VERTEX_FILE),
        fragment_source: cli.shaders.join(defaults::FRAGMENT_FILE),
        poll_interval: Duration::from_millis(cli.poll_ms.max(1)),
    };

    tracing::info!(
        fragment = %config.fragment_source.display(),
        width = config.surface_size.0,
        height = config.surface_size.1,
        "starting shader preview"
    );

    Renderer::new(config).run()
}
