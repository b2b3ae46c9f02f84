//! Line protocol over stdin/stdout

use anyhow::Result;
use std::io;
use std::path::PathBuf;
use stock_tracker::api::Dispatcher;
use stock_tracker::Config;
use tracing::info;

pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;
    match &config_path {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => info!("Using default configuration"),
    }
    info!(
        "Capacity {} instruments, window {} samples, eviction {:?}",
        config.store.max_instruments, config.store.window_capacity, config.store.eviction
    );

    let mut dispatcher = Dispatcher::from_config(&config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    dispatcher.serve(stdin.lock(), stdout.lock())?;

    Ok(())
}
