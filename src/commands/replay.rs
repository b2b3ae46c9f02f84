//! CSV tick replay

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use stock_tracker::{Config, InstrumentStore};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct TickRow {
    symbol: String,
    price: f64,
    #[serde(default)]
    quantity: i64,
}

pub fn run(file: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;
    let mut store = InstrumentStore::from_config(&config);

    info!("Replaying ticks from: {}", file.display());
    let mut reader = csv::Reader::from_path(&file)
        .with_context(|| format!("Failed to open CSV file: {}", file.display()))?;

    let mut applied = 0usize;
    let mut rejected = 0usize;
    for (row_idx, result) in reader.deserialize::<TickRow>().enumerate() {
        let row = result.context(format!("Failed to read row {}", row_idx + 1))?;

        // First sighting registers the instrument, later rows move its price
        let outcome = if store.id_of(&row.symbol).is_some() {
            store
                .update_instrument(&row.symbol, row.price, row.quantity)
                .map(|o| debug!("{} {:.2} -> {:.2}", o.symbol, o.previous_price, o.new_price))
        } else {
            store
                .add_instrument(&row.symbol, row.price, row.quantity)
                .map(|_| debug!("Registered {} at {:.2}", row.symbol, row.price))
        };

        match outcome {
            Ok(()) => applied += 1,
            Err(e) => {
                warn!("Row {} skipped: {}", row_idx + 1, e);
                rejected += 1;
            }
        }
    }

    info!(
        "Replay finished: {} rows applied, {} rejected, {} instruments",
        applied,
        rejected,
        store.len()
    );
    debug!("{:?}", store);
    crate::commands::print_analysis(&store);

    Ok(())
}
