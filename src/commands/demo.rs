//! Automated walkthrough: a falling RELIANCE, a rising TCS and a falling INFY

use anyhow::Result;
use stock_tracker::{Config, InstrumentStore};
use tracing::info;

const RELIANCE_PATH: [f64; 12] = [
    2380.0, 2350.0, 2300.0, 2250.0, 2200.0, 2150.0, 2100.0, 2050.0, 2000.0, 1950.0, 1900.0,
    1850.0,
];
const TCS_PATH: [f64; 8] = [3550.0, 3600.0, 3650.0, 3700.0, 3750.0, 3800.0, 3850.0, 3900.0];
const INFY_PATH: [f64; 9] = [
    1480.0, 1450.0, 1400.0, 1350.0, 1300.0, 1250.0, 1200.0, 1150.0, 1100.0,
];

pub fn run() -> Result<()> {
    info!("Running automated walkthrough");
    let mut store = InstrumentStore::from_config(&Config::default());

    store.add_instrument("RELIANCE", 2400.0, 10)?;
    store.add_instrument("TCS", 3500.0, 5)?;
    store.add_instrument("INFY", 1500.0, 20)?;

    for (symbol, path, quantity) in [
        ("RELIANCE", &RELIANCE_PATH[..], 10),
        ("TCS", &TCS_PATH[..], 5),
        ("INFY", &INFY_PATH[..], 20),
    ] {
        for &price in path {
            let outcome = store.update_instrument(symbol, price, quantity)?;
            if outcome.upper_alert_hit || outcome.lower_alert_hit {
                info!("{} crossed an alert at {:.2}", symbol, price);
            }
        }
        info!("{}: applied {} price updates", symbol, path.len());
    }

    if let (Some(gainer), Some(loser)) = (store.top_gainer(), store.top_loser()) {
        println!("\nTop Gainer: {} ({:.2}%)", gainer.symbol, gainer.percent_gain);
        println!("Top Loser:  {} ({:.2}%)", loser.symbol, loser.percent_gain);
    }

    for probe in ["TCS", "XYZ"] {
        let found = if store.contains_symbol(probe) { "FOUND" } else { "NOT FOUND" };
        println!("Search '{}': {}", probe, found);
    }

    crate::commands::print_analysis(&store);

    info!("Walkthrough complete ({} consistent: {})", store.len(), store.is_consistent());
    Ok(())
}
