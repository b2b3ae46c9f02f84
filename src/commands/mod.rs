pub mod api;
pub mod demo;
pub mod replay;

use itertools::Itertools;
use stock_tracker::InstrumentStore;

/// Indicator table followed by the oversold clusters
pub fn print_analysis(store: &InstrumentStore) {
    let indicators = store.indicator_config();

    println!("\n{}", "=".repeat(72));
    println!("TECHNICAL ANALYSIS");
    println!("{}", "=".repeat(72));
    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>8}  {}",
        "Symbol",
        "Price",
        format!("SMA({})", indicators.sma_period),
        format!("RSI({})", indicators.rsi_period),
        "Gain%",
        "Signal"
    );
    println!("{}", "-".repeat(72));

    for view in store.list_by_name() {
        let signal = stock_tracker::Recommendation::from_rsi(
            view.rsi,
            indicators.oversold,
            indicators.overbought,
        );
        println!(
            "{:<20} {:>10.2} {:>10.2} {:>10.2} {:>8.2}  {}",
            view.symbol, view.current_price, view.sma, view.rsi, view.percent_gain, signal
        );
    }

    let summary = store.summary();
    println!("{}", "-".repeat(72));
    println!("Instruments:        {}", summary.instrument_count);
    println!("Total Investment:   ₹{:.2}", summary.total_investment);
    println!("Current Value:      ₹{:.2}", summary.current_value);
    println!("Profit:             ₹{:.2}", summary.profit);

    let snapshot = store.risk_snapshot();
    let oversold = snapshot.oversold_symbols();
    if !oversold.is_empty() {
        println!("\nOversold: {}", oversold.iter().join(", "));
    }

    println!("\nRisk clusters (RSI < {}):", indicators.oversold);
    let clusters = snapshot.clusters();
    if clusters.is_empty() {
        println!("  None detected.");
    }
    for cluster in clusters {
        println!("  Cluster: {}", cluster.iter().join(", "));
    }
    println!("{}", "=".repeat(72));
}
