//! Integration tests for the stock tracker
//!
//! These tests drive the public store and dispatcher APIs end to end.

use approx::assert_relative_eq;
use proptest::prelude::*;
use serde_json::json;
use ta::indicators::SimpleMovingAverage;
use ta::Next;

use stock_tracker::api::Dispatcher;
use stock_tracker::config::{IndicatorConfig, StoreConfig};
use stock_tracker::{
    Config, EvictionMode, InstrumentStore, Recommendation, Symbol, TrackerError,
};

// =============================================================================
// Test Utilities
// =============================================================================

const RELIANCE_PATH: [f64; 12] = [
    2380.0, 2350.0, 2300.0, 2250.0, 2200.0, 2150.0, 2100.0, 2050.0, 2000.0, 1950.0, 1900.0,
    1850.0,
];

fn default_store() -> InstrumentStore {
    InstrumentStore::from_config(&Config::default())
}

/// Apply every price in `path` to `symbol`, keeping the quantity
fn drive(store: &mut InstrumentStore, symbol: &str, path: &[f64]) {
    for &price in path {
        store.update_instrument(symbol, price, 0).unwrap();
    }
}

/// Linear path of `steps` prices moving by `step` from `start` (exclusive)
fn linear_path(start: f64, step: f64, steps: usize) -> Vec<f64> {
    (1..=steps).map(|i| start + step * i as f64).collect()
}

/// Store holding RELIANCE after the twelve falling updates
fn falling_reliance_store() -> InstrumentStore {
    let mut store = default_store();
    store.add_instrument("RELIANCE", 2400.0, 10).unwrap();
    drive(&mut store, "RELIANCE", &RELIANCE_PATH);
    store
}

// =============================================================================
// Indicators
// =============================================================================

#[test]
fn test_falling_path_sma_and_neutral_rsi() {
    let store = falling_reliance_store();
    let reliance = store.get("RELIANCE").unwrap();

    assert_eq!(reliance.window().len(), 13);
    assert_relative_eq!(reliance.sma(5), 1950.0, epsilon = 1e-9);
    assert_eq!(reliance.rsi(14), 50.0);

    let report = store.indicators_for("RELIANCE").unwrap();
    assert_eq!(report.recommendation, Recommendation::Hold);
}

#[test]
fn test_two_falling_instruments_cluster() {
    let mut store = falling_reliance_store();
    store.add_instrument("TCS", 3500.0, 5).unwrap();
    store.add_instrument("INFY", 1500.0, 20).unwrap();

    drive(&mut store, "RELIANCE", &[1800.0, 1750.0]);
    drive(&mut store, "TCS", &linear_path(3500.0, 50.0, 15));
    drive(&mut store, "INFY", &linear_path(1500.0, -40.0, 14));

    let reliance = store.get("RELIANCE").unwrap();
    assert_eq!(reliance.window().len(), 15);
    assert!(reliance.rsi(14) < 30.0);
    assert!(store.get("INFY").unwrap().rsi(14) < 30.0);
    assert_eq!(store.get("TCS").unwrap().rsi(14), 100.0);

    let clusters = store.risk_clusters();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0], vec![Symbol::new("RELIANCE"), Symbol::new("INFY")]);

    let report = store.indicators_for("INFY").unwrap();
    assert_eq!(report.recommendation, Recommendation::Buy);
    let report = store.indicators_for("TCS").unwrap();
    assert_eq!(report.recommendation, Recommendation::Sell);
}

#[test]
fn test_rsi_mixed_path_value() {
    let mut store = default_store();
    store.add_instrument("MIX", 100.0, 1).unwrap();
    // Changes over the last 4: +2, -1, +3, -2 -> avg gain 1.25, avg loss 0.75
    drive(&mut store, "MIX", &[100.0, 102.0, 101.0, 104.0, 102.0]);

    let rsi = store.get("MIX").unwrap().rsi(4);
    assert_relative_eq!(rsi, 100.0 - 100.0 / (1.0 + 1.25 / 0.75), epsilon = 1e-9);
}

#[test]
fn test_window_eviction_modes_diverge() {
    let exact = StoreConfig::default().with_window_capacity(4);
    let legacy = exact.clone().with_eviction(EvictionMode::LegacyDrift);

    let mut results = Vec::new();
    for config in [exact, legacy] {
        let mut store = InstrumentStore::new(config);
        store.add_instrument("X", 100.0, 1).unwrap();
        drive(&mut store, "X", &[50.0, 51.0, 52.0, 53.0, 54.0]);
        results.push(store.get("X").unwrap().rsi(3));
    }

    // The last three changes are all gains once the drop has been evicted
    assert_eq!(results[0], 100.0);
    assert!(results[1] < 100.0);
}

#[test]
fn test_sma_matches_ta_oracle() {
    let period = 5;
    let mut store = InstrumentStore::new(StoreConfig::default().with_window_capacity(8))
        .with_indicators(IndicatorConfig {
            sma_period: period,
            ..IndicatorConfig::default()
        });
    let mut oracle = SimpleMovingAverage::new(period).unwrap();

    store.add_instrument("ORCL", 120.0, 1).unwrap();
    oracle.next(120.0);

    let path = [121.5, 119.0, 125.25, 130.0, 128.0, 90.0, 95.5, 101.0, 99.0, 140.0, 150.0];
    for &price in &path {
        store.update_instrument("ORCL", price, 0).unwrap();
        let expected = oracle.next(price);
        let actual = store.get("ORCL").unwrap().sma(period);
        assert_relative_eq!(actual, expected, epsilon = 1e-9);
    }
}

// =============================================================================
// Store Boundaries
// =============================================================================

#[test]
fn test_capacity_ceiling_leaves_store_untouched() {
    let mut store = InstrumentStore::new(StoreConfig::default().with_max_instruments(3));
    for name in ["A", "B", "C"] {
        store.add_instrument(name, 10.0, 1).unwrap();
    }
    let before = store.list_by_name();

    let err = store.add_instrument("D", 10.0, 1).unwrap_err();
    assert_eq!(err, TrackerError::CapacityExceeded { capacity: 3 });
    assert_eq!(store.list_by_name(), before);
    assert!(store.search("D").is_empty());
    assert!(store.is_consistent());
}

#[test]
fn test_queries_are_idempotent() {
    let mut store = falling_reliance_store();
    store.add_instrument("TCS", 3500.0, 5).unwrap();

    let first = (
        store.list_by_name(),
        store.top_gainer(),
        store.top_loser(),
        store.risk_clusters(),
        store.summary(),
    );
    let second = (
        store.list_by_name(),
        store.top_gainer(),
        store.top_loser(),
        store.risk_clusters(),
        store.summary(),
    );
    assert_eq!(first, second);
}

#[test]
fn test_window_wraps_past_capacity() {
    let mut store = InstrumentStore::new(StoreConfig::default().with_window_capacity(5));
    store.add_instrument("W", 10.0, 1).unwrap();
    drive(&mut store, "W", &linear_path(10.0, 1.0, 12));

    let window = store.get("W").unwrap().window();
    assert_eq!(window.len(), 5);
    assert_eq!(window.samples(), vec![18.0, 19.0, 20.0, 21.0, 22.0]);
    assert_relative_eq!(store.get("W").unwrap().sma(5), 20.0, epsilon = 1e-9);
    assert_relative_eq!(store.get("W").unwrap().sma(100), 20.0, epsilon = 1e-9);
}

// =============================================================================
// Dispatcher
// =============================================================================

#[test]
fn test_dispatcher_session() {
    let mut api = Dispatcher::from_config(&Config::default());
    let script = [
        "ADD RELIANCE 2400 10",
        "ADD TCS 3500 5",
        "UPDATE TCS 3600",
        "UPDATE RELIANCE 2300 12",
    ];
    for line in script {
        let reply = api.handle_line(line).unwrap();
        assert_eq!(reply["status"], "ok", "{} -> {}", line, reply);
    }

    let top = api.handle_line("TOP").unwrap();
    assert_eq!(top["topGainer"]["name"], "TCS");
    assert_eq!(top["topLoser"]["name"], "RELIANCE");
    assert_eq!(top["topLoser"]["quantity"], 12);

    assert_eq!(api.handle_line("RISK").unwrap(), json!({ "clusters": [] }));
    assert_eq!(api.handle_line("SEARCH RE").unwrap(), json!(["RELIANCE"]));

    let err = api.handle_line("UPDATE WIPRO 400").unwrap();
    assert_eq!(err["error"], "symbol WIPRO not found");
    assert!(api.store().is_consistent());
}

// =============================================================================
// Properties
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Add(usize, f64),
    Update(usize, f64),
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1u32..100_000u32).prop_map(|cents| cents as f64 / 100.0)
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..12, arb_price()).prop_map(|(i, p)| Op::Add(i, p)),
        (0usize..12, arb_price()).prop_map(|(i, p)| Op::Update(i, p)),
    ]
}

fn symbol_for(i: usize) -> String {
    format!("SYM{:02}", (i * 7) % 12)
}

proptest! {
    #[test]
    fn prop_heap_roots_track_extreme_gains(ops in prop::collection::vec(arb_op(), 1..80)) {
        let mut store = InstrumentStore::new(StoreConfig::default().with_max_instruments(8));
        for op in ops {
            let _ = match op {
                Op::Add(i, p) => store.add_instrument(&symbol_for(i), p, 1).map(|_| ()),
                Op::Update(i, p) => store.update_instrument(&symbol_for(i), p, 0).map(|_| ()),
            };
        }
        prop_assert!(store.len() <= 8);
        prop_assert!(store.is_consistent());

        let gains: Vec<f64> = store.instruments().iter().map(|i| i.percent_gain()).collect();
        if let (Some(top), Some(bottom)) = (store.top_gainer(), store.top_loser()) {
            let max = gains.iter().cloned().fold(f64::MIN, f64::max);
            let min = gains.iter().cloned().fold(f64::MAX, f64::min);
            prop_assert_eq!(top.percent_gain, max);
            prop_assert_eq!(bottom.percent_gain, min);
        } else {
            prop_assert!(store.is_empty());
        }
    }

    #[test]
    fn prop_listing_is_strictly_ascending(names in prop::collection::vec("[A-Z]{1,6}", 1..40)) {
        let mut store = default_store();
        for name in &names {
            let _ = store.add_instrument(name, 10.0, 1);
        }
        let listing = store.list_by_name();
        prop_assert_eq!(listing.len(), store.len());
        for pair in listing.windows(2) {
            prop_assert!(pair[0].symbol < pair[1].symbol);
        }
    }

    #[test]
    fn prop_flat_tail_never_reads_oversold(
        walk in prop::collection::vec(arb_price(), 1..260),
    ) {
        let mut store = default_store();
        store.add_instrument("FLAT", walk[0], 1).unwrap();
        drive(&mut store, "FLAT", &walk[1..]);
        let last = walk[walk.len() - 1];
        drive(&mut store, "FLAT", &[last; 14]);

        let report = store.indicators_for("FLAT").unwrap();
        prop_assert_eq!(report.rsi, 100.0);
        prop_assert_eq!(report.recommendation, Recommendation::Sell);
    }

    #[test]
    fn prop_sma_is_mean_of_trailing_samples(
        path in prop::collection::vec(arb_price(), 1..60),
        capacity in 1usize..20,
        period in 1usize..25,
    ) {
        let mut store = InstrumentStore::new(StoreConfig::default().with_window_capacity(capacity));
        store.add_instrument("P", path[0], 1).unwrap();
        drive(&mut store, "P", &path[1..]);

        let samples = store.get("P").unwrap().window().samples();
        let take = period.min(samples.len());
        let tail = &samples[samples.len() - take..];
        let expected = tail.iter().sum::<f64>() / take as f64;

        let actual = store.get("P").unwrap().sma(period);
        prop_assert!((actual - expected).abs() <= 1e-6 * expected.abs().max(1.0));
        prop_assert!(store.get("P").unwrap().rsi(period) >= 0.0);
        prop_assert!(store.get("P").unwrap().rsi(period) <= 100.0);
    }
}
