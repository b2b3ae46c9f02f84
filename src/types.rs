//! Core data types shared by the store, its indices and the command layer

use serde::{Deserialize, Serialize};

use crate::heaps::{HeapKind, HeapMember};
use crate::window::PriceWindow;

/// RSI reported when the window holds too little history
pub const NEUTRAL_RSI: f64 = 50.0;

/// Ticker symbol using Arc<str> for cheap cloning
///
/// Symbols are shared between the arena, the symbol index, the ordered index
/// and the prefix trie. Using Arc<str> keeps each of those an O(1) clone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(#[serde(with = "arc_str_serde")] std::sync::Arc<str>);

/// Custom serde for Arc<str>
mod arc_str_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::sync::Arc;

    pub fn serialize<S>(value: &Arc<str>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Arc<str>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Arc::from(s.as_str()))
    }
}

impl Symbol {
    pub fn new(s: impl AsRef<str>) -> Self {
        Symbol(std::sync::Arc::from(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of an instrument: its slot in the store arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(pub usize);

impl InstrumentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A tracked instrument and its trailing price window
///
/// Owned exclusively by the store arena. Every index refers to it by
/// [`InstrumentId`], never by reference.
#[derive(Debug, Clone)]
pub struct Instrument {
    pub symbol: Symbol,
    pub current_price: f64,
    /// Entry price the percent gain is measured against
    pub reference_price: f64,
    pub quantity: i64,
    pub upper_alert: f64,
    pub lower_alert: f64,
    pub(crate) window: PriceWindow,
    pub(crate) max_heap_slot: usize,
    pub(crate) min_heap_slot: usize,
}

impl Instrument {
    pub(crate) fn new(
        symbol: Symbol,
        reference_price: f64,
        quantity: i64,
        alert_band: f64,
        window: PriceWindow,
    ) -> Self {
        Self {
            symbol,
            current_price: reference_price,
            reference_price,
            quantity,
            upper_alert: reference_price * (1.0 + alert_band),
            lower_alert: reference_price * (1.0 - alert_band),
            window,
            max_heap_slot: 0,
            min_heap_slot: 0,
        }
    }

    /// Percent change of the current price over the reference price.
    /// Zero when the reference price is zero.
    pub fn percent_gain(&self) -> f64 {
        if self.reference_price == 0.0 {
            return 0.0;
        }
        (self.current_price - self.reference_price) / self.reference_price * 100.0
    }

    /// Simple moving average over the last `period` samples, falling back to
    /// the current price when the window is empty
    pub fn sma(&self, period: usize) -> f64 {
        self.window.sma(period).unwrap_or(self.current_price)
    }

    /// RSI over the last `period` changes, or [`NEUTRAL_RSI`] while the window
    /// holds fewer than `period + 1` samples
    pub fn rsi(&self, period: usize) -> f64 {
        self.window.rsi(period).unwrap_or(NEUTRAL_RSI)
    }

    pub fn window(&self) -> &PriceWindow {
        &self.window
    }

    /// Market value of the position at the current price
    pub fn market_value(&self) -> f64 {
        self.current_price * self.quantity as f64
    }

    /// Cost of the position at the reference price
    pub fn cost_basis(&self) -> f64 {
        self.reference_price * self.quantity as f64
    }
}

impl HeapMember for Instrument {
    fn heap_key(&self) -> f64 {
        self.percent_gain()
    }

    fn heap_slot(&self, kind: HeapKind) -> usize {
        match kind {
            HeapKind::Max => self.max_heap_slot,
            HeapKind::Min => self.min_heap_slot,
        }
    }

    fn set_heap_slot(&mut self, kind: HeapKind, slot: usize) {
        match kind {
            HeapKind::Max => self.max_heap_slot = slot,
            HeapKind::Min => self.min_heap_slot = slot,
        }
    }
}

/// Point-in-time view of one instrument with its indicators computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentView {
    #[serde(rename = "name")]
    pub symbol: Symbol,
    #[serde(rename = "buyPrice")]
    pub reference_price: f64,
    pub current_price: f64,
    pub quantity: i64,
    pub percent_gain: f64,
    pub sma: f64,
    pub rsi: f64,
    pub upper_alert: f64,
    pub lower_alert: f64,
}

/// Result of a successful price update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub symbol: Symbol,
    pub previous_price: f64,
    pub new_price: f64,
    /// Realized price change, `new_price - previous_price`
    pub change: f64,
    pub quantity: i64,
    pub upper_alert_hit: bool,
    pub lower_alert_hit: bool,
}

/// Trading signal derived from RSI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    /// BUY below `oversold`, SELL above `overbought`, HOLD otherwise
    pub fn from_rsi(rsi: f64, oversold: f64, overbought: f64) -> Self {
        if rsi < oversold {
            Recommendation::Buy
        } else if rsi > overbought {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }

    pub fn confidence(self) -> Confidence {
        match self {
            Recommendation::Buy | Recommendation::Sell => Confidence::High,
            Recommendation::Hold => Confidence::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Sell => "SELL",
            Recommendation::Hold => "HOLD",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
}

/// Indicator readout for a single instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReport {
    #[serde(rename = "name")]
    pub symbol: Symbol,
    pub sma: f64,
    pub rsi: f64,
    pub recommendation: Recommendation,
    pub confidence: Confidence,
}

/// Aggregate position value across all instruments
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_investment: f64,
    pub current_value: f64,
    pub profit: f64,
    #[serde(rename = "stockCount")]
    pub instrument_count: usize,
}
