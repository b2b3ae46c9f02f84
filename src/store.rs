//! Instrument store
//!
//! Owns the instrument arena and keeps the symbol index, the name-ordered
//! index, both gain heaps and the prefix trie in step with it. Every mutation
//! validates first and only then touches the structures, so a rejected call
//! leaves all of them unchanged.

use crate::config::{Config, IndicatorConfig, StoreConfig};
use crate::error::{TrackerError, TrackerResult};
use crate::heaps::GainHeaps;
use crate::journal::{MemoryJournal, Transaction, TransactionKind, TransactionLog};
use crate::ordered::OrderedIndex;
use crate::risk::RiskSnapshot;
use crate::symbol_index::SymbolIndex;
use crate::trie::SymbolTrie;
use crate::window::PriceWindow;
use crate::{
    IndicatorReport, Instrument, InstrumentId, InstrumentView, PortfolioSummary, Recommendation,
    Symbol, UpdateOutcome,
};

/// Longest accepted symbol
pub const MAX_SYMBOL_LEN: usize = 19;

pub struct InstrumentStore {
    config: StoreConfig,
    indicators: IndicatorConfig,
    instruments: Vec<Instrument>,
    symbols: SymbolIndex,
    ordered: OrderedIndex,
    heaps: GainHeaps,
    trie: SymbolTrie,
    journal: Box<dyn TransactionLog>,
}

impl std::fmt::Debug for InstrumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstrumentStore")
            .field("config", &self.config)
            .field("instruments", &self.instruments.len())
            .field("longest_chain", &self.symbols.max_chain())
            .field("journal", &self.journal.len())
            .finish()
    }
}

impl Default for InstrumentStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl InstrumentStore {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_journal(config, Box::new(MemoryJournal::new()))
    }

    pub fn with_journal(config: StoreConfig, journal: Box<dyn TransactionLog>) -> Self {
        Self {
            instruments: Vec::with_capacity(config.max_instruments),
            symbols: SymbolIndex::new(config.hash_buckets),
            ordered: OrderedIndex::with_capacity(config.max_instruments),
            heaps: GainHeaps::with_capacity(config.max_instruments),
            trie: SymbolTrie::new(),
            indicators: IndicatorConfig::default(),
            config,
            journal,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.store.clone()).with_indicators(config.indicators.clone())
    }

    pub fn with_indicators(mut self, indicators: IndicatorConfig) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn indicator_config(&self) -> &IndicatorConfig {
        &self.indicators
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.max_instruments
    }

    /// Instruments in registration order
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn id_of(&self, symbol: &str) -> Option<InstrumentId> {
        self.symbols.get(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.id_of(symbol).map(|id| &self.instruments[id.index()])
    }

    pub fn instrument(&self, id: InstrumentId) -> Option<&Instrument> {
        self.instruments.get(id.index())
    }

    fn lookup(&self, symbol: &str) -> TrackerResult<InstrumentId> {
        self.id_of(symbol)
            .ok_or_else(|| TrackerError::SymbolNotFound(symbol.to_string()))
    }

    /// Register a new instrument seeded with one sample at `reference_price`
    pub fn add_instrument(
        &mut self,
        symbol: &str,
        reference_price: f64,
        quantity: i64,
    ) -> TrackerResult<InstrumentId> {
        validate_symbol(symbol)?;
        validate_price(symbol, reference_price)?;
        if self.instruments.len() >= self.config.max_instruments {
            return Err(TrackerError::CapacityExceeded {
                capacity: self.config.max_instruments,
            });
        }
        if let Some(existing) = self.get(symbol) {
            return Err(TrackerError::DuplicateSymbol(existing.symbol.clone()));
        }

        let symbol = Symbol::new(symbol);
        let id = InstrumentId(self.instruments.len());
        let window = PriceWindow::seeded(
            self.config.window_capacity,
            self.config.eviction,
            reference_price,
        );
        self.instruments.push(Instrument::new(
            symbol.clone(),
            reference_price,
            quantity,
            self.config.alert_band,
            window,
        ));

        self.symbols.insert(symbol.clone(), id);
        self.ordered.insert(symbol.clone(), id);
        self.heaps.insert(id, &mut self.instruments);
        self.trie.insert(&symbol);
        self.journal.record(Transaction::new(
            TransactionKind::Init,
            symbol,
            reference_price,
            quantity,
        ));

        Ok(id)
    }

    /// Apply a new price; a positive `new_quantity` also replaces the quantity
    pub fn update_instrument(
        &mut self,
        symbol: &str,
        new_price: f64,
        new_quantity: i64,
    ) -> TrackerResult<UpdateOutcome> {
        let id = self.lookup(symbol)?;
        validate_price(symbol, new_price)?;

        let instrument = &mut self.instruments[id.index()];
        let previous_price = instrument.current_price;
        instrument.window.append(previous_price, new_price);
        instrument.current_price = new_price;
        if new_quantity > 0 {
            instrument.quantity = new_quantity;
        }

        let outcome = UpdateOutcome {
            symbol: instrument.symbol.clone(),
            previous_price,
            new_price,
            change: new_price - previous_price,
            quantity: instrument.quantity,
            upper_alert_hit: new_price >= instrument.upper_alert,
            lower_alert_hit: new_price <= instrument.lower_alert,
        };

        self.heaps.reheapify(id, &mut self.instruments);
        self.journal.record(Transaction::new(
            TransactionKind::Update,
            outcome.symbol.clone(),
            new_price,
            outcome.quantity,
        ));

        Ok(outcome)
    }

    /// Snapshot of one instrument with the configured SMA and RSI periods
    pub fn view(&self, id: InstrumentId) -> Option<InstrumentView> {
        let instrument = self.instrument(id)?;
        Some(InstrumentView {
            symbol: instrument.symbol.clone(),
            reference_price: instrument.reference_price,
            current_price: instrument.current_price,
            quantity: instrument.quantity,
            percent_gain: instrument.percent_gain(),
            sma: instrument.sma(self.indicators.sma_period),
            rsi: instrument.rsi(self.indicators.rsi_period),
            upper_alert: instrument.upper_alert,
            lower_alert: instrument.lower_alert,
        })
    }

    /// Every instrument in ascending symbol order
    pub fn list_by_name(&self) -> Vec<InstrumentView> {
        self.ordered
            .in_order()
            .into_iter()
            .filter_map(|id| self.view(id))
            .collect()
    }

    /// Instrument with the greatest percent gain
    pub fn top_gainer(&self) -> Option<InstrumentView> {
        self.heaps.peek_max().and_then(|id| self.view(id))
    }

    /// Instrument with the smallest percent gain
    pub fn top_loser(&self) -> Option<InstrumentView> {
        self.heaps.peek_min().and_then(|id| self.view(id))
    }

    pub fn indicators_for(&self, symbol: &str) -> TrackerResult<IndicatorReport> {
        let id = self.lookup(symbol)?;
        let instrument = &self.instruments[id.index()];
        let rsi = instrument.rsi(self.indicators.rsi_period);
        let recommendation =
            Recommendation::from_rsi(rsi, self.indicators.oversold, self.indicators.overbought);

        Ok(IndicatorReport {
            symbol: instrument.symbol.clone(),
            sma: instrument.sma(self.indicators.sma_period),
            rsi,
            recommendation,
            confidence: recommendation.confidence(),
        })
    }

    /// Fresh oversold snapshot over every instrument
    pub fn risk_snapshot(&self) -> RiskSnapshot {
        RiskSnapshot::capture(
            &self.instruments,
            self.indicators.rsi_period,
            self.indicators.oversold,
        )
    }

    /// Groups of instruments that are oversold at the same time
    pub fn risk_clusters(&self) -> Vec<Vec<Symbol>> {
        self.risk_snapshot().clusters()
    }

    pub fn summary(&self) -> PortfolioSummary {
        let total_investment: f64 = self.instruments.iter().map(Instrument::cost_basis).sum();
        let current_value: f64 = self.instruments.iter().map(Instrument::market_value).sum();
        PortfolioSummary {
            total_investment,
            current_value,
            profit: current_value - total_investment,
            instrument_count: self.instruments.len(),
        }
    }

    /// Up to `limit` journal entries, newest first
    pub fn transactions(&self, limit: usize) -> Vec<Transaction> {
        self.journal.recent(limit)
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.trie.contains(symbol)
    }

    /// Registered symbols starting with `prefix`, ascending
    pub fn search(&self, prefix: &str) -> Vec<Symbol> {
        self.trie.with_prefix(prefix)
    }

    /// Cross-structure invariant check: every index covers the same
    /// instruments and both heaps are ordered with correct back-references
    pub fn is_consistent(&self) -> bool {
        let n = self.instruments.len();
        self.symbols.len() == n
            && self.ordered.len() == n
            && self.heaps.len() == n
            && self.ordered.is_balanced()
            && self.heaps.is_consistent(&self.instruments)
            && self
                .instruments
                .iter()
                .enumerate()
                .all(|(i, inst)| {
                    let id = Some(InstrumentId(i));
                    self.symbols.get(inst.symbol.as_str()) == id
                        && self.ordered.get(inst.symbol.as_str()) == id
                })
    }
}

fn validate_symbol(symbol: &str) -> TrackerResult<()> {
    let len = symbol.chars().count();
    if len == 0 || len > MAX_SYMBOL_LEN || symbol.chars().any(char::is_whitespace) {
        return Err(TrackerError::InvalidSymbol(symbol.to_string()));
    }
    Ok(())
}

fn validate_price(symbol: &str, price: f64) -> TrackerResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(TrackerError::InvalidPrice {
            symbol: symbol.to_string(),
            price,
        });
    }
    Ok(())
}
