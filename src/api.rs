//! Line-oriented command protocol
//!
//! One command per input line, one JSON document per response line:
//!
//! ```text
//! STOCKS | SORTED                 name-ordered listing
//! ADD <symbol> <price> <qty>      register an instrument
//! UPDATE <symbol> <price> [qty]   apply a price (and optional quantity)
//! SUMMARY                         portfolio totals
//! TOP                             top gainer and loser
//! TRENDS <symbol>                 SMA, RSI and recommendation
//! TRANSACTIONS                    newest journal entries
//! RISK                            oversold clusters
//! SEARCH <prefix>                 symbols starting with prefix
//! ```
//!
//! Failures are reported as `{"error": "..."}` and never end the session.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::store::InstrumentStore;

/// A parsed protocol command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Stocks,
    Add {
        symbol: String,
        price: f64,
        quantity: i64,
    },
    Update {
        symbol: String,
        price: f64,
        quantity: i64,
    },
    Summary,
    Top,
    Trends {
        symbol: String,
    },
    Transactions,
    Risk,
    Search {
        prefix: String,
    },
}

impl Command {
    /// Parse one non-blank input line
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().ok_or_else(|| anyhow!("Empty command"))?;
        let args: Vec<&str> = parts.collect();

        let command = match verb.to_ascii_uppercase().as_str() {
            "STOCKS" | "SORTED" => Command::Stocks,
            "ADD" => {
                let [symbol, price, quantity] = args.as_slice() else {
                    bail!("Usage: ADD <symbol> <price> <qty>");
                };
                Command::Add {
                    symbol: symbol.to_string(),
                    price: parse_price(price)?,
                    quantity: parse_quantity(quantity)?,
                }
            }
            "UPDATE" => {
                let (symbol, price, quantity) = match args.as_slice() {
                    [symbol, price] => (symbol, price, None),
                    [symbol, price, quantity] => (symbol, price, Some(quantity)),
                    _ => bail!("Usage: UPDATE <symbol> <price> [qty]"),
                };
                Command::Update {
                    symbol: symbol.to_string(),
                    price: parse_price(price)?,
                    quantity: quantity.map(|q| parse_quantity(q)).transpose()?.unwrap_or(0),
                }
            }
            "SUMMARY" => Command::Summary,
            "TOP" => Command::Top,
            "TRENDS" => {
                let [symbol] = args.as_slice() else {
                    bail!("Usage: TRENDS <symbol>");
                };
                Command::Trends {
                    symbol: symbol.to_string(),
                }
            }
            "TRANSACTIONS" => Command::Transactions,
            "RISK" => Command::Risk,
            "SEARCH" => Command::Search {
                prefix: args.first().map(|p| p.to_string()).unwrap_or_default(),
            },
            other => bail!("Unknown command: {}", other),
        };
        Ok(command)
    }
}

fn parse_price(raw: &str) -> Result<f64> {
    raw.parse()
        .with_context(|| format!("Invalid price: {}", raw))
}

fn parse_quantity(raw: &str) -> Result<i64> {
    raw.parse()
        .with_context(|| format!("Invalid quantity: {}", raw))
}

/// Owns a store and answers protocol commands against it
#[derive(Debug)]
pub struct Dispatcher {
    store: InstrumentStore,
    transaction_limit: usize,
}

impl Dispatcher {
    pub fn new(store: InstrumentStore, transaction_limit: usize) -> Self {
        Self {
            store,
            transaction_limit,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            InstrumentStore::from_config(config),
            config.api.transaction_limit,
        )
    }

    pub fn store(&self) -> &InstrumentStore {
        &self.store
    }

    /// Answer one input line. Blank lines produce no response.
    pub fn handle_line(&mut self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        debug!("Command: {}", line);

        let response = Command::parse(line).and_then(|command| self.execute(command));
        Some(match response {
            Ok(value) => value,
            Err(e) => {
                warn!("Command failed: {} ({:#})", line, e);
                json!({ "error": e.to_string() })
            }
        })
    }

    pub fn execute(&mut self, command: Command) -> Result<Value> {
        let value = match command {
            Command::Stocks => serde_json::to_value(self.store.list_by_name())?,
            Command::Add {
                symbol,
                price,
                quantity,
            } => {
                let id = self.store.add_instrument(&symbol, price, quantity)?;
                info!("Added {} at {:.2} x {} (id {})", symbol, price, quantity, id.index());
                json!({ "status": "ok", "message": "Stock Added" })
            }
            Command::Update {
                symbol,
                price,
                quantity,
            } => {
                let outcome = self.store.update_instrument(&symbol, price, quantity)?;
                if outcome.upper_alert_hit {
                    info!("{} reached its upper alert at {:.2}", symbol, price);
                }
                if outcome.lower_alert_hit {
                    info!("{} reached its lower alert at {:.2}", symbol, price);
                }
                json!({
                    "status": "ok",
                    "message": "Price & Qty Updated",
                    "update": outcome,
                })
            }
            Command::Summary => serde_json::to_value(self.store.summary())?,
            Command::Top => json!({
                "topGainer": self.store.top_gainer(),
                "topLoser": self.store.top_loser(),
            }),
            Command::Trends { symbol } => serde_json::to_value(self.store.indicators_for(&symbol)?)?,
            Command::Transactions => {
                serde_json::to_value(self.store.transactions(self.transaction_limit))?
            }
            Command::Risk => json!({ "clusters": self.store.risk_clusters() }),
            Command::Search { prefix } => serde_json::to_value(self.store.search(&prefix))?,
        };
        Ok(value)
    }

    /// Serve until `input` is exhausted, flushing after every response
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<usize> {
        let mut handled = 0;
        for line in input.lines() {
            let line = line.context("Failed to read command line")?;
            if let Some(response) = self.handle_line(&line) {
                writeln!(output, "{}", response).context("Failed to write response")?;
                output.flush()?;
                handled += 1;
            }
        }
        info!("Input closed after {} commands", handled);
        Ok(handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(InstrumentStore::new(StoreConfig::default()), 50)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("STOCKS").unwrap(), Command::Stocks);
        assert_eq!(Command::parse("sorted").unwrap(), Command::Stocks);
        assert_eq!(
            Command::parse("ADD TCS 3500 5").unwrap(),
            Command::Add {
                symbol: "TCS".to_string(),
                price: 3500.0,
                quantity: 5
            }
        );
        assert_eq!(
            Command::parse("UPDATE TCS 3550.5").unwrap(),
            Command::Update {
                symbol: "TCS".to_string(),
                price: 3550.5,
                quantity: 0
            }
        );
        assert_eq!(
            Command::parse("SEARCH").unwrap(),
            Command::Search {
                prefix: String::new()
            }
        );
        assert!(Command::parse("ADD TCS").is_err());
        assert!(Command::parse("ADD TCS abc 5").is_err());
        assert!(Command::parse("FLY").is_err());
    }

    #[test]
    fn test_add_update_trends() {
        let mut api = dispatcher();
        let reply = api.handle_line("ADD TCS 100 5").unwrap();
        assert_eq!(reply["status"], "ok");

        let reply = api.handle_line("UPDATE TCS 111 0").unwrap();
        assert_eq!(reply["update"]["upperAlertHit"], true);
        assert_eq!(reply["update"]["quantity"], 5);

        let reply = api.handle_line("TRENDS TCS").unwrap();
        assert_eq!(reply["name"], "TCS");
        assert_eq!(reply["rsi"], 50.0);
        assert_eq!(reply["recommendation"], "HOLD");
        assert_eq!(reply["confidence"], "MEDIUM");
    }

    #[test]
    fn test_errors_are_reported_not_fatal() {
        let mut api = dispatcher();
        let reply = api.handle_line("TRENDS NOPE").unwrap();
        assert!(reply["error"].as_str().unwrap().contains("not found"));

        api.handle_line("ADD TCS 100 5");
        let reply = api.handle_line("ADD TCS 100 5").unwrap();
        assert!(reply["error"].as_str().unwrap().contains("already exists"));

        let reply = api.handle_line("JUMP").unwrap();
        assert!(reply["error"].as_str().unwrap().contains("Unknown command"));

        assert!(api.handle_line("   ").is_none());
        assert_eq!(api.store().len(), 1);
    }

    #[test]
    fn test_top_when_empty() {
        let mut api = dispatcher();
        let reply = api.handle_line("TOP").unwrap();
        assert!(reply["topGainer"].is_null());
        assert!(reply["topLoser"].is_null());
    }

    #[test]
    fn test_listing_summary_and_transactions() {
        let mut api = dispatcher();
        api.handle_line("ADD TCS 100 2");
        api.handle_line("ADD INFY 50 4");
        api.handle_line("UPDATE INFY 60");

        let listing = api.handle_line("STOCKS").unwrap();
        let names: Vec<&str> = listing
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["INFY", "TCS"]);

        let summary = api.handle_line("SUMMARY").unwrap();
        assert_eq!(summary["totalInvestment"], 400.0);
        assert_eq!(summary["currentValue"], 440.0);
        assert_eq!(summary["stockCount"], 2);

        let log = api.handle_line("TRANSACTIONS").unwrap();
        let log = log.as_array().unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0]["type"], "UPDATE");
        assert_eq!(log[0]["symbol"], "INFY");
    }

    #[test]
    fn test_serve_writes_one_line_per_command() {
        let mut api = dispatcher();
        let input = "ADD TCS 100 5\n\nTOP\nSEARCH T\n";
        let mut output = Vec::new();
        let handled = api.serve(input.as_bytes(), &mut output).unwrap();
        assert_eq!(handled, 3);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let search: Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(search, json!(["TCS"]));
    }
}
