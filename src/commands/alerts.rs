// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiClient;
use crate::commands::require;
use crate::error::ApiError;
use crate::models::{CrossoverSeries, CrossoverStrategy, MomentumSeries, StockSnapshot};
use crate::pages::{fan_out, load};
use crate::router::Route;
use crate::signals::{Signal, classify_signal, latest_row};
use crate::utils::{fmt_opt, maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRow {
    pub stock: String,
    pub rsi: Option<f64>,
    pub volatility: Option<f64>,
    pub golden_cross: Signal,
    pub short_term: Signal,
    pub mid_term: Signal,
}

impl AlertRow {
    pub fn signals(&self) -> [Signal; 3] {
        [self.golden_cross, self.short_term, self.mid_term]
    }
}

pub fn alert_row(
    symbol: &str,
    momentum: &MomentumSeries,
    crossover: &CrossoverSeries,
    stocks: &[StockSnapshot],
) -> AlertRow {
    let latest_momentum = latest_row(&momentum.data);
    let latest_crossover = latest_row(&crossover.data);
    let volatility = stocks
        .iter()
        .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
        .and_then(|s| s.volatility);
    let cross = |strategy: CrossoverStrategy| {
        classify_signal(latest_crossover.and_then(|r| strategy.signal(r)))
    };

    AlertRow {
        stock: symbol.to_string(),
        rsi: latest_momentum.and_then(|r| r.rsi),
        volatility,
        golden_cross: classify_signal(latest_momentum.and_then(|r| r.signal)),
        short_term: cross(CrossoverStrategy::EmaShort),
        mid_term: cross(CrossoverStrategy::EmaMedium),
    }
}

// A missing stocks snapshot only blanks the volatility column.
pub fn build_alerts(client: &ApiClient) -> Result<Vec<AlertRow>, ApiError> {
    let symbols = client.symbols()?;
    let stocks = match client.stocks() {
        Ok(r) => r.stocks,
        Err(err) if err.is_unauthorized() => return Err(err),
        Err(err) => {
            warn!(error = %err, "stocks snapshot unavailable, volatility omitted");
            Vec::new()
        }
    };
    debug!(symbols = symbols.len(), "building alerts");

    fan_out(&symbols, |symbol| {
        let momentum = client.momentum(symbol)?;
        let crossover = client.crossover(symbol)?;
        Ok(alert_row(symbol, &momentum, &crossover, &stocks))
    })
}

pub fn handle(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    require(Route::Alerts, client.session())?;

    let only = match sub.get_one::<String>("only").map(|s| s.to_ascii_lowercase()) {
        None => None,
        Some(s) if s == "buy" => Some(Signal::Buy),
        Some(s) if s == "sell" => Some(Signal::Sell),
        Some(other) => bail!("Unknown filter '{}', expected buy or sell", other),
    };
    let json = sub.get_flag("json");

    load(
        "alerts",
        || {
            build_alerts(client).map(|rows| {
                rows.into_iter()
                    .filter(|r| only.is_none_or(|want| r.signals().contains(&want)))
                    .collect::<Vec<_>>()
            })
        },
        |rows| rows.is_empty(),
        "No alerts to show.",
    )
    .finish(|rows| {
        if maybe_print_json(json, &rows)? {
            return Ok(());
        }
        let data = rows
            .into_iter()
            .map(|r| {
                vec![
                    r.stock.to_uppercase(),
                    fmt_opt(r.rsi, 2),
                    fmt_opt(r.volatility, 2),
                    r.golden_cross.to_string(),
                    r.short_term.to_string(),
                    r.mid_term.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Stock", "RSI", "Volatility %", "Golden Cross", "Short Term", "Mid Term"],
                data
            )
        );
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_takes_latest_values_and_matches_volatility_case_insensitively() {
        let momentum: MomentumSeries = serde_json::from_value(json!({
            "data": [
                {"date": "2024-01-01", "close": 1.0, "RSI": 20.0, "Signal": -1},
                {"date": "2024-01-02", "close": 1.1, "RSI": 64.2, "Signal": 1}
            ]
        }))
        .unwrap();
        let crossover: CrossoverSeries = serde_json::from_value(json!({
            "data": [
                {"date": "2024-01-02", "close": 1.1, "ema_short_signal": -1, "ema_medium_signal": 0}
            ]
        }))
        .unwrap();
        let stocks = vec![StockSnapshot {
            symbol: "NABIL".into(),
            close: None,
            previous_close: None,
            volume: None,
            volatility: Some(2.4),
            date: None,
        }];

        let row = alert_row("nabil", &momentum, &crossover, &stocks);
        assert_eq!(row.rsi, Some(64.2));
        assert_eq!(row.volatility, Some(2.4));
        assert_eq!(row.golden_cross, Signal::Buy);
        assert_eq!(row.short_term, Signal::Sell);
        assert_eq!(row.mid_term, Signal::Neutral);

        let bare = alert_row("adbl", &MomentumSeries::default(), &CrossoverSeries::default(), &stocks);
        assert_eq!(bare.rsi, None);
        assert_eq!(bare.volatility, None);
        assert_eq!(bare.signals(), [Signal::Neutral; 3]);
    }
}
