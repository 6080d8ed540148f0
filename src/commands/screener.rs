// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiClient;
use crate::commands::require;
use crate::models::StockSnapshot;
use crate::pages::load;
use crate::router::Route;
use crate::signals::{Change, percent_change};
use crate::utils::{fmt_opt, maybe_print_json, pretty_table};
use anyhow::{Result, anyhow};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Symbol,
    Change,
    Volume,
    Volatility,
}

impl std::str::FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symbol" => Ok(SortKey::Symbol),
            "change" => Ok(SortKey::Change),
            "volume" => Ok(SortKey::Volume),
            "volatility" => Ok(SortKey::Volatility),
            other => Err(anyhow!(
                "Unknown sort key '{}', expected symbol, change, volume or volatility",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    All,
    Gainers,
    Losers,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreenerRow {
    pub symbol: String,
    pub close: Option<f64>,
    pub change: Change,
    pub volume: Option<i64>,
    pub volatility: Option<f64>,
    pub date: Option<String>,
}

pub fn screener_rows(stocks: &[StockSnapshot], sort: SortKey, direction: Direction) -> Vec<ScreenerRow> {
    let mut rows: Vec<ScreenerRow> = stocks
        .iter()
        .map(|s| ScreenerRow {
            symbol: s.symbol.clone(),
            close: s.close,
            change: percent_change(s.close, s.previous_close),
            volume: s.volume,
            volatility: s.volatility,
            date: s.date.clone(),
        })
        .filter(|r| match direction {
            Direction::All => true,
            Direction::Gainers => r.change.value > 0.0,
            Direction::Losers => r.change.value < 0.0,
        })
        .collect();

    // Descending for numeric keys; missing values sink to the bottom.
    fn desc(a: Option<f64>, b: Option<f64>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
    rows.sort_by(|a, b| {
        let primary = match sort {
            SortKey::Symbol => Ordering::Equal,
            SortKey::Change => desc(Some(a.change.percentage), Some(b.change.percentage)),
            SortKey::Volume => desc(a.volume.map(|v| v as f64), b.volume.map(|v| v as f64)),
            SortKey::Volatility => desc(a.volatility, b.volatility),
        };
        primary.then_with(|| a.symbol.to_lowercase().cmp(&b.symbol.to_lowercase()))
    });
    rows
}

pub fn handle(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    require(Route::Screener, client.session())?;

    let sort: SortKey = sub
        .get_one::<String>("sort")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(SortKey::Symbol);
    let direction = if sub.get_flag("gainers") {
        Direction::Gainers
    } else if sub.get_flag("losers") {
        Direction::Losers
    } else {
        Direction::All
    };
    let json = sub.get_flag("json");

    load(
        "stocks",
        || client.stocks().map(|r| screener_rows(&r.stocks, sort, direction)),
        |rows| rows.is_empty(),
        "No stocks match.",
    )
    .finish(|rows| {
        if maybe_print_json(json, &rows)? {
            return Ok(());
        }
        let data = rows
            .into_iter()
            .map(|r| {
                vec![
                    r.symbol.to_uppercase(),
                    fmt_opt(r.close, 2),
                    format!("{:+.2}", r.change.value),
                    format!("{:+.2}%", r.change.percentage),
                    r.volume.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
                    fmt_opt(r.volatility, 2),
                    r.date.unwrap_or_else(|| "-".into()),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Symbol", "Close", "Change", "Change %", "Volume", "Volatility %", "Date"],
                data
            )
        );
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(symbol: &str, close: f64, prev: Option<f64>, volume: i64) -> StockSnapshot {
        StockSnapshot {
            symbol: symbol.into(),
            close: Some(close),
            previous_close: prev,
            volume: Some(volume),
            volatility: None,
            date: Some("2025-06-02".into()),
        }
    }

    #[test]
    fn change_sort_and_direction_filters() {
        let stocks = vec![
            snap("nabil", 110.0, Some(100.0), 10),
            snap("adbl", 95.0, Some(100.0), 30),
            snap("hdl", 1200.0, Some(1000.0), 20),
            snap("new", 50.0, None, 5),
        ];
        let by_change = screener_rows(&stocks, SortKey::Change, Direction::All);
        let order: Vec<_> = by_change.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["hdl", "nabil", "new", "adbl"]);

        let gainers = screener_rows(&stocks, SortKey::Symbol, Direction::Gainers);
        let order: Vec<_> = gainers.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["hdl", "nabil"]);

        let losers = screener_rows(&stocks, SortKey::Volume, Direction::Losers);
        assert_eq!(losers.len(), 1);
        assert_eq!(losers[0].symbol, "adbl");
        assert!((losers[0].change.percentage + 5.0).abs() < 1e-9);
    }
}
