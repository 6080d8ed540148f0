// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiClient;
use crate::commands::require;
use crate::models::{MomentumRow, MomentumSeries};
use crate::pages::load;
use crate::router::Route;
use crate::signals::{Oscillator, Signal, classify_oscillator, classify_signal, latest_row};
use crate::utils::{fmt_opt, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

pub const DEFAULT_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MomentumCard {
    pub date: NaiveDate,
    pub close: f64,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub rsi: Option<f64>,
    pub rsi_status: Option<Oscillator>,
    pub signal: Signal,
}

pub fn momentum_card(series: &MomentumSeries) -> Option<MomentumCard> {
    latest_row(&series.data).map(|row| MomentumCard {
        date: row.date,
        close: row.close,
        ma50: row.ma50,
        ma200: row.ma200,
        rsi: row.rsi,
        rsi_status: row.rsi.map(classify_oscillator),
        signal: classify_signal(row.signal),
    })
}

#[derive(Serialize)]
struct MomentumView<'a> {
    symbol: &'a str,
    latest: Option<MomentumCard>,
    rows: &'a [MomentumRow],
}

pub(crate) fn pick_symbol(client: &ApiClient, explicit: Option<&String>) -> Result<Option<String>> {
    if let Some(symbol) = explicit {
        return Ok(Some(symbol.trim().to_string()));
    }
    let symbols = client.symbols().context("Failed to load symbols")?;
    Ok(symbols.into_iter().next())
}

pub fn handle(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    require(Route::Momentum, client.session())?;

    let rows = sub.get_one::<usize>("rows").copied().unwrap_or(DEFAULT_ROWS);
    let json = sub.get_flag("json");
    let Some(symbol) = pick_symbol(client, sub.get_one::<String>("symbol"))? else {
        println!("No symbols available.");
        return Ok(());
    };

    load(
        &format!("momentum for {}", symbol.to_uppercase()),
        || client.momentum(&symbol),
        |s| s.data.is_empty(),
        &format!("No momentum data for {}.", symbol.to_uppercase()),
    )
    .finish(|series| render(&symbol, &series, rows, json))
}

fn render(symbol: &str, series: &MomentumSeries, rows: usize, json: bool) -> Result<()> {
    let tail = &series.data[series.data.len().saturating_sub(rows)..];
    let view = MomentumView {
        symbol,
        latest: momentum_card(series),
        rows: tail,
    };
    if maybe_print_json(json, &view)? {
        return Ok(());
    }

    if let Some(card) = &view.latest {
        let rsi = match (card.rsi, card.rsi_status) {
            (Some(v), Some(status)) => format!("{:.2} ({})", v, status),
            _ => "-".into(),
        };
        println!("{} momentum", symbol.to_uppercase());
        println!(
            "{}",
            pretty_table(
                &["Date", "Close", "MA50", "MA200", "RSI", "Signal"],
                vec![vec![
                    card.date.to_string(),
                    format!("{:.2}", card.close),
                    fmt_opt(card.ma50, 2),
                    fmt_opt(card.ma200, 2),
                    rsi,
                    card.signal.to_string(),
                ]],
            )
        );
    }

    if !series.metadata.indicators.is_empty() {
        let legend = series
            .metadata
            .indicators
            .iter()
            .map(|(key, meta)| {
                let thresholds = meta
                    .thresholds
                    .as_ref()
                    .map(|t| format!("overbought {} / oversold {} / neutral {}", t.overbought, t.oversold, t.neutral))
                    .unwrap_or_default();
                vec![key.clone(), meta.name.clone(), meta.description.clone(), thresholds]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Indicator", "Name", "Description", "Thresholds"], legend)
        );
    }

    let data = tail
        .iter()
        .rev()
        .map(|r| {
            vec![
                r.date.to_string(),
                format!("{:.2}", r.close),
                fmt_opt(r.ma50, 2),
                fmt_opt(r.ma200, 2),
                fmt_opt(r.rsi, 2),
                classify_signal(r.signal).to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Close", "MA50", "MA200", "RSI", "Signal"], data)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn card_reflects_latest_row() {
        let series: MomentumSeries = serde_json::from_value(json!({
            "data": [
                {"date": "2024-01-02", "close": 10.0, "RSI": 25.0, "Signal": -1},
                {"date": "2024-01-03", "close": 11.0, "MA50": 10.5, "MA200": 9.8, "RSI": 72.5, "Signal": 1}
            ],
            "metadata": {"indicators": {}}
        }))
        .unwrap();
        let card = momentum_card(&series).unwrap();
        assert_eq!(card.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(card.rsi_status, Some(Oscillator::Overbought));
        assert_eq!(card.signal, Signal::Buy);

        assert!(momentum_card(&MomentumSeries::default()).is_none());
    }
}
