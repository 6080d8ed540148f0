// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiClient;
use crate::commands::momentum::pick_symbol;
use crate::commands::require;
use crate::models::{CrossoverSeries, CrossoverStrategy};
use crate::pages::load;
use crate::router::Route;
use crate::signals::{
    RECENT_LOOKBACK, Signal, SignalRun, classify_signal, latest_row, recent_signal, signal_runs,
};
use crate::utils::{fmt_opt, maybe_print_json, pretty_table};
use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use serde::Serialize;

pub const DEFAULT_RUNS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossoverCard {
    pub date: NaiveDate,
    pub close: f64,
    pub short_average: Option<f64>,
    pub long_average: Option<f64>,
    pub signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stance {
    pub strategy: String,
    pub name: String,
    pub signal: Signal,
}

pub fn crossover_card(series: &CrossoverSeries, strategy: CrossoverStrategy) -> Option<CrossoverCard> {
    latest_row(&series.data).map(|row| CrossoverCard {
        date: row.date,
        close: row.close,
        short_average: strategy.short_average(row),
        long_average: strategy.long_average(row),
        signal: classify_signal(strategy.signal(row)),
    })
}

pub fn stances(series: &CrossoverSeries) -> Vec<Stance> {
    series
        .strategies()
        .into_iter()
        .map(|(strategy, meta)| Stance {
            strategy: strategy.key().to_string(),
            name: meta.name.clone(),
            signal: recent_signal(series.data.iter().map(|r| strategy.signal(r)), RECENT_LOOKBACK),
        })
        .collect()
}

pub fn strategy_runs(series: &CrossoverSeries, strategy: CrossoverStrategy) -> Vec<SignalRun> {
    let mut runs = signal_runs(&series.data, |r| strategy.signal(r));
    runs.reverse();
    runs
}

#[derive(Serialize)]
struct CrossoverView<'a> {
    symbol: &'a str,
    strategy: &'a str,
    latest: Option<CrossoverCard>,
    stances: Vec<Stance>,
    signals: Vec<SignalRun>,
}

pub fn handle(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    require(Route::Crossover, client.session())?;

    let strategy: CrossoverStrategy = match sub.get_one::<String>("strategy") {
        Some(raw) => raw.parse::<CrossoverStrategy>().map_err(|e| anyhow!(e))?,
        None => CrossoverStrategy::GoldenCross,
    };
    let runs = sub.get_one::<usize>("runs").copied().unwrap_or(DEFAULT_RUNS);
    let json = sub.get_flag("json");
    let Some(symbol) = pick_symbol(client, sub.get_one::<String>("symbol"))? else {
        println!("No symbols available.");
        return Ok(());
    };

    load(
        &format!("crossover signals for {}", symbol.to_uppercase()),
        || client.crossover(&symbol),
        |s| s.data.is_empty(),
        &format!("No crossover data for {}.", symbol.to_uppercase()),
    )
    .finish(|series| {
        let advertised = series.strategies();
        if !advertised.is_empty() && !advertised.iter().any(|(s, _)| *s == strategy) {
            let keys: Vec<&str> = advertised.iter().map(|(s, _)| s.key()).collect();
            bail!(
                "Strategy '{}' is not offered for {}; available: {}",
                strategy,
                symbol.to_uppercase(),
                keys.join(", ")
            );
        }
        render(&symbol, &series, strategy, runs, json)
    })
}

fn render(
    symbol: &str,
    series: &CrossoverSeries,
    strategy: CrossoverStrategy,
    runs: usize,
    json: bool,
) -> Result<()> {
    let mut signals = strategy_runs(series, strategy);
    signals.truncate(runs);
    let view = CrossoverView {
        symbol,
        strategy: strategy.key(),
        latest: crossover_card(series, strategy),
        stances: stances(series),
        signals,
    };
    if maybe_print_json(json, &view)? {
        return Ok(());
    }

    let (short_label, long_label) = strategy.average_labels();
    if let Some(card) = &view.latest {
        println!("{} {}", symbol.to_uppercase(), strategy);
        println!(
            "{}",
            pretty_table(
                &["Date", "Close", short_label, long_label, "Signal"],
                vec![vec![
                    card.date.to_string(),
                    format!("{:.2}", card.close),
                    fmt_opt(card.short_average, 2),
                    fmt_opt(card.long_average, 2),
                    card.signal.to_string(),
                ]],
            )
        );
    }

    if !view.stances.is_empty() {
        let rows = view
            .stances
            .iter()
            .map(|s| vec![s.strategy.clone(), s.name.clone(), s.signal.to_string()])
            .collect();
        println!("{}", pretty_table(&["Strategy", "Name", "Stance"], rows));
    }

    if view.signals.is_empty() {
        println!("No crossover signals for {}.", strategy);
    } else {
        let rows = view
            .signals
            .iter()
            .map(|r| {
                vec![
                    r.direction.to_string(),
                    r.start.to_string(),
                    r.end.to_string(),
                    format!("{:.2}", r.start_close),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Signal", "Start", "End", "Close at start"], rows)
        );
    }

    let guide: Vec<Vec<String>> = series
        .strategies()
        .into_iter()
        .map(|(s, meta)| {
            vec![
                s.key().to_string(),
                meta.name.clone(),
                meta.kind.clone(),
                format!("{} / {}", meta.short_ma, meta.long_ma),
            ]
        })
        .collect();
    if !guide.is_empty() {
        println!(
            "{}",
            pretty_table(&["Strategy", "Name", "Type", "Averages"], guide)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::RunEnd;
    use serde_json::json;

    fn series() -> CrossoverSeries {
        let codes = [0, 1, 1, 0, 0, -1, 0, 0];
        let data: Vec<_> = codes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let close = 100.0 + i as f64;
                let ema_short = if i == 7 { -1 } else { 0 };
                json!({
                    "date": format!("2024-02-{:02}", i + 1),
                    "close": close,
                    "MA50": 1.0, "MA200": 2.0,
                    "golden_cross_signal": c,
                    "ema_short_signal": ema_short,
                    "ema_medium_signal": 0
                })
            })
            .collect();
        serde_json::from_value(json!({
            "data": data,
            "metadata": {"strategies": {
                "golden_cross": {"name": "Golden Cross", "type": "Long-term", "short_ma": "MA50", "long_ma": "MA200"},
                "ema_short": {"name": "Short EMA", "type": "Short-term", "short_ma": "EMA9", "long_ma": "EMA21"}
            }}
        }))
        .unwrap()
    }

    #[test]
    fn runs_are_listed_newest_first() {
        let runs = strategy_runs(&series(), CrossoverStrategy::GoldenCross);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].direction, Signal::Sell);
        assert_eq!(runs[0].start, NaiveDate::from_ymd_opt(2024, 2, 6).unwrap());
        assert_eq!(
            runs[0].end,
            RunEnd::Date(NaiveDate::from_ymd_opt(2024, 2, 6).unwrap())
        );
        assert_eq!(runs[1].direction, Signal::Buy);
        assert_eq!(runs[1].start_close, 101.0);
    }

    #[test]
    fn stance_uses_recent_window() {
        let s = stances(&series());
        assert_eq!(s.len(), 2);
        // The last golden-cross code (-1 on row 6) is within five rows of the end.
        assert_eq!(s[0].signal, Signal::Sell);
        assert_eq!(s[1].strategy, "ema_short");
        assert_eq!(s[1].signal, Signal::Sell);

        let card = crossover_card(&series(), CrossoverStrategy::GoldenCross).unwrap();
        assert_eq!(card.signal, Signal::Neutral);
        assert_eq!(card.short_average, Some(1.0));
    }
}
