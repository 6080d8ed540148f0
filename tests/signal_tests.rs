// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use signaldesk::commands::portfolio::{ProfitLoss, calculate_pl, is_open};
use signaldesk::models::{CrossoverRow, Investment, StockRef};
use signaldesk::signals::{RunEnd, Signal, signal_runs};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn rows(codes: &[i64]) -> Vec<CrossoverRow> {
    codes
        .iter()
        .enumerate()
        .map(|(i, code)| CrossoverRow {
            date: day(i as u32 + 1),
            close: 50.0 + i as f64,
            ma50: None,
            ma200: None,
            ema9: None,
            ema21: None,
            ema20: None,
            ema50: None,
            golden_cross_signal: Some(*code),
            ema_short_signal: None,
            ema_medium_signal: None,
        })
        .collect()
}

#[test]
fn runs_split_on_zero_and_direction_change() {
    let series = rows(&[0, 0, 1, 1, 0, -1, -1, 0]);
    let runs = signal_runs(&series, |r| r.golden_cross_signal);
    assert_eq!(runs.len(), 2);

    assert_eq!(runs[0].direction, Signal::Buy);
    assert_eq!(runs[0].start, day(3));
    assert_eq!(runs[0].end, RunEnd::Date(day(4)));
    assert_eq!(runs[0].start_close, 52.0);

    assert_eq!(runs[1].direction, Signal::Sell);
    assert_eq!(runs[1].start, day(6));
    assert_eq!(runs[1].end, RunEnd::Date(day(7)));
}

#[test]
fn run_reaching_the_last_row_is_ongoing() {
    let series = rows(&[1, -1, -1]);
    let runs = signal_runs(&series, |r| r.golden_cross_signal);
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].end, RunEnd::Date(day(1)));
    assert_eq!(runs[1].end, RunEnd::Ongoing);
    assert_eq!(runs[1].end.to_string(), "Ongoing");

    assert!(signal_runs(&rows(&[0, 0, 0]), |r| r.golden_cross_signal).is_empty());
    assert!(signal_runs(&rows(&[]), |r| r.golden_cross_signal).is_empty());
}

fn investment(sell_price: Option<Decimal>) -> Investment {
    Investment {
        id: Some(1),
        stock: StockRef {
            symbol: "hdl".into(),
        },
        buy_price: Decimal::new(100, 0),
        quantity: 10,
        buy_date: Some(day(1)),
        sell_price,
        sell_date: sell_price.map(|_| day(20)),
        total_pl: None,
    }
}

#[test]
fn profit_on_a_closed_position() {
    let sold = investment(Some(Decimal::new(120, 0)));
    assert_eq!(
        calculate_pl(&sold),
        Some(ProfitLoss {
            value: Decimal::new(200, 0),
            percentage: Decimal::new(20, 0),
        })
    );
    assert!(!is_open(&sold));
}

#[test]
fn open_position_has_no_profit_loss() {
    let open = investment(None);
    assert_eq!(calculate_pl(&open), None);
    assert!(is_open(&open));
}
