// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

pub const OVERBOUGHT: f64 = 70.0;
pub const OVERSOLD: f64 = 30.0;
pub const RECENT_LOOKBACK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Buy => "Buy",
            Signal::Sell => "Sell",
            Signal::Neutral => "Neutral",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Oscillator {
    Overbought,
    Oversold,
    Neutral,
}

impl fmt::Display for Oscillator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Oscillator::Overbought => "Overbought",
            Oscillator::Oversold => "Oversold",
            Oscillator::Neutral => "Neutral",
        })
    }
}

pub fn classify_signal(code: Option<i64>) -> Signal {
    match code {
        Some(1) => Signal::Buy,
        Some(-1) => Signal::Sell,
        _ => Signal::Neutral,
    }
}

/// Classify a 0-100 oscillator; both thresholds belong to the extreme class.
pub fn classify_oscillator(value: f64) -> Oscillator {
    if value >= OVERBOUGHT {
        Oscillator::Overbought
    } else if value <= OVERSOLD {
        Oscillator::Oversold
    } else {
        Oscillator::Neutral
    }
}

pub fn latest_row<T>(series: &[T]) -> Option<&T> {
    series.last()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Change {
    pub value: f64,
    pub percentage: f64,
}

impl Change {
    pub const ZERO: Change = Change {
        value: 0.0,
        percentage: 0.0,
    };
}

pub fn percent_change(current: Option<f64>, previous: Option<f64>) -> Change {
    match (current, previous) {
        (Some(current), Some(previous)) if previous != 0.0 => {
            let value = current - previous;
            Change {
                value,
                percentage: value * 100.0 / previous,
            }
        }
        _ => Change::ZERO,
    }
}

pub trait SeriesRow {
    fn date(&self) -> NaiveDate;
    fn close(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunEnd {
    Date(NaiveDate),
    Ongoing,
}

impl fmt::Display for RunEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunEnd::Date(d) => write!(f, "{}", d),
            RunEnd::Ongoing => f.write_str("Ongoing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRun {
    pub direction: Signal,
    pub start: NaiveDate,
    pub end: RunEnd,
    pub start_close: f64,
}

/// Split a chronological series into runs of one persisting non-zero code.
///
/// A zero (or missing) code closes the open run at the previous row. A run
/// still open on the final row is reported as ongoing.
pub fn signal_runs<R, F>(rows: &[R], code: F) -> Vec<SignalRun>
where
    R: SeriesRow,
    F: Fn(&R) -> Option<i64>,
{
    let mut runs = Vec::new();
    // (direction code, start index)
    let mut open: Option<(i64, usize)> = None;

    for (idx, row) in rows.iter().enumerate() {
        let current = code(row).filter(|c| *c == 1 || *c == -1);
        match (open, current) {
            (Some((tracked, _)), Some(c)) if tracked == c => {}
            (prev, next) => {
                if let Some((tracked, start)) = prev {
                    runs.push(make_run(rows, tracked, start, RunEnd::Date(rows[idx - 1].date())));
                }
                open = next.map(|c| (c, idx));
            }
        }
    }
    if let Some((tracked, start)) = open {
        runs.push(make_run(rows, tracked, start, RunEnd::Ongoing));
    }
    runs
}

fn make_run<R: SeriesRow>(rows: &[R], code: i64, start: usize, end: RunEnd) -> SignalRun {
    SignalRun {
        direction: classify_signal(Some(code)),
        start: rows[start].date(),
        end,
        start_close: rows[start].close(),
    }
}

pub fn recent_signal<I>(codes: I, lookback: usize) -> Signal
where
    I: IntoIterator<Item = Option<i64>>,
    I::IntoIter: DoubleEndedIterator,
{
    codes
        .into_iter()
        .rev()
        .take(lookback)
        .map(classify_signal)
        .find(|s| *s != Signal::Neutral)
        .unwrap_or(Signal::Neutral)
}
