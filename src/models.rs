// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::signals::SeriesRow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolsResponse {
    #[serde(default)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub symbol: String,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub previous_close: Option<f64>,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StocksResponse {
    #[serde(default)]
    pub stocks: Vec<StockSnapshot>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumRow {
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    pub close: f64,
    #[serde(rename = "MA50", default)]
    pub ma50: Option<f64>,
    #[serde(rename = "MA200", default)]
    pub ma200: Option<f64>,
    #[serde(rename = "RSI", default)]
    pub rsi: Option<f64>,
    #[serde(rename = "Signal", default, deserialize_with = "de_code")]
    pub signal: Option<i64>,
    #[serde(rename = "Position", default)]
    pub position: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiThresholds {
    pub overbought: f64,
    pub oversold: f64,
    pub neutral: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thresholds: Option<RsiThresholds>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MomentumMetadata {
    #[serde(default)]
    pub indicators: BTreeMap<String, IndicatorMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MomentumSeries {
    #[serde(default)]
    pub data: Vec<MomentumRow>,
    #[serde(default)]
    pub metadata: MomentumMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossoverRow {
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    pub close: f64,
    #[serde(rename = "MA50", default)]
    pub ma50: Option<f64>,
    #[serde(rename = "MA200", default)]
    pub ma200: Option<f64>,
    #[serde(rename = "EMA9", default)]
    pub ema9: Option<f64>,
    #[serde(rename = "EMA21", default)]
    pub ema21: Option<f64>,
    #[serde(rename = "EMA20", default)]
    pub ema20: Option<f64>,
    #[serde(rename = "EMA50", default)]
    pub ema50: Option<f64>,
    #[serde(default, deserialize_with = "de_code")]
    pub golden_cross_signal: Option<i64>,
    #[serde(default, deserialize_with = "de_code")]
    pub ema_short_signal: Option<i64>,
    #[serde(default, deserialize_with = "de_code")]
    pub ema_medium_signal: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyMeta {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub short_ma: String,
    pub long_ma: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossoverMetadata {
    #[serde(default)]
    pub strategies: BTreeMap<String, StrategyMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossoverSeries {
    #[serde(default)]
    pub data: Vec<CrossoverRow>,
    #[serde(default)]
    pub metadata: CrossoverMetadata,
}

impl CrossoverSeries {
    pub fn strategies(&self) -> Vec<(CrossoverStrategy, &StrategyMeta)> {
        CrossoverStrategy::ALL
            .into_iter()
            .filter_map(|s| self.metadata.strategies.get(s.key()).map(|m| (s, m)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossoverStrategy {
    GoldenCross,
    EmaShort,
    EmaMedium,
}

impl CrossoverStrategy {
    pub const ALL: [CrossoverStrategy; 3] = [
        CrossoverStrategy::GoldenCross,
        CrossoverStrategy::EmaShort,
        CrossoverStrategy::EmaMedium,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CrossoverStrategy::GoldenCross => "golden_cross",
            CrossoverStrategy::EmaShort => "ema_short",
            CrossoverStrategy::EmaMedium => "ema_medium",
        }
    }

    pub fn average_labels(self) -> (&'static str, &'static str) {
        match self {
            CrossoverStrategy::GoldenCross => ("MA50", "MA200"),
            CrossoverStrategy::EmaShort => ("EMA9", "EMA21"),
            CrossoverStrategy::EmaMedium => ("EMA20", "EMA50"),
        }
    }

    pub fn short_average(self, row: &CrossoverRow) -> Option<f64> {
        match self {
            CrossoverStrategy::GoldenCross => row.ma50,
            CrossoverStrategy::EmaShort => row.ema9,
            CrossoverStrategy::EmaMedium => row.ema20,
        }
    }

    pub fn long_average(self, row: &CrossoverRow) -> Option<f64> {
        match self {
            CrossoverStrategy::GoldenCross => row.ma200,
            CrossoverStrategy::EmaShort => row.ema21,
            CrossoverStrategy::EmaMedium => row.ema50,
        }
    }

    pub fn signal(self, row: &CrossoverRow) -> Option<i64> {
        match self {
            CrossoverStrategy::GoldenCross => row.golden_cross_signal,
            CrossoverStrategy::EmaShort => row.ema_short_signal,
            CrossoverStrategy::EmaMedium => row.ema_medium_signal,
        }
    }
}

impl fmt::Display for CrossoverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CrossoverStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        CrossoverStrategy::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .ok_or_else(|| {
                format!(
                    "Unknown strategy '{}', expected one of golden_cross, ema_short, ema_medium",
                    s
                )
            })
    }
}

impl SeriesRow for MomentumRow {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn close(&self) -> f64 {
        self.close
    }
}

impl SeriesRow for CrossoverRow {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn close(&self) -> f64 {
        self.close
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRef {
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    #[serde(default)]
    pub id: Option<i64>,
    pub stock: StockRef,
    pub buy_price: Decimal,
    pub quantity: i64,
    #[serde(default)]
    pub buy_date: Option<NaiveDate>,
    #[serde(default)]
    pub sell_price: Option<Decimal>,
    #[serde(default)]
    pub sell_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_pl: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewInvestment {
    pub stock: String,
    pub buy_price: Decimal,
    pub quantity: i64,
    pub buy_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct SellOrder {
    pub sell_price: Decimal,
    pub sell_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedReport {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub deleted_count: u64,
    #[serde(default)]
    pub records_created: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}

fn de_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// Signal codes come back as ints, floats (after a pandas diff) or null.
fn de_code<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        _ => None,
    }))
}
