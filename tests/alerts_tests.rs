// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use signaldesk::api::{ApiClient, ApiRequest, ApiResponse, Transport};
use signaldesk::commands::alerts::build_alerts;
use signaldesk::error::ApiError;
use signaldesk::pages::PageState;
use signaldesk::router::{RecordingNavigator, Route};
use signaldesk::session::{MemoryTokenStore, Session, TokenStore};
use signaldesk::signals::Signal;
use std::sync::Arc;

/// Backend with symbols A, B and C where B's momentum endpoint is broken.
struct Market {
    broken_stocks: bool,
    revoked: bool,
}

fn json(status: u16, body: serde_json::Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse {
        status,
        body: body.to_string(),
    })
}

impl Transport for Market {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let segs: Vec<&str> = request.segments.iter().map(String::as_str).collect();
        match segs.as_slice() {
            ["stock_scraper", "symbols"] => json(200, serde_json::json!({"symbols": ["A", "B", "C"]})),
            ["stock_scraper", "stocks"] if self.broken_stocks => {
                json(500, serde_json::json!({"error": "db down"}))
            }
            ["stock_scraper", "stocks"] => json(
                200,
                serde_json::json!({"stocks": [
                    {"symbol": "a", "close": 10.0, "volatility": 1.5},
                    {"symbol": "c", "close": 30.0, "volatility": 3.25}
                ], "count": 2}),
            ),
            ["stock_scraper", "strategy" | "ma_crossover", _] if self.revoked => {
                json(401, serde_json::json!({"detail": "Given token not valid for any token type"}))
            }
            ["stock_scraper", "strategy", "B"] => json(500, serde_json::json!({"error": "boom"})),
            ["stock_scraper", "strategy", sym] => {
                let signal = if *sym == "A" { 1 } else { -1 };
                json(
                    200,
                    serde_json::json!({"data": [
                        {"date": "2024-06-01", "close": 1.0, "RSI": 40.0, "Signal": 0},
                        {"date": "2024-06-02", "close": 1.0, "RSI": 55.5, "Signal": signal}
                    ], "metadata": {"indicators": {}}}),
                )
            }
            ["stock_scraper", "ma_crossover", _] => json(
                200,
                serde_json::json!({"data": [
                    {"date": "2024-06-02", "close": 1.0, "golden_cross_signal": 0, "ema_short_signal": 1, "ema_medium_signal": -1}
                ], "metadata": {"strategies": {}}}),
            ),
            _ => json(404, serde_json::json!({"error": "not found"})),
        }
    }
}

fn market(broken_stocks: bool, revoked: bool) -> (ApiClient, Arc<MemoryTokenStore>, Arc<RecordingNavigator>) {
    let store = Arc::new(MemoryTokenStore::with_token("h.p.s", false));
    let nav = Arc::new(RecordingNavigator::default());
    let session = Session::new(store.clone(), nav.clone());
    let client = ApiClient::new(
        Arc::new(Market {
            broken_stocks,
            revoked,
        }),
        Arc::new(session),
    );
    (client, store, nav)
}

fn client(broken_stocks: bool) -> ApiClient {
    market(broken_stocks, false).0
}

#[test]
fn failing_symbol_is_dropped_and_order_kept() {
    let rows = build_alerts(&client(false)).unwrap();
    let stocks: Vec<&str> = rows.iter().map(|r| r.stock.as_str()).collect();
    assert_eq!(stocks, vec!["A", "C"]);

    let a = &rows[0];
    assert_eq!(a.rsi, Some(55.5));
    assert_eq!(a.volatility, Some(1.5));
    assert_eq!(a.golden_cross, Signal::Buy);
    assert_eq!(a.short_term, Signal::Buy);
    assert_eq!(a.mid_term, Signal::Sell);

    let c = &rows[1];
    assert_eq!(c.golden_cross, Signal::Sell);
    assert_eq!(c.volatility, Some(3.25));
}

#[test]
fn missing_snapshot_only_blanks_volatility() {
    let rows = build_alerts(&client(true)).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.volatility.is_none()));
}

#[test]
fn revoked_token_fails_the_page_instead_of_showing_it_empty() {
    let (client, store, nav) = market(false, true);
    let result = build_alerts(&client);
    assert_eq!(result, Err(ApiError::Unauthorized));

    let state = PageState::from_result(result, |rows| rows.is_empty(), "No alerts to show.");
    assert!(matches!(state, PageState::Failed(_)));
    assert_eq!(store.get(), None);
    assert_eq!(nav.visits(), vec![Route::Login]);
}
