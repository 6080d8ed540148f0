// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiClient;
use crate::auth;
use crate::commands::require;
use crate::models::StockSnapshot;
use crate::pages::load;
use crate::router::Route;
use crate::signals::percent_change;
use crate::utils::pretty_table;
use anyhow::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breadth {
    pub advancers: usize,
    pub decliners: usize,
    pub unchanged: usize,
}

pub fn breadth(stocks: &[StockSnapshot]) -> Breadth {
    let mut out = Breadth::default();
    for s in stocks {
        let change = percent_change(s.close, s.previous_close);
        if change.value > 0.0 {
            out.advancers += 1;
        } else if change.value < 0.0 {
            out.decliners += 1;
        } else {
            out.unchanged += 1;
        }
    }
    out
}

pub fn handle(client: &ApiClient) -> Result<()> {
    let session = client.session();
    require(Route::Dashboard, session)?;

    let expiry = session
        .token()
        .as_deref()
        .and_then(auth::session_expiry)
        .map(|e| e.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "-".into());
    println!("Welcome to signaldesk");
    println!(
        "{}",
        pretty_table(
            &["Session", ""],
            vec![
                vec!["Token expires".into(), expiry],
                vec!["Admin".into(), session.is_admin().to_string()],
            ],
        )
    );

    load(
        "market snapshot",
        || client.stocks().map(|r| r.stocks),
        |s| s.is_empty(),
        "No stock data loaded yet.",
    )
    .finish(|stocks| {
        let b = breadth(&stocks);
        println!(
            "{}",
            pretty_table(
                &["Symbols", "Advancers", "Decliners", "Unchanged"],
                vec![vec![
                    stocks.len().to_string(),
                    b.advancers.to_string(),
                    b.decliners.to_string(),
                    b.unchanged.to_string(),
                ]],
            )
        );
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(symbol: &str, close: Option<f64>, prev: Option<f64>) -> StockSnapshot {
        StockSnapshot {
            symbol: symbol.into(),
            close,
            previous_close: prev,
            volume: None,
            volatility: None,
            date: None,
        }
    }

    #[test]
    fn breadth_treats_missing_previous_close_as_flat() {
        let b = breadth(&[
            snap("a", Some(11.0), Some(10.0)),
            snap("b", Some(9.0), Some(10.0)),
            snap("c", Some(9.0), None),
            snap("d", Some(10.0), Some(10.0)),
        ]);
        assert_eq!(
            b,
            Breadth {
                advancers: 1,
                decliners: 1,
                unchanged: 2
            }
        );
    }
}
