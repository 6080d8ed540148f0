// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiClient;
use crate::commands::require;
use crate::models::{Investment, NewInvestment, SellOrder};
use crate::pages::load;
use crate::router::Route;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    require(Route::Portfolio, client.session())?;
    match m.subcommand() {
        Some(("list", sub)) => list(client, sub.get_flag("json"))?,
        Some(("add", sub)) => add(client, sub)?,
        Some(("sell", sub)) => sell(client, sub)?,
        _ => list(client, false)?,
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfitLoss {
    pub value: Decimal,
    pub percentage: Decimal,
}

/// A position is open until either a sell price or a sell date is recorded.
pub fn is_open(inv: &Investment) -> bool {
    inv.sell_price.is_none() && inv.sell_date.is_none()
}

pub fn calculate_pl(inv: &Investment) -> Option<ProfitLoss> {
    let sell = inv.sell_price?;
    let per_share = sell - inv.buy_price;
    let value = per_share * Decimal::from(inv.quantity);
    let percentage = per_share
        .checked_div(inv.buy_price)
        .map(|r| (r * Decimal::ONE_HUNDRED).round_dp(2))
        .unwrap_or(Decimal::ZERO);
    Some(ProfitLoss { value, percentage })
}

#[derive(Debug, Serialize)]
struct PositionLine<'a> {
    #[serde(flatten)]
    investment: &'a Investment,
    open: bool,
    profit_loss: Option<ProfitLoss>,
}

fn list(client: &ApiClient, json: bool) -> Result<()> {
    load(
        "investments",
        || client.investments(),
        |v| v.is_empty(),
        "No investments yet. Add one with `signaldesk portfolio add`.",
    )
    .finish(|investments| {
        let lines: Vec<PositionLine> = investments
            .iter()
            .map(|inv| PositionLine {
                investment: inv,
                open: is_open(inv),
                profit_loss: calculate_pl(inv),
            })
            .collect();
        if maybe_print_json(json, &lines)? {
            return Ok(());
        }

        let dash = || "-".to_string();
        let mut realised = Decimal::ZERO;
        let mut open_count = 0usize;
        let mut data = Vec::new();
        for line in &lines {
            let inv = line.investment;
            if line.open {
                open_count += 1;
            }
            if let Some(pl) = line.profit_loss {
                realised += pl.value;
            }
            data.push(vec![
                inv.id.map(|i| i.to_string()).unwrap_or_else(dash),
                inv.stock.symbol.to_uppercase(),
                fmt_money(&inv.buy_price),
                inv.quantity.to_string(),
                inv.buy_date.map(|d| d.to_string()).unwrap_or_else(dash),
                inv.sell_price.as_ref().map(fmt_money).unwrap_or_else(dash),
                inv.sell_date.map(|d| d.to_string()).unwrap_or_else(dash),
                if line.open { "Open" } else { "Closed" }.to_string(),
                line.profit_loss.map(|p| fmt_money(&p.value)).unwrap_or_else(dash),
                line.profit_loss
                    .map(|p| format!("{}%", p.percentage))
                    .unwrap_or_else(dash),
            ]);
        }
        println!(
            "{}",
            pretty_table(
                &[
                    "ID", "Symbol", "Buy", "Qty", "Bought", "Sell", "Sold", "Status", "P/L",
                    "P/L %"
                ],
                data
            )
        );
        println!(
            "{}",
            pretty_table(
                &["Positions", "Open", "Realised P/L"],
                vec![vec![
                    lines.len().to_string(),
                    open_count.to_string(),
                    fmt_money(&realised),
                ]],
            )
        );
        Ok(())
    })
}

fn date_or_today(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("date") {
        Some(raw) => parse_date(raw.trim()),
        None => Ok(Utc::now().date_naive()),
    }
}

fn positive_price(raw: &str) -> Result<Decimal> {
    let price = parse_decimal(raw)?;
    if price <= Decimal::ZERO {
        bail!("Price must be greater than zero");
    }
    Ok(price)
}

fn add(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let symbol = sub.get_one::<String>("symbol").unwrap().trim().to_string();
    if symbol.is_empty() {
        bail!("Symbol is required");
    }
    let buy_price = positive_price(sub.get_one::<String>("price").unwrap())?;
    let raw_qty = sub.get_one::<String>("qty").unwrap().trim();
    let quantity: i64 = raw_qty
        .parse()
        .with_context(|| format!("Invalid quantity '{}'", raw_qty))?;
    if quantity <= 0 {
        bail!("Quantity must be greater than zero");
    }
    let buy_date = date_or_today(sub)?;

    let created = client
        .add_investment(&NewInvestment {
            stock: symbol.clone(),
            buy_price,
            quantity,
            buy_date,
        })
        .context("Failed to add investment")?;
    println!(
        "Added {} x {} @ {} on {}{}",
        quantity,
        symbol.to_uppercase(),
        fmt_money(&buy_price),
        buy_date,
        created.id.map(|i| format!(" (id {})", i)).unwrap_or_default()
    );
    Ok(())
}

fn sell(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let raw_id = sub.get_one::<String>("id").unwrap().trim();
    let id: i64 = raw_id
        .parse()
        .with_context(|| format!("Invalid investment id '{}'", raw_id))?;
    let sell_price = positive_price(sub.get_one::<String>("price").unwrap())?;
    let sell_date = date_or_today(sub)?;

    let investments = client.investments().context("Failed to load investments")?;
    let position = investments
        .iter()
        .find(|inv| inv.id == Some(id))
        .ok_or_else(|| anyhow!("No investment with id {}", id))?;
    if !is_open(position) {
        bail!(
            "Investment {} ({}) is already sold",
            id,
            position.stock.symbol.to_uppercase()
        );
    }

    let sold = client
        .sell_investment(id, &SellOrder {
            sell_price,
            sell_date,
        })
        .context("Failed to record sale")?;
    let pl = calculate_pl(&sold).or_else(|| {
        calculate_pl(&Investment {
            sell_price: Some(sell_price),
            ..position.clone()
        })
    });
    println!(
        "Sold {} x {} @ {} on {}",
        position.quantity,
        position.stock.symbol.to_uppercase(),
        fmt_money(&sell_price),
        sell_date
    );
    if let Some(pl) = pl {
        println!("P/L: {} ({}%)", fmt_money(&pl.value), pl.percentage);
    }
    Ok(())
}
