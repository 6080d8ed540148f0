// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{API_URL_KEY, Config, TIMEOUT_KEY, parse_timeout};
use crate::db::set_setting;
use crate::utils::pretty_table;
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-url", sub)) => {
            let url = sub.get_one::<String>("url").unwrap().trim().to_string();
            reqwest::Url::parse(&url).with_context(|| format!("Invalid URL '{}'", url))?;
            set_setting(conn, API_URL_KEY, &url)?;
            println!("API URL set to {}", url);
        }
        Some(("set-timeout", sub)) => {
            let raw = sub.get_one::<String>("seconds").unwrap();
            let timeout = parse_timeout(raw)?;
            set_setting(conn, TIMEOUT_KEY, &timeout.as_secs().to_string())?;
            println!("Request timeout set to {}s", timeout.as_secs());
        }
        Some(("show", _)) => {
            let cfg = Config::load(conn, None)?;
            println!(
                "{}",
                pretty_table(
                    &["Setting", "Value"],
                    vec![
                        vec!["api_url".into(), cfg.api_url],
                        vec!["timeout".into(), format!("{}s", cfg.timeout.as_secs())],
                    ],
                )
            );
        }
        _ => {}
    }
    Ok(())
}
