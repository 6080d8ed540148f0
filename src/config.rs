// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::get_setting;
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const API_URL_KEY: &str = "api_url";
pub const TIMEOUT_KEY: &str = "timeout_secs";
pub const API_URL_ENV: &str = "SIGNALDESK_API_URL";
pub const TIMEOUT_ENV: &str = "SIGNALDESK_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn load(conn: &Connection, cli_url: Option<&str>) -> Result<Config> {
        let mut cfg = Config::default();
        if let Some(url) = get_setting(conn, API_URL_KEY)? {
            cfg.api_url = url;
        }
        if let Some(secs) = get_setting(conn, TIMEOUT_KEY)? {
            cfg.timeout = parse_timeout(&secs)
                .with_context(|| format!("Stored setting {} is invalid", TIMEOUT_KEY))?;
        }
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                cfg.api_url = url.trim().to_string();
            }
        }
        if let Ok(secs) = std::env::var(TIMEOUT_ENV) {
            cfg.timeout =
                parse_timeout(&secs).with_context(|| format!("{} is invalid", TIMEOUT_ENV))?;
        }
        if let Some(url) = cli_url.map(str::trim).filter(|u| !u.is_empty()) {
            cfg.api_url = url.to_string();
        }
        Ok(cfg)
    }
}

pub fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid timeout '{}', expected whole seconds", raw.trim()))?;
    if secs == 0 {
        return Err(anyhow!("Timeout must be at least one second"));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, set_setting};

    #[test]
    fn stored_settings_override_defaults() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        set_setting(&conn, API_URL_KEY, "https://stocks.example.org/").unwrap();
        set_setting(&conn, TIMEOUT_KEY, "30").unwrap();

        let cfg = Config::load(&conn, Some("  ")).unwrap();
        if std::env::var(API_URL_ENV).is_err() {
            assert_eq!(cfg.api_url, "https://stocks.example.org/");
        }
        if std::env::var(TIMEOUT_ENV).is_err() {
            assert_eq!(cfg.timeout, Duration::from_secs(30));
        }

        let cfg = Config::load(&conn, Some("http://localhost:9000")).unwrap();
        assert_eq!(cfg.api_url, "http://localhost:9000");
    }

    #[test]
    fn timeout_must_be_positive_seconds() {
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("abc").is_err());
        assert_eq!(parse_timeout(" 5 ").unwrap(), Duration::from_secs(5));
    }
}
