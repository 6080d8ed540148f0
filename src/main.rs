// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use signaldesk::api::{ApiClient, HttpTransport};
use signaldesk::config::Config;
use signaldesk::router::ConsoleNavigator;
use signaldesk::session::{Session, SqliteTokenStore};
use signaldesk::{cli, commands, db};

fn init_tracing(verbosity: u8) {
    let fallback = match verbosity {
        0 => "signaldesk=warn",
        1 => "signaldesk=debug",
        _ => "signaldesk=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    init_tracing(matches.get_count("verbose"));

    let conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
            return Ok(());
        }
        Some(("config", sub)) => return commands::settings::handle(&conn, sub),
        None => {
            cli::build_cli().print_help()?;
            println!();
            return Ok(());
        }
        _ => {}
    }

    let config = Config::load(
        &conn,
        matches.get_one::<String>("api_url").map(String::as_str),
    )?;
    tracing::debug!(api_url = %config.api_url, timeout = ?config.timeout, "loaded config");

    let session = Arc::new(Session::new(
        Arc::new(SqliteTokenStore::new(conn)),
        Arc::new(ConsoleNavigator::new()),
    ));
    let client = ApiClient::new(Arc::new(HttpTransport::new(&config)?), session);

    match matches.subcommand() {
        Some(("login", sub)) => commands::account::login(&client, sub)?,
        Some(("register", sub)) => commands::account::register(&client, sub)?,
        Some(("logout", _)) => commands::account::logout(&client)?,
        Some(("whoami", _)) => commands::account::whoami(&client)?,
        Some(("dashboard", _)) => commands::dashboard::handle(&client)?,
        Some(("screener", sub)) => commands::screener::handle(&client, sub)?,
        Some(("momentum", sub)) => commands::momentum::handle(&client, sub)?,
        Some(("crossover", sub)) => commands::crossover::handle(&client, sub)?,
        Some(("alerts", sub)) => commands::alerts::handle(&client, sub)?,
        Some(("portfolio", sub)) => commands::portfolio::handle(&client, sub)?,
        Some(("admin", sub)) => commands::admin::handle(&client, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
