// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, value_parser};

fn json_flag() -> Arg {
    arg!(--json "Print JSON instead of a table")
}

fn symbol_arg() -> Arg {
    arg!(--symbol <SYMBOL> "Stock symbol (defaults to the first listed)").required(false)
}

fn named(id: &'static str, long: &'static str, value: &'static str) -> Arg {
    Arg::new(id).long(long).value_name(value)
}

pub fn build_cli() -> Command {
    Command::new("signaldesk")
        .about("Stock signal terminal: screener, momentum and crossover signals, alerts, portfolio")
        .version(clap::crate_version!())
        .arg(
            named("api_url", "api-url", "URL")
                .help("Backend base URL for this invocation")
                .global(true),
        )
        .arg(
            arg!(-v --verbose ... "Increase log output")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(Command::new("init").about("Create the local state database"))
        .subcommand(
            Command::new("config")
                .about("Client settings")
                .subcommand(
                    Command::new("set-url").arg(arg!(<url> "Backend base URL").required(true)),
                )
                .subcommand(
                    Command::new("set-timeout")
                        .arg(arg!(<seconds> "Request timeout in seconds").required(true)),
                )
                .subcommand(Command::new("show")),
        )
        .subcommand(
            Command::new("login")
                .about("Log in and store the session token")
                .arg(arg!(--username <USERNAME>).required(true))
                .arg(arg!(--password <PASSWORD> "Prompted for when omitted").required(false))
                .arg(arg!(--admin "Use the admin login endpoint")),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account")
                .arg(named("first_name", "first-name", "FIRST").required(true))
                .arg(named("last_name", "last-name", "LAST").required(true))
                .arg(arg!(--username <USERNAME>).required(true))
                .arg(arg!(--email <EMAIL>).required(true))
                .arg(arg!(--password <PASSWORD>).required(true))
                .arg(named("confirm_password", "confirm-password", "PASSWORD").required(true)),
        )
        .subcommand(Command::new("logout").about("Forget the stored session"))
        .subcommand(Command::new("whoami").about("Show the stored session"))
        .subcommand(Command::new("dashboard").about("Session and market summary"))
        .subcommand(
            Command::new("screener")
                .about("Latest close, change and volatility per stock")
                .arg(
                    arg!(--sort <KEY> "symbol | change | volume | volatility")
                        .required(false),
                )
                .arg(arg!(--gainers "Only stocks that closed up").conflicts_with("losers"))
                .arg(arg!(--losers "Only stocks that closed down"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("momentum")
                .about("Golden-cross momentum and RSI for one symbol")
                .arg(symbol_arg())
                .arg(
                    arg!(--rows <N> "Number of recent rows to show")
                        .required(false)
                        .value_parser(value_parser!(usize)),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("crossover")
                .about("Moving-average crossover signals for one symbol")
                .arg(symbol_arg())
                .arg(
                    arg!(--strategy <STRATEGY> "golden_cross | ema_short | ema_medium")
                        .required(false),
                )
                .arg(
                    arg!(--runs <N> "Number of recent signals to show")
                        .required(false)
                        .value_parser(value_parser!(usize)),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("alerts")
                .about("Signal overview across every symbol")
                .arg(arg!(--only <SIDE> "buy | sell").required(false))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("portfolio")
                .about("Your investments")
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--symbol <SYMBOL>).required(true))
                        .arg(arg!(--price <PRICE>).required(true))
                        .arg(arg!(--qty <QTY>).required(true))
                        .arg(arg!(--date <DATE> "YYYY-MM-DD, defaults to today").required(false)),
                )
                .subcommand(
                    Command::new("sell")
                        .arg(arg!(--id <ID>).required(true))
                        .arg(arg!(--price <PRICE>).required(true))
                        .arg(arg!(--date <DATE> "YYYY-MM-DD, defaults to today").required(false)),
                ),
        )
        .subcommand(
            Command::new("admin")
                .about("Administration (admin session required)")
                .subcommand(Command::new("users").arg(json_flag()))
                .subcommand(
                    Command::new("create-user")
                        .arg(arg!(--username <USERNAME>).required(true))
                        .arg(arg!(--email <EMAIL>).required(true))
                        .arg(named("first_name", "first-name", "FIRST").required(false))
                        .arg(named("last_name", "last-name", "LAST").required(false))
                        .arg(arg!(--password <PASSWORD>).required(true))
                        .arg(named("confirm_password", "confirm-password", "PASSWORD").required(true)),
                )
                .subcommand(
                    Command::new("delete-user")
                        .arg(arg!(--id <ID>).required(true))
                        .arg(arg!(--yes "Skip the confirmation prompt")),
                )
                .subcommand(
                    Command::new("seed")
                        .about("Replace a stock's price history from a CSV file")
                        .arg(arg!(--title <SYMBOL>).required(true))
                        .arg(arg!(--csv <PATH>).required(true)),
                ),
        )
}
