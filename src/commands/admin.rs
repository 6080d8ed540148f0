// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiClient;
use crate::commands::account::confirm;
use crate::commands::require;
use crate::models::{AdminUser, NewUser};
use crate::pages::load;
use crate::router::Route;
use crate::utils::{is_email, maybe_print_json, pretty_table};
use anyhow::{Context, Result, anyhow, bail};
use csv::ReaderBuilder;
use std::path::Path;

pub const SEED_COLUMNS: [(&str, &str); 6] = [
    ("Date", "date"),
    ("Open", "open"),
    ("High", "high"),
    ("Low", "low"),
    ("Close", "close"),
    ("Volume", "volume"),
];

pub fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    require(Route::AdminDashboard, client.session())?;
    match m.subcommand() {
        Some(("users", sub)) => list_users(client, sub.get_flag("json"))?,
        Some(("create-user", sub)) => create_user(client, sub)?,
        Some(("delete-user", sub)) => delete_user(client, sub)?,
        Some(("seed", sub)) => seed(client, sub)?,
        _ => list_users(client, false)?,
    }
    Ok(())
}

fn list_users(client: &ApiClient, json: bool) -> Result<()> {
    load(
        "users",
        || client.admin_users(),
        |u| u.is_empty(),
        "No users found.",
    )
    .finish(|users| {
        if maybe_print_json(json, &users)? {
            return Ok(());
        }
        println!("{}", users_table(&users));
        Ok(())
    })
}

fn users_table(users: &[AdminUser]) -> comfy_table::Table {
    let rows = users
        .iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.username.clone(),
                u.email.clone(),
                format!("{} {}", u.first_name, u.last_name).trim().to_string(),
                if u.is_active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    pretty_table(&["ID", "Username", "Email", "Name", "Active"], rows)
}

fn create_user(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let field = |name: &str| {
        sub.get_one::<String>(name)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    let user = NewUser {
        username: field("username"),
        email: field("email"),
        first_name: field("first_name"),
        last_name: field("last_name"),
        password: sub.get_one::<String>("password").cloned().unwrap_or_default(),
        confirm_password: sub
            .get_one::<String>("confirm_password")
            .cloned()
            .unwrap_or_default(),
    };
    if user.username.is_empty() {
        bail!("Username is required");
    }
    if user.password != user.confirm_password {
        bail!("Passwords do not match.");
    }
    if !is_email(&user.email) {
        bail!("Invalid email '{}'", user.email);
    }

    client
        .admin_create_user(&user)
        .with_context(|| format!("Failed to create user '{}'", user.username))?;
    println!("Created user {}", user.username);
    list_users(client, false)
}

fn delete_user(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let raw = sub.get_one::<String>("id").unwrap().trim();
    let id: i64 = raw
        .parse()
        .with_context(|| format!("Invalid user id '{}'", raw))?;
    if !sub.get_flag("yes") && !confirm(&format!("Delete user {}?", id))? {
        println!("Aborted");
        return Ok(());
    }
    client
        .admin_delete_user(id)
        .with_context(|| format!("Failed to delete user {}", id))?;
    println!("Deleted user {}", id);
    list_users(client, false)
}

#[derive(Debug)]
pub struct SeedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub rows: usize,
}

pub fn load_seed_csv(path: &Path) -> Result<SeedFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Open CSV {}", path.display()))?;
    let rows = check_seed_csv(&bytes)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("prices.csv")
        .to_string();
    Ok(SeedFile {
        filename,
        bytes,
        rows,
    })
}

pub fn check_seed_csv(bytes: &[u8]) -> Result<usize> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let headers = rdr.headers().context("Read CSV header")?.clone();
    let missing: Vec<&str> = SEED_COLUMNS
        .iter()
        .filter(|(upper, lower)| !headers.iter().any(|h| h.trim() == *upper || h.trim() == *lower))
        .map(|(_, lower)| *lower)
        .collect();
    if !missing.is_empty() {
        return Err(anyhow!("CSV is missing columns: {}", missing.join(", ")));
    }

    let mut rows = 0usize;
    for record in rdr.records() {
        let record = record.with_context(|| format!("Malformed CSV row {}", rows + 2))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows += 1;
    }
    if rows == 0 {
        bail!("No rows found in CSV.");
    }
    Ok(rows)
}

fn seed(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let title = sub.get_one::<String>("title").unwrap().trim().to_string();
    if title.is_empty() {
        bail!("Stock title is required");
    }
    let path = sub.get_one::<String>("csv").unwrap().trim();
    let file = load_seed_csv(Path::new(path))?;
    eprintln!("Uploading {} rows for {}…", file.rows, title.to_uppercase());

    let report = client
        .admin_seed_stocks(&title, &file.filename, file.bytes)
        .with_context(|| format!("Failed to seed {}", title))?;
    if let Some(message) = &report.message {
        println!("{}", message);
    }
    println!(
        "{}",
        pretty_table(
            &["Stock", "Deleted", "Created", "Errors"],
            vec![vec![
                title.to_uppercase(),
                report.deleted_count.to_string(),
                report.records_created.to_string(),
                report.errors.len().to_string(),
            ]],
        )
    );
    for err in &report.errors {
        eprintln!("  {}", err);
    }
    Ok(())
}
