// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiClient;
use crate::auth::{self, AuthState};
use crate::commands::require;
use crate::error::ApiError;
use crate::models::{Credentials, Registration};
use crate::router::{self, Route};
use crate::utils::{is_email, pretty_table};
use anyhow::{Result, bail};
use std::io::{self, BufRead, Write};

pub fn login(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let session = client.session();
    require(Route::Login, session)?;

    let admin = sub.get_flag("admin");
    let username = sub.get_one::<String>("username").unwrap().trim().to_string();
    let password = match sub.get_one::<String>("password") {
        Some(p) => p.clone(),
        None => prompt("Password: ")?,
    };
    let credentials = Credentials { username, password };

    let token = match client.login(&credentials, admin) {
        Ok(token) => token,
        Err(ApiError::Unauthorized | ApiError::Validation { .. }) => {
            bail!("Invalid credentials.")
        }
        Err(err) => return Err(anyhow::Error::new(err).context("Login failed")),
    };
    session.login(&token.access, token.is_admin)?;

    let landing = if admin {
        Route::AdminDashboard
    } else {
        Route::Dashboard
    };
    router::enter(landing, session);
    println!(
        "Logged in as {}{}",
        credentials.username,
        if token.is_admin { " (admin)" } else { "" }
    );
    Ok(())
}

pub fn register(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    require(Route::Register, client.session())?;

    let field = |name: &str| {
        sub.get_one::<String>(name)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    let registration = Registration {
        first_name: field("first_name"),
        last_name: field("last_name"),
        username: field("username"),
        email: field("email"),
        password: sub.get_one::<String>("password").cloned().unwrap_or_default(),
        confirm_password: sub
            .get_one::<String>("confirm_password")
            .cloned()
            .unwrap_or_default(),
    };
    if registration.password != registration.confirm_password {
        bail!("Passwords do not match.");
    }
    if !is_email(&registration.email) {
        bail!("Invalid email '{}'", registration.email);
    }

    match client.register(&registration) {
        Ok(()) => {
            router::enter(Route::Login, client.session());
            println!(
                "Registered {}. Log in with `signaldesk login --username {}`.",
                registration.username, registration.username
            );
            Ok(())
        }
        Err(ApiError::Validation { message, .. }) => bail!(registration_error(&message)),
        Err(err) => Err(anyhow::Error::new(err).context("Registration failed.")),
    }
}

pub fn registration_error(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    for key in ["username", "password", "email"] {
        let msg = parsed.as_ref().and_then(|v| v.get(key)).and_then(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => items.first().and_then(|i| i.as_str()).map(str::to_string),
            _ => None,
        });
        if let Some(msg) = msg {
            return msg;
        }
    }
    "Registration failed.".to_string()
}

pub fn logout(client: &ApiClient) -> Result<()> {
    router::enter(Route::Logout, client.session());
    println!("Logged out");
    Ok(())
}

pub fn whoami(client: &ApiClient) -> Result<()> {
    let session = client.session();
    let token = session.token();
    let state = auth::guard(session);
    let expiry = token
        .as_deref()
        .and_then(auth::session_expiry)
        .map(|e| e.to_rfc3339())
        .unwrap_or_else(|| "-".into());
    let rows = vec![
        vec![
            "Status".into(),
            match (state, token.is_some()) {
                (AuthState::Authorized, _) => "logged in".into(),
                (AuthState::Unauthorized, true) => "token expired or unreadable".into(),
                (AuthState::Unauthorized, false) => "logged out".into(),
            },
        ],
        vec!["Token expires".into(), expiry],
        vec!["Admin flag".into(), session.is_admin().to_string()],
    ];
    println!("{}", pretty_table(&["Session", ""], rows));
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub(crate) fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{} [y/N] ", question))?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}
