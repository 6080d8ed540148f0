// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::{self, AuthState};
use crate::session::Session;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    AdminDashboard,
    Dashboard,
    Momentum,
    Crossover,
    Screener,
    Portfolio,
    Alerts,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Admin,
    Protected,
    Logout,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Login,
        Route::Register,
        Route::AdminDashboard,
        Route::Dashboard,
        Route::Momentum,
        Route::Crossover,
        Route::Screener,
        Route::Portfolio,
        Route::Alerts,
        Route::Logout,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Register => "/register",
            Route::AdminDashboard => "/admin-dashboard",
            Route::Dashboard => "/dashboard",
            Route::Momentum => "/golden-cross-momentum",
            Route::Crossover => "/ma-crossover",
            Route::Screener => "/stock-screener",
            Route::Portfolio => "/my-stocks",
            Route::Alerts => "/alert",
            Route::Logout => "/logout",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        Route::ALL.into_iter().find(|r| r.path() == normalized)
    }

    pub fn access(self) -> Access {
        match self {
            Route::Login | Route::Register => Access::Public,
            Route::AdminDashboard => Access::Admin,
            Route::Logout => Access::Logout,
            _ => Access::Protected,
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

pub fn resolve(requested: Route, session: &Session) -> Route {
    let granted = match requested.access() {
        Access::Public => true,
        Access::Admin => auth::admin_gate(session) == AuthState::Authorized,
        Access::Protected => auth::guard(session) == AuthState::Authorized,
        Access::Logout => {
            session.logout();
            return Route::Login;
        }
    };
    if granted {
        requested
    } else {
        debug!(path = requested.path(), "access denied; rendering login");
        Route::Login
    }
}

pub fn enter(requested: Route, session: &Session) -> Route {
    let landed = resolve(requested, session);
    // Logout has already moved the navigator.
    if requested.access() != Access::Logout {
        session.navigator().navigate(landed);
    }
    landed
}

pub struct ConsoleNavigator {
    current: Mutex<Option<Route>>,
}

impl ConsoleNavigator {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<Route> {
        self.current.lock().ok().and_then(|c| *c)
    }
}

impl Default for ConsoleNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };
        let previous = current.replace(route);
        if route == Route::Login && previous.is_some_and(|p| p != Route::Login) {
            eprintln!("Session ended. Log in again with `signaldesk login`.");
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<Route> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(route);
        }
    }
}
