// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::router::{self, Access, Route};
use crate::session::Session;
use anyhow::{Result, bail};

pub mod account;
pub mod admin;
pub mod alerts;
pub mod crossover;
pub mod dashboard;
pub mod momentum;
pub mod portfolio;
pub mod screener;
pub mod settings;

pub fn require(route: Route, session: &Session) -> Result<()> {
    if router::enter(route, session) == route {
        return Ok(());
    }
    match route.access() {
        Access::Admin => bail!("Admin access required. Log in with `signaldesk login --admin`."),
        _ => bail!("Login required. Run `signaldesk login` first."),
    }
}
