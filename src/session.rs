// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{delete_setting, get_setting, set_setting};
use crate::router::{Navigator, Route};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const IS_ADMIN_KEY: &str = "is_admin";

pub trait TokenStore: Send + Sync {
    fn save(&self, token: &str, is_admin: bool) -> Result<()>;
    fn get(&self) -> Option<String>;
    fn is_admin(&self) -> bool;
    fn clear(&self);
}

pub struct SqliteTokenStore {
    conn: Mutex<Connection>,
}

impl SqliteTokenStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(_) => {
                warn!("token store lock poisoned");
                return None;
            }
        };
        match get_setting(&conn, key) {
            Ok(v) => v,
            Err(err) => {
                warn!(key, error = %err, "failed to read token store");
                None
            }
        }
    }
}

impl TokenStore for SqliteTokenStore {
    fn save(&self, token: &str, is_admin: bool) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("token store lock poisoned"))?;
        let tx = conn.unchecked_transaction()?;
        set_setting(&tx, ACCESS_TOKEN_KEY, token)?;
        set_setting(&tx, IS_ADMIN_KEY, if is_admin { "true" } else { "false" })?;
        tx.commit()?;
        Ok(())
    }

    fn get(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    fn is_admin(&self) -> bool {
        self.read(IS_ADMIN_KEY).as_deref() == Some("true")
    }

    fn clear(&self) {
        let Ok(conn) = self.conn.lock() else {
            warn!("token store lock poisoned");
            return;
        };
        for key in [ACCESS_TOKEN_KEY, IS_ADMIN_KEY] {
            if let Err(err) = delete_setting(&conn, key) {
                warn!(key, error = %err, "failed to clear token store");
            }
        }
    }
}

#[derive(Debug, Default)]
struct Stored {
    token: Option<String>,
    is_admin: bool,
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Stored>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str, is_admin: bool) -> Self {
        Self {
            inner: Mutex::new(Stored {
                token: Some(token.to_string()),
                is_admin,
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str, is_admin: bool) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("token store lock poisoned"))?;
        inner.token = Some(token.to_string());
        inner.is_admin = is_admin;
        Ok(())
    }

    fn get(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|s| s.token.clone())
    }

    fn is_admin(&self) -> bool {
        self.inner.lock().map(|s| s.is_admin).unwrap_or(false)
    }

    fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            *inner = Stored::default();
        }
    }
}

pub struct Session {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    expired: AtomicBool,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            expired: AtomicBool::new(false),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.store.get()
    }

    pub fn is_admin(&self) -> bool {
        self.store.is_admin()
    }

    pub fn store(&self) -> &dyn TokenStore {
        self.store.as_ref()
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    pub fn login(&self, token: &str, is_admin: bool) -> Result<()> {
        self.store.save(token, is_admin)?;
        self.expired.store(false, Ordering::SeqCst);
        debug!(is_admin, "session started");
        Ok(())
    }

    pub fn logout(&self) {
        self.store.clear();
        self.navigator.navigate(Route::Login);
        debug!("session cleared by logout");
    }

    /// Only the first call after a login clears the store and navigates;
    /// returns whether this call did so.
    pub fn expire(&self) -> bool {
        if self.expired.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.store.clear();
        self.navigator.navigate(Route::Login);
        warn!("backend returned 401; session cleared");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::router::RecordingNavigator;

    fn sqlite_store() -> SqliteTokenStore {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        SqliteTokenStore::new(conn)
    }

    #[test]
    fn sqlite_store_round_trips_and_clears() {
        let store = sqlite_store();
        assert_eq!(store.get(), None);
        assert!(!store.is_admin());

        store.save("abc.def.ghi", true).unwrap();
        assert_eq!(store.get().as_deref(), Some("abc.def.ghi"));
        assert!(store.is_admin());

        store.save("second", false).unwrap();
        assert_eq!(store.get().as_deref(), Some("second"));
        assert!(!store.is_admin());

        store.clear();
        assert_eq!(store.get(), None);
        assert!(!store.is_admin());
    }

    #[test]
    fn expire_fires_once_until_next_login() {
        let store = Arc::new(MemoryTokenStore::with_token("t", false));
        let nav = Arc::new(RecordingNavigator::default());
        let session = Session::new(store.clone(), nav.clone());

        assert!(session.expire());
        assert!(!session.expire());
        assert_eq!(store.get(), None);
        assert_eq!(nav.visits(), vec![Route::Login]);

        session.login("fresh", false).unwrap();
        assert!(session.expire());
        assert_eq!(nav.visits().len(), 2);
    }
}
