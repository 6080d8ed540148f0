// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use signaldesk::db;
use signaldesk::router::{RecordingNavigator, Route};
use signaldesk::session::{ACCESS_TOKEN_KEY, IS_ADMIN_KEY, Session, SqliteTokenStore, TokenStore};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn token_survives_reopening_the_database() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("signaldesk.sqlite");

    {
        let store = SqliteTokenStore::new(db::open_at(&path).unwrap());
        store.save("aaa.bbb.ccc", true).unwrap();
    }

    let conn = db::open_at(&path).unwrap();
    assert_eq!(
        db::get_setting(&conn, ACCESS_TOKEN_KEY).unwrap().as_deref(),
        Some("aaa.bbb.ccc")
    );
    assert_eq!(
        db::get_setting(&conn, IS_ADMIN_KEY).unwrap().as_deref(),
        Some("true")
    );

    let store = SqliteTokenStore::new(conn);
    assert_eq!(store.get().as_deref(), Some("aaa.bbb.ccc"));
    assert!(store.is_admin());
}

#[test]
fn admin_flag_only_counts_when_exactly_true() {
    let dir = tempdir().unwrap();
    let conn = db::open_at(&dir.path().join("state.sqlite")).unwrap();
    db::set_setting(&conn, IS_ADMIN_KEY, "yes").unwrap();
    let store = SqliteTokenStore::new(conn);
    assert!(!store.is_admin());
}

#[test]
fn logout_clears_persisted_state_and_returns_to_login() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("signaldesk.sqlite");
    let store = Arc::new(SqliteTokenStore::new(db::open_at(&path).unwrap()));
    let nav = Arc::new(RecordingNavigator::default());
    let session = Session::new(store.clone(), nav.clone());

    session.login("aaa.bbb.ccc", true).unwrap();
    session.logout();

    assert_eq!(store.get(), None);
    assert!(!store.is_admin());
    assert_eq!(nav.visits(), vec![Route::Login]);

    let conn = db::open_at(&path).unwrap();
    assert_eq!(db::get_setting(&conn, ACCESS_TOKEN_KEY).unwrap(), None);
}
