// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use signaldesk::commands::admin::load_seed_csv;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn valid_history_is_loaded_with_row_count() {
    let f = csv_file(
        "Date,Open,High,Low,Close,Volume\n\
         2024-01-02,100,105,99,104,12000\n\
         2024-01-03,104,106,101,102,9000\n",
    );
    let seed = load_seed_csv(f.path()).unwrap();
    assert_eq!(seed.rows, 2);
    assert!(seed.bytes.starts_with(b"Date,Open"));
    assert_eq!(
        seed.filename,
        f.path().file_name().unwrap().to_str().unwrap()
    );
}

#[test]
fn extra_columns_are_tolerated_and_missing_ones_named() {
    let extra = csv_file("date,open,high,low,close,volume,adj_close\n2024-01-02,1,1,1,1,1,1\n");
    assert_eq!(load_seed_csv(extra.path()).unwrap().rows, 1);

    let missing = csv_file("date,open,close\n2024-01-02,1,1\n");
    let err = load_seed_csv(missing.path()).unwrap_err().to_string();
    assert!(err.contains("high, low, volume"), "{}", err);
}

#[test]
fn header_only_file_is_rejected() {
    let f = csv_file("Date,Open,High,Low,Close,Volume\n");
    let err = load_seed_csv(f.path()).unwrap_err();
    assert_eq!(err.to_string(), "No rows found in CSV.");
}

#[test]
fn missing_file_reports_the_path() {
    let err = load_seed_csv(std::path::Path::new("/definitely/not/here.csv")).unwrap_err();
    assert!(format!("{:#}", err).contains("/definitely/not/here.csv"));
}
