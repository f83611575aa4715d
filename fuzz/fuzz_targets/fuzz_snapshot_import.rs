// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell
#![no_main]

use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use starshelf::store::Store;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(dir) = tempfile::TempDir::new() else {
        return;
    };
    let store = Store::open(dir.path());
    if store.import_snapshot(json, Utc::now()).is_err() {
        // A rejected snapshot writes nothing
        assert!(store.load_repositories().is_empty());
    }
});
