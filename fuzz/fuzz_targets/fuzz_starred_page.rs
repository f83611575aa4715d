// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use starshelf::classify::classify;
use starshelf::github::parse_starred_page;
use starshelf::types::KeywordRule;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(page) = parse_starred_page(body, 1, 100) {
        let rules = KeywordRule::defaults();
        for repo in &page.repos {
            assert!(!classify(repo, &rules).is_empty());
        }
    }
});
