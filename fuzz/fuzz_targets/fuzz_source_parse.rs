// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use trunkline::dependency::DependencyRef;
use trunkline::source::RepositorySource;

fuzz_target!(|data: &str| {
    if let Ok(source) = data.parse::<RepositorySource>() {
        let again: RepositorySource = source.to_string().parse().unwrap();
        assert_eq!(again, source);
    }
    if let Some(source) = RepositorySource::from_url_segment(data) {
        assert!(!source.id().is_empty());
        assert!(!source.path().is_empty());
    }
    if let Ok(dep) = data.parse::<DependencyRef>() {
        let _ = dep.to_string();
    }
});
