// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use trunkline::model::Root;
use trunkline::policy::RepositoryConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(root) = serde_json::from_slice::<Root>(data) {
        for line in root.lines() {
            let _ = line.release_gate().reason();
            let _ = line.latest_version();
        }
        for major in &root.majors {
            let _ = major.patch_gate();
        }
    }
    if let Ok(config) = serde_json::from_slice::<RepositoryConfig>(data) {
        let _ = config.build_automation.resolve("ssa");
    }
});
