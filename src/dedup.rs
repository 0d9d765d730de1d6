// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Order-preserving deduplication

use std::collections::HashSet;
use std::hash::Hash;

/// Keep the first occurrence of every distinct item, in order of appearance.
///
/// Distinctness is value equality (`Eq` + `Hash`), never identity.
pub fn first_occurrences<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
