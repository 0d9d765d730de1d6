// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Invariant tests for identities, gating and policy
//!
//! These tests verify critical invariants:
//! 1. Identity round-trips - compact and URL-segment forms decode to the source
//! 2. Dedup - first occurrence wins, order preserved, variant-aware equality
//! 3. Gating - release and patch decisions and their reasons
//! 4. Policy - first-match label resolution, series allocation

use proptest::prelude::*;
use trunkline::dependency::DependencyRef;
use trunkline::error::ErrorKind;
use trunkline::majors::Serie;
use trunkline::model::{
    can_release, BranchRef, MainContainer, MajorContainer, MinorContainer, ReleaseEntry,
    ReleaseGate, Root, TopContainer,
};
use trunkline::policy::{resolve_action, Action, BuildAutomation, LabelAction};
use trunkline::source::RepositorySource;

// =============================================================================
// Test Helpers
// =============================================================================

fn source(id: &str, path: &str) -> RepositorySource {
    RepositorySource::new(id, path).unwrap()
}

fn release(patch: u32, sha: &str) -> ReleaseEntry {
    ReleaseEntry {
        patch,
        sha: sha.into(),
        commit: None,
    }
}

fn trunk(sha: &str, last_release_sha: &str) -> MainContainer {
    MainContainer {
        major: 7,
        minors: vec![MinorContainer {
            minor: 0,
            releases: vec![release(0, last_release_sha)],
        }],
        main: BranchRef {
            name: "main".into(),
            sha: sha.into(),
        },
    }
}

/// Ids never contain '.', paths are '/'-separated non-empty segments
fn source_strategy() -> impl Strategy<Value = RepositorySource> {
    (
        "[a-z][a-z0-9_-]{0,11}",
        prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 1..4),
    )
        .prop_map(|(id, segments)| RepositorySource::new(id, segments.join("/")).unwrap())
}

// =============================================================================
// Identity Round-Trips
// =============================================================================

proptest! {
    #[test]
    fn url_segment_round_trips(s in source_strategy()) {
        prop_assert_eq!(RepositorySource::from_url_segment(&s.to_url_segment()), Some(s));
    }

    #[test]
    fn compact_form_round_trips(s in source_strategy()) {
        let parsed: RepositorySource = s.to_string().parse().unwrap();
        prop_assert_eq!(parsed, s);
    }

    #[test]
    fn unique_keeps_first_occurrences(items in prop::collection::vec(source_strategy(), 0..12)) {
        let doubled: Vec<_> = items.iter().chain(items.iter()).cloned().collect();
        let once = RepositorySource::unique(items.clone());
        prop_assert_eq!(RepositorySource::unique(doubled), once.clone());
        // Every kept source is the first occurrence in the input
        for (i, s) in once.iter().enumerate() {
            let first = items.iter().position(|x| x == s).unwrap();
            let earlier_kept = once[..i].iter().all(|k| items.iter().position(|x| x == k).unwrap() < first);
            prop_assert!(earlier_kept);
        }
    }

    #[test]
    fn next_value_exceeds_every_allocated(values in prop::collection::vec(1u32..1000, 0..20)) {
        let serie = Serie { id: "csp".into(), values: values.clone() };
        let next = serie.next_value().unwrap();
        prop_assert!(values.iter().all(|v| *v < next));
        prop_assert_eq!(next, values.iter().copied().max().unwrap_or(0) + 1);
    }
}

#[test]
fn test_parse_without_slash_is_validation_error() {
    let err = "SomethingWithoutSlash".parse::<RepositorySource>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// =============================================================================
// Dedup
// =============================================================================

#[test]
fn test_unique_sources() {
    let a = source("gerrit", "a");
    let b = source("gerrit", "b");
    let c = source("github", "a");
    let out = RepositorySource::unique(vec![a.clone(), b.clone(), c.clone(), a.clone(), b.clone(), c.clone()]);
    assert_eq!(out, vec![a, b, c]);
}

#[test]
fn test_unique_refs() {
    let g1 = DependencyRef::git(source("gerrit", "a"));
    let g2 = DependencyRef::git(source("gerrit", "b"));
    let a1 = DependencyRef::artifact("org.example", "core", "1.2.3");
    let out = DependencyRef::unique_refs(vec![g1.clone(), g2.clone(), g1.clone(), a1.clone(), a1.clone()]);
    assert_eq!(out, vec![g1, g2, a1]);
}

// =============================================================================
// Gating
// =============================================================================

#[test]
fn test_release_gating_reasons() {
    let main = trunk("S", "S");
    let line = TopContainer::Main(&main);

    let same = can_release(line, Some("S"));
    assert!(!same.is_allowed());
    assert_eq!(same.reason(), Some("nothing to release"));

    let none = can_release(line, None);
    assert!(!none.is_allowed());
    assert_eq!(none.reason(), Some("no branch"));

    assert_eq!(can_release(line, Some("T")), ReleaseGate::Allowed);
}

#[test]
fn test_patch_gating() {
    let without = MajorContainer { major: 3, minors: vec![], branch: None };
    let with = MajorContainer { major: 3, minors: vec![], branch: Some("abc".into()) };
    assert!(without.can_create_patch());
    assert!(!with.can_create_patch());
}

#[test]
fn test_latest_version_walks_supplied_order() {
    let major = MajorContainer {
        major: 2,
        minors: vec![
            MinorContainer { minor: 2, releases: vec![] },
            MinorContainer { minor: 1, releases: vec![release(3, "x")] },
        ],
        branch: None,
    };
    assert_eq!(TopContainer::Major(&major).latest_version().unwrap().to_string(), "2.1.3");
}

#[test]
fn test_root_lines_trunk_first() {
    let root = Root {
        main: trunk("T", "S"),
        majors: vec![
            MajorContainer { major: 6, minors: vec![], branch: None },
            MajorContainer { major: 5, minors: vec![], branch: Some("b".into()) },
        ],
    };
    let majors: Vec<u32> = root.lines().map(TopContainer::major).collect();
    assert_eq!(majors, vec![7, 6, 5]);
}

// =============================================================================
// Policy
// =============================================================================

#[test]
fn test_resolve_action() {
    let automation = BuildAutomation {
        default: Action::Merge,
        labels: vec![LabelAction { id: "ssa".into(), action: Action::Release }],
    };
    assert_eq!(resolve_action(&automation, "ssa"), Action::Release);
    assert_eq!(resolve_action(&automation, "other"), Action::Merge);
}

#[test]
fn test_next_value() {
    let serie = Serie { id: "csp".into(), values: vec![1, 2, 4] };
    assert_eq!(serie.next_value(), Some(5));
}
