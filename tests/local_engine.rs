// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Local engine tests - release lifecycle, post-hoc conflicts, races

use std::thread;
use tempfile::TempDir;
use trunkline::api::{AllocateRequest, SaveConfigRequest, SourceRequest};
use trunkline::dependency::DependencyRef;
use trunkline::engine::{Engine, LocalEngine};
use trunkline::error::ErrorKind;
use trunkline::majors::MajorValue;
use trunkline::model::{Root, TopContainer, VersionCommand};
use trunkline::policy::{Action, RepositoryConfig};
use trunkline::source::RepositorySource;

fn source() -> RepositorySource {
    RepositorySource::new("gerrit", "platform/core").unwrap()
}

fn model(engine: &LocalEngine) -> Root {
    engine
        .fetch_model(&SourceRequest { source: source() })
        .unwrap()
        .model
}

/// Trunk at major 2 with 1.0.0 and 1.1.0 released before the bump
fn setup(dir: &TempDir) -> LocalEngine {
    let engine = LocalEngine::open(dir.path()).unwrap();
    engine.track(&source(), "main", "c1", 1).unwrap();

    let m = model(&engine);
    engine
        .release(&m.release_command(&source(), 1).unwrap())
        .unwrap();
    engine.advance(&source(), 1, "c2").unwrap();
    let m = model(&engine);
    engine
        .release(&m.release_command(&source(), 1).unwrap())
        .unwrap();
    engine.bump_major(&source(), 2).unwrap();
    engine.advance(&source(), 2, "c3").unwrap();
    engine
}

#[test]
fn test_release_lifecycle() {
    let dir = TempDir::new().unwrap();
    let engine = setup(&dir);
    let root = model(&engine);

    assert_eq!(root.main.major, 2);
    assert!(root.main.minors.is_empty());
    let historic = root.major(1).unwrap();
    assert_eq!(
        TopContainer::Major(historic).latest_version().unwrap().to_string(),
        "1.1.0"
    );
    assert_eq!(historic.minors[0].minor, 1);
    assert_eq!(historic.minors[1].minor, 0);

    let response = engine
        .release(&root.release_command(&source(), 2).unwrap())
        .unwrap();
    assert_eq!(response.message, "Released 2.0.0 of gerrit/platform/core");
    let release = &response.model.main.minors[0].releases[0];
    assert_eq!(release.sha, "c3");
    assert!(release.commit.is_some());
}

#[test]
fn test_patch_branch_then_patch_release() {
    let dir = TempDir::new().unwrap();
    let engine = setup(&dir);
    let root = model(&engine);

    // No patch branch yet, so no release on major 1
    let err = root.release_command(&source(), 1).unwrap_err();
    assert!(err.to_string().contains("no branch"));

    let cmd = root.patch_command(&source(), 1).unwrap();
    assert_eq!(cmd.sha.as_deref(), Some("c2"));
    let created = engine.create_patch(&cmd).unwrap();
    assert_eq!(created.model.major(1).unwrap().branch.as_deref(), Some("c2"));

    // Branch tip is the last release: nothing to release yet
    let err = created.model.release_command(&source(), 1).unwrap_err();
    assert!(err.to_string().contains("nothing to release"));

    engine.advance(&source(), 1, "fix1").unwrap();
    let root = model(&engine);
    let released = engine
        .release(&root.release_command(&source(), 1).unwrap())
        .unwrap();
    let major = released.model.major(1).unwrap();
    assert_eq!(
        TopContainer::Major(major).latest_version().unwrap().to_string(),
        "1.1.1"
    );
}

#[test]
fn test_engine_rejects_stale_commands() {
    let dir = TempDir::new().unwrap();
    let engine = setup(&dir);
    let stale = model(&engine);

    // Create the patch branch, then replay the same command
    let cmd = stale.patch_command(&source(), 1).unwrap();
    engine.create_patch(&cmd).unwrap();
    let err = engine.create_patch(&cmd).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Release validated against a trunk tip that has since moved
    let release = stale.release_command(&source(), 2).unwrap();
    engine.advance(&source(), 2, "c4").unwrap();
    let err = engine.release(&release).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("moved"));

    // Replaying a release that already happened
    let fresh = model(&engine).release_command(&source(), 2).unwrap();
    engine.release(&fresh).unwrap();
    let err = engine.release(&fresh).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_concurrent_patch_creation_single_winner() {
    let dir = TempDir::new().unwrap();
    let engine = setup(&dir);
    let cmd = model(&engine).patch_command(&source(), 1).unwrap();

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| engine.create_patch(&cmd)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    for result in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(result.kind(), ErrorKind::Conflict);
    }
}

#[test]
fn test_concurrent_releases_single_winner() {
    let dir = TempDir::new().unwrap();
    let engine = setup(&dir);
    let cmd = model(&engine).release_command(&source(), 2).unwrap();

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| engine.release(&cmd)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(model(&engine).main.minors[0].releases.len(), 1);
}

#[test]
fn test_concurrent_bumps_single_winner() {
    let dir = TempDir::new().unwrap();
    let engine = setup(&dir);

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| engine.bump_major(&source(), 3)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let root = model(&engine);
    assert_eq!(root.main.major, 3);
    let majors: Vec<u32> = root.majors.iter().map(|m| m.major).collect();
    assert_eq!(majors, vec![2, 1]);
}

#[test]
fn test_release_on_unknown_major_is_validation() {
    let dir = TempDir::new().unwrap();
    let engine = setup(&dir);
    let cmd = VersionCommand {
        source: source(),
        major: 9,
        sha: None,
    };
    assert_eq!(engine.release(&cmd).unwrap_err().kind(), ErrorKind::Validation);
    assert_eq!(engine.create_patch(&cmd).unwrap_err().kind(), ErrorKind::Validation);
}

#[test]
fn test_config_round_trip_and_not_found() {
    let dir = TempDir::new().unwrap();
    let engine = setup(&dir);
    let req = SourceRequest { source: source() };
    assert!(engine.fetch_config(&req).unwrap().config.is_none());

    let config = RepositoryConfig::default()
        .map_automation(|a| a.with_label("ssa", Action::Release))
        .with_major_serie("csp", false);
    engine
        .save_config(&SaveConfigRequest {
            source: source(),
            config: config.clone(),
        })
        .unwrap();

    let reopened = LocalEngine::open(dir.path()).unwrap();
    assert_eq!(reopened.fetch_config(&req).unwrap().config, Some(config));
}

#[test]
fn test_series_allocation() {
    let dir = TempDir::new().unwrap();
    let engine = setup(&dir);
    engine.create_serie("csp").unwrap();
    assert_eq!(engine.create_serie("csp").unwrap_err().kind(), ErrorKind::Conflict);

    let alloc = |value| {
        engine.allocate(&AllocateRequest {
            value: MajorValue { id: "csp".into(), value },
        })
    };
    alloc(1).unwrap();
    alloc(4).unwrap();
    assert_eq!(alloc(4).unwrap_err().kind(), ErrorKind::Conflict);

    let series = engine.list_series().unwrap().series;
    assert_eq!(series[0].values, vec![1, 4]);
    assert_eq!(series[0].next_value(), Some(5));

    let missing = engine.allocate(&AllocateRequest {
        value: MajorValue { id: "nope".into(), value: 1 },
    });
    assert_eq!(missing.unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_dependencies_are_deduplicated() {
    let dir = TempDir::new().unwrap();
    let engine = setup(&dir);
    let lib = DependencyRef::git(RepositorySource::new("gerrit", "platform/lib").unwrap());
    let artifact = DependencyRef::artifact("org.example", "codec", "3.1.0");

    engine.add_dependency(&source(), lib.clone()).unwrap();
    engine.add_dependency(&source(), artifact.clone()).unwrap();
    let deps = engine.add_dependency(&source(), lib.clone()).unwrap();
    assert_eq!(deps, vec![lib, artifact]);
}

#[test]
fn test_sources_listed_once() {
    let dir = TempDir::new().unwrap();
    let engine = setup(&dir);
    engine
        .track(&RepositorySource::new("gerrit", "platform/ui").unwrap(), "main", "u1", 1)
        .unwrap();
    let sources = engine.list_sources().unwrap().sources;
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0], source());
}
