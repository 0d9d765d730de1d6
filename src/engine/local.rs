// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! File-backed engine keeping the whole yard in `yard.json`

use super::locks::KeyedLocks;
use super::Engine;
use crate::api::{
    AllocateRequest, AllocateResponse, CommandResponse, ConfigResponse, MessageResponse,
    ModelResponse, SaveConfigRequest, SeriesResponse, SourceRequest, SourcesResponse,
};
use crate::dependency::DependencyRef;
use crate::error::{Error, Result};
use crate::majors::Serie;
use crate::model::{
    BranchRef, CommitInfo, MainContainer, MajorContainer, MinorContainer, ReleaseEntry, Root,
    TopContainer, Version, VersionCommand,
};
use crate::policy::RepositoryConfig;
use crate::source::RepositorySource;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// File name of the store inside the data directory
pub const STORE_FILE: &str = "yard.json";

/// Committer recorded on releases cut by this engine
const COMMITTER: &str = "trunkline";

/// A repository tracked by the local engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedRepo {
    /// Identity
    pub source: RepositorySource,
    /// Release topology
    pub model: Root,
    /// Automation policy, absent until first saved
    #[serde(default)]
    pub config: Option<RepositoryConfig>,
    /// What builds of this repository depend on
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,
}

/// Everything the local engine persists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YardStore {
    /// Tracked repositories
    #[serde(default)]
    pub repos: Vec<TrackedRepo>,
    /// Major series
    #[serde(default)]
    pub series: Vec<Serie>,
}

impl YardStore {
    fn repo(&self, source: &RepositorySource) -> Result<&TrackedRepo> {
        self.repos
            .iter()
            .find(|r| &r.source == source)
            .ok_or_else(|| Error::not_found(format!("repository {source} is not tracked")))
    }

    fn repo_mut(&mut self, source: &RepositorySource) -> Result<&mut TrackedRepo> {
        self.repos
            .iter_mut()
            .find(|r| &r.source == source)
            .ok_or_else(|| Error::not_found(format!("repository {source} is not tracked")))
    }
}

/// Engine keeping its state in a JSON file.
///
/// Mutating commands hold the lock of their `(source, major)` key from
/// validation to write-back, and re-check the gates against the stored
/// state, so a command that lost a race fails with a conflict.
pub struct LocalEngine {
    path: PathBuf,
    store: Mutex<YardStore>,
    locks: KeyedLocks<(RepositorySource, u32)>,
}

impl LocalEngine {
    /// Open the store in `dir`, starting empty if it does not exist yet
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(STORE_FILE);
        let store = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Storage(format!("failed to read {}: {e}", path.display()))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                Error::Storage(format!("failed to parse {}: {e}", path.display()))
            })?
        } else {
            YardStore::default()
        };

        Ok(Self {
            path,
            store: Mutex::new(store),
            locks: KeyedLocks::new(),
        })
    }

    /// Location of the store file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read<T>(&self, f: impl FnOnce(&YardStore) -> Result<T>) -> Result<T> {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    /// Apply `f` to a copy of the store; persist and keep it only on success.
    fn update<T>(&self, f: impl FnOnce(&mut YardStore) -> Result<T>) -> Result<T> {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = store.clone();
        let out = f(&mut next)?;
        self.persist(&next)?;
        *store = next;
        Ok(out)
    }

    fn persist(&self, store: &YardStore) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                Error::Storage(format!("failed to create directory {}: {e}", dir.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(store)
            .map_err(|e| Error::Storage(format!("failed to serialize store: {e}")))?;
        fs::write(&self.path, json)
            .map_err(|e| Error::Storage(format!("failed to write {}: {e}", self.path.display())))
    }

    fn snapshot(&self, source: &RepositorySource) -> Result<Root> {
        self.read(|s| Ok(s.repo(source)?.model.clone()))
    }

    // =====================================================================
    // Administration outside the engine contract
    // =====================================================================

    /// Start tracking a repository whose trunk is at `sha`
    pub fn track(
        &self,
        source: &RepositorySource,
        trunk: &str,
        sha: &str,
        major: u32,
    ) -> Result<Root> {
        if trunk.is_empty() || sha.is_empty() {
            return Err(Error::validation("trunk name and sha must not be empty"));
        }
        self.update(|store| {
            if store.repos.iter().any(|r| &r.source == source) {
                return Err(Error::conflict(format!("{source} is already tracked")));
            }
            let model = Root {
                main: MainContainer {
                    major,
                    minors: Vec::new(),
                    main: BranchRef {
                        name: trunk.to_string(),
                        sha: sha.to_string(),
                    },
                },
                majors: Vec::new(),
            };
            store.repos.push(TrackedRepo {
                source: source.clone(),
                model: model.clone(),
                config: None,
                dependencies: Vec::new(),
            });
            info!("Tracking {} ({} at {})", source, trunk, sha);
            Ok(model)
        })
    }

    /// Move the trunk (when `major` is the trunk's) or a patch branch to `sha`
    pub fn advance(&self, source: &RepositorySource, major: u32, sha: &str) -> Result<Root> {
        if sha.is_empty() {
            return Err(Error::validation("sha must not be empty"));
        }
        self.locks.run(&(source.clone(), major), || {
            self.update(|store| {
                let root = &mut store.repo_mut(source)?.model;
                if root.main.major == major {
                    root.main.main.sha = sha.to_string();
                } else {
                    let container = root
                        .majors
                        .iter_mut()
                        .find(|m| m.major == major)
                        .ok_or_else(|| Error::validation(format!("{source} has no major {major}")))?;
                    if container.branch.is_none() {
                        return Err(Error::conflict(format!(
                            "{source} major {major} has no patch branch to advance"
                        )));
                    }
                    container.branch = Some(sha.to_string());
                }
                info!("Advanced {} major {} to {}", source, major, sha);
                Ok(root.clone())
            })
        })
    }

    /// Move the trunk to a new major; the old trunk line becomes historic.
    ///
    /// Holds the key of the current trunk major, so it serializes with
    /// releases on the trunk.
    pub fn bump_major(&self, source: &RepositorySource, major: u32) -> Result<Root> {
        let current = self.snapshot(source)?.main.major;
        self.locks.run(&(source.clone(), current), || {
            self.update(|store| {
                let root = &mut store.repo_mut(source)?.model;
                if root.main.major != current {
                    return Err(Error::conflict(format!(
                        "{source} trunk moved from major {current} to {} concurrently",
                        root.main.major
                    )));
                }
                if major <= current || root.majors.iter().any(|m| m.major == major) {
                    return Err(Error::validation(format!(
                        "new major {major} must be above the trunk's major {current}"
                    )));
                }
                let historic = MajorContainer {
                    major: current,
                    minors: std::mem::take(&mut root.main.minors),
                    branch: None,
                };
                root.majors.insert(0, historic);
                root.main.major = major;
                info!("{} trunk moved from major {} to {}", source, current, major);
                Ok(root.clone())
            })
        })
    }

    /// Record a dependency; returns the deduplicated list
    pub fn add_dependency(
        &self,
        source: &RepositorySource,
        dependency: DependencyRef,
    ) -> Result<Vec<DependencyRef>> {
        self.update(|store| {
            let repo = store.repo_mut(source)?;
            let mut all = std::mem::take(&mut repo.dependencies);
            all.push(dependency);
            repo.dependencies = DependencyRef::unique_refs(all);
            Ok(repo.dependencies.clone())
        })
    }

    /// Dependencies of a repository, each once
    pub fn dependencies(&self, source: &RepositorySource) -> Result<Vec<DependencyRef>> {
        self.read(|s| Ok(DependencyRef::unique_refs(s.repo(source)?.dependencies.clone())))
    }

    /// Create an empty major series
    pub fn create_serie(&self, id: &str) -> Result<Serie> {
        if id.is_empty() {
            return Err(Error::validation("series id must not be empty"));
        }
        self.update(|store| {
            if store.series.iter().any(|s| s.id == id) {
                return Err(Error::conflict(format!("series {id} already exists")));
            }
            let serie = Serie::new(id);
            store.series.push(serie.clone());
            Ok(serie)
        })
    }
}

/// Version the next release on `line` gets
fn next_release(line: TopContainer<'_>) -> Result<Version> {
    let major = line.major();
    let exhausted = || Error::validation(format!("major {major} has no version numbers left"));
    match (line, line.latest_release()) {
        (TopContainer::Main(_), Some((minor, _))) => Ok(Version {
            major,
            minor: minor.checked_add(1).ok_or_else(exhausted)?,
            patch: 0,
        }),
        (TopContainer::Major(_), Some((minor, last))) => Ok(Version {
            major,
            minor,
            patch: last.patch.checked_add(1).ok_or_else(exhausted)?,
        }),
        (_, None) => Ok(Version { major, minor: 0, patch: 0 }),
    }
}

/// Check a release command against the stored topology and build its entry
fn plan_release(root: &Root, cmd: &VersionCommand) -> Result<(Version, ReleaseEntry)> {
    let source = &cmd.source;
    let line = root
        .line(cmd.major)
        .ok_or_else(|| Error::validation(format!("{source} has no major {}", cmd.major)))?;

    if let Some(reason) = line.release_gate().reason() {
        return Err(Error::conflict(format!(
            "cannot release {source} major {}: {reason}",
            cmd.major
        )));
    }
    let Some(tip) = line.branch_and_sha() else {
        return Err(Error::conflict(format!(
            "cannot release {source} major {}: no branch",
            cmd.major
        )));
    };
    if let Some(expected) = &cmd.sha {
        if expected != &tip.sha {
            return Err(Error::conflict(format!(
                "{} moved from {expected} to {} since the model was fetched",
                tip.name, tip.sha
            )));
        }
    }

    let version = next_release(line)?;
    let entry = ReleaseEntry {
        patch: version.patch,
        sha: tip.sha,
        commit: Some(CommitInfo {
            committer: COMMITTER.to_string(),
            message: format!("Release {version}"),
            timestamp: Utc::now(),
        }),
    };
    Ok((version, entry))
}

/// Check a create-patch command against the stored topology; returns the start sha
fn plan_patch(root: &Root, cmd: &VersionCommand) -> Result<String> {
    let source = &cmd.source;
    if root.main.major == cmd.major {
        return Err(Error::validation(format!(
            "major {} of {source} is the trunk and has no patch branch",
            cmd.major
        )));
    }
    let container = root
        .major(cmd.major)
        .ok_or_else(|| Error::validation(format!("{source} has no major {}", cmd.major)))?;
    if let Some(reason) = container.patch_gate().reason() {
        return Err(Error::conflict(format!(
            "cannot create patch branch for {source} major {}: {reason}",
            cmd.major
        )));
    }
    cmd.sha
        .clone()
        .or_else(|| {
            TopContainer::Major(container)
                .latest_release()
                .map(|(_, r)| r.sha.clone())
        })
        .ok_or_else(|| {
            Error::validation(format!(
                "{source} major {} has no release to branch from",
                cmd.major
            ))
        })
}

fn minors_mut(root: &mut Root, major: u32) -> Option<&mut Vec<MinorContainer>> {
    if root.main.major == major {
        return Some(&mut root.main.minors);
    }
    root.majors
        .iter_mut()
        .find(|m| m.major == major)
        .map(|m| &mut m.minors)
}

/// Insert a release keeping minors and releases newest first
fn insert_release(minors: &mut Vec<MinorContainer>, minor: u32, entry: ReleaseEntry) {
    match minors.iter_mut().find(|m| m.minor == minor) {
        Some(container) => container.releases.insert(0, entry),
        None => minors.insert(
            0,
            MinorContainer {
                minor,
                releases: vec![entry],
            },
        ),
    }
}

impl Engine for LocalEngine {
    fn fetch_model(&self, req: &SourceRequest) -> Result<ModelResponse> {
        Ok(ModelResponse {
            model: self.snapshot(&req.source)?,
        })
    }

    fn fetch_config(&self, req: &SourceRequest) -> Result<ConfigResponse> {
        self.read(|s| {
            Ok(ConfigResponse {
                config: s.repo(&req.source)?.config.clone(),
            })
        })
    }

    fn save_config(&self, req: &SaveConfigRequest) -> Result<MessageResponse> {
        self.update(|store| {
            store.repo_mut(&req.source)?.config = Some(req.config.clone());
            Ok(())
        })?;
        info!("Saved configuration for {}", req.source);
        Ok(MessageResponse {
            message: format!("Saved configuration for {}", req.source),
        })
    }

    // Gates are re-checked and the result written inside one store update,
    // so no advance or bump lands between the check and the write.
    fn release(&self, cmd: &VersionCommand) -> Result<CommandResponse> {
        let source = &cmd.source;
        self.locks.run(&(source.clone(), cmd.major), || {
            let (version, sha, model) = self.update(|store| {
                let root = &mut store.repo_mut(source)?.model;
                let (version, entry) = plan_release(root, cmd)?;
                let sha = entry.sha.clone();
                let minors = minors_mut(root, cmd.major).ok_or_else(|| {
                    Error::conflict(format!("{source} major {} disappeared", cmd.major))
                })?;
                insert_release(minors, version.minor, entry);
                Ok((version, sha, root.clone()))
            })?;

            info!("Released {} of {} from {}", version, source, sha);
            Ok(CommandResponse {
                message: format!("Released {version} of {source}"),
                model,
            })
        })
    }

    fn create_patch(&self, cmd: &VersionCommand) -> Result<CommandResponse> {
        let source = &cmd.source;
        self.locks.run(&(source.clone(), cmd.major), || {
            let (sha, model) = self.update(|store| {
                let root = &mut store.repo_mut(source)?.model;
                let sha = plan_patch(root, cmd)?;
                let container = root
                    .majors
                    .iter_mut()
                    .find(|m| m.major == cmd.major)
                    .ok_or_else(|| {
                        Error::conflict(format!("{source} major {} disappeared", cmd.major))
                    })?;
                container.branch = Some(sha.clone());
                Ok((sha, root.clone()))
            })?;

            let name = crate::model::patch_branch_name(cmd.major);
            info!("Created {} of {} at {}", name, source, sha);
            Ok(CommandResponse {
                message: format!("Created {name} of {source} at {sha}"),
                model,
            })
        })
    }

    fn list_series(&self) -> Result<SeriesResponse> {
        self.read(|s| {
            Ok(SeriesResponse {
                series: s.series.clone(),
            })
        })
    }

    fn allocate(&self, req: &AllocateRequest) -> Result<AllocateResponse> {
        let value = &req.value;
        let serie = self.update(|store| {
            let slot = store
                .series
                .iter_mut()
                .find(|s| s.id == value.id)
                .ok_or_else(|| Error::not_found(format!("series {} does not exist", value.id)))?;
            *slot = slot.clone().with_value(value.value)?;
            Ok(slot.clone())
        })?;
        info!("Allocated {} in series {}", value.value, value.id);
        Ok(AllocateResponse {
            message: format!("Allocated {} in series {}", value.value, value.id),
            serie,
        })
    }

    fn list_sources(&self) -> Result<SourcesResponse> {
        self.read(|s| {
            Ok(SourcesResponse {
                sources: RepositorySource::unique(s.repos.iter().map(|r| r.source.clone())),
            })
        })
    }
}
