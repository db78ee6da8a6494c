//! Upstream release resolution
//!
//! This module provides:
//! - Version parsing and ordering for upstream tags
//! - The release listing helper integration
//! - Resolution of "latest" or explicit version requests
//! - The local vs. remote update decision

mod lister;
mod version;

pub use lister::{GhReleases, ReleaseLister, HELPER_NAME};
pub use version::{Phase, Version};

use crate::error::{BuildError, Result};
use log::info;
use std::collections::BTreeMap;

/// Request string that selects the newest upstream release
pub const LATEST: &str = "latest";

/// Return upstream versions, newest first
///
/// Every tag must parse as a version. Versions that compare equal collapse
/// into one entry which keeps the literal of the last tag seen.
pub fn list_remote_versions(
    lister: &dyn ReleaseLister,
    repository: &str,
    stable_only: bool,
) -> Result<Vec<String>> {
    let mut versions: BTreeMap<Version, String> = BTreeMap::new();
    for tag in lister.list_releases(repository)? {
        let version = Version::parse(&tag)?;
        if stable_only && version.is_prerelease() {
            continue;
        }
        // BTreeMap::insert keeps the original key, so replace both
        versions.remove(&version);
        versions.insert(version, tag);
    }

    if versions.is_empty() {
        return Err(BuildError::integrity(format!(
            "remote version not found for {}",
            repository
        )));
    }

    Ok(versions.into_values().rev().collect())
}

/// Outcome of comparing the packaged version against upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Upstream is newer; carries the upstream version
    Available(String),
    /// Local source already matches upstream
    UpToDate(String),
}

impl UpdateStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, UpdateStatus::Available(_))
    }

    pub fn version(&self) -> &str {
        match self {
            UpdateStatus::Available(v) | UpdateStatus::UpToDate(v) => v,
        }
    }
}

/// Decide whether `remote` is an update over `local`
///
/// A local version newer than upstream is an error.
pub fn has_update(local: &str, remote: &str) -> Result<UpdateStatus> {
    let local_v = Version::parse(local)?;
    let remote_v = Version::parse(remote)?;
    if local_v < remote_v {
        Ok(UpdateStatus::Available(remote.to_string()))
    } else if local_v == remote_v {
        Ok(UpdateStatus::UpToDate(remote.to_string()))
    } else {
        Err(BuildError::integrity(format!(
            "local Webmin version ({}) is newer than remote ({}) - this should never happen",
            local, remote
        )))
    }
}

/// Resolves version requests against the upstream release list
///
/// The release list is fetched once and reused for later requests.
pub struct VersionResolver {
    lister: Box<dyn ReleaseLister>,
    repository: String,
    stable_only: bool,
    remote_versions: Vec<String>,
}

impl VersionResolver {
    pub fn new(
        lister: Box<dyn ReleaseLister>,
        repository: impl Into<String>,
        stable_only: bool,
    ) -> Self {
        Self {
            lister,
            repository: repository.into(),
            stable_only,
            remote_versions: Vec::new(),
        }
    }

    /// Upstream versions, newest first
    pub fn remote_versions(&mut self) -> Result<&[String]> {
        if self.remote_versions.is_empty() {
            info!("Checking for new upstream versions - please wait...");
            self.remote_versions =
                list_remote_versions(self.lister.as_ref(), &self.repository, self.stable_only)?;
        }
        Ok(&self.remote_versions)
    }

    /// Resolve `latest` or an explicit version that upstream has released
    pub fn resolve(&mut self, request: &str) -> Result<String> {
        let versions = self.remote_versions()?;
        if request == LATEST {
            // list_remote_versions never returns an empty list
            return Ok(versions[0].clone());
        }
        if versions.iter().any(|v| v == request) {
            return Ok(request.to_string());
        }
        Err(BuildError::VersionNotFound {
            requested: request.to_string(),
            available: versions.to_vec(),
        })
    }

    /// Newest upstream version
    pub fn latest(&mut self) -> Result<String> {
        self.resolve(LATEST)
    }
}
