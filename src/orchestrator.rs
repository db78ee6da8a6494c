//! Update orchestrator for coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination: resolve → clean → download → classify → patch
//! - The local vs. upstream version check
//! - Version agreement checks between the unpacked trees
//! - Control file regeneration from already unpacked trees

use crate::config::{Config, Layout};
use crate::control;
use crate::download::{ArtifactSource, Downloader, Gpg, HttpClient, SignatureVerifier};
use crate::error::{BuildError, Result};
use crate::patch::update_patch_version;
use crate::plugin::{load_plugins, PluginSet};
use crate::release::{
    has_update, GhReleases, ReleaseLister, UpdateStatus, Version, VersionResolver,
};
use log::info;
use std::fs;
use std::path::Path;

/// Name of the file upstream trees record their version in
const VERSION_FILE: &str = "version";

/// Read the version recorded in `<path>/version`
///
/// A missing file is an error unless `force`, in which case the version is
/// `0`. An empty file is always an error.
pub fn get_local_version(path: &Path, force: bool) -> Result<String> {
    let version_path = path.join(VERSION_FILE);
    let version = match fs::read_to_string(&version_path) {
        Ok(content) => content.trim().to_string(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && force => "0".to_string(),
        Err(e) => return Err(BuildError::io(&version_path, e)),
    };
    if version.is_empty() {
        return Err(BuildError::integrity(format!(
            "No version found (looked in {})",
            version_path.display()
        )));
    }
    Ok(version)
}

/// Check that the full and minimal trees (and `version`, when given) agree
pub fn valid_version(full_root: &Path, minimal_root: &Path, version: Option<&str>) -> Result<()> {
    let full_version = get_local_version(full_root, false)?;
    let minimal_version = get_local_version(minimal_root, false)?;
    let valid = full_version == minimal_version && version.map_or(true, |v| v == full_version);
    if !valid {
        return Err(BuildError::integrity("version validation failed"));
    }
    Ok(())
}

/// Number of entries in a directory; a missing directory counts as empty
fn count_entries(path: &Path) -> usize {
    fs::read_dir(path).map(|entries| entries.count()).unwrap_or(0)
}

/// External collaborators of a run
pub struct Services {
    pub lister: Box<dyn ReleaseLister>,
    pub source: Box<dyn ArtifactSource + Send + Sync>,
    pub verifier: Box<dyn SignatureVerifier>,
}

impl Services {
    /// The release helper, HTTP client and gpg used outside of tests
    pub fn system(layout: &Layout, config: &Config) -> Result<Self> {
        let lister = match config.release_helper {
            Some(ref helper) => GhReleases::new(helper),
            None => GhReleases::discover(),
        };
        Ok(Self {
            lister: Box::new(lister),
            source: Box::new(HttpClient::with_timeout(config.http_timeout())?),
            verifier: Box::new(Gpg::new(&layout.keyring, &layout.signing_key)),
        })
    }
}

/// Outcome of an update run
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The source tree now holds `version`
    Updated {
        previous: String,
        version: String,
        plugins: PluginSet,
        patch_summary: String,
    },
    /// Local source already holds `version`
    NothingToDo { version: String },
}

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator {
    layout: Layout,
    /// Allow forced rebuilds, downloads outside a git checkout and a missing
    /// local version
    force: bool,
    resolver: VersionResolver,
    downloader: Downloader,
}

impl Orchestrator {
    pub fn new(layout: Layout, config: Config, force: bool, services: Services) -> Self {
        let resolver = VersionResolver::new(
            services.lister,
            config.repository.clone(),
            config.stable_only,
        );
        let downloader = Downloader::new(
            layout.clone(),
            config,
            services.source,
            services.verifier,
        )
        .with_force(force);
        Self {
            layout,
            force,
            resolver,
            downloader,
        }
    }

    /// Show a download spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.downloader = self.downloader.with_progress(show_progress);
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Version of the packaged core tree
    pub fn local_version(&self) -> Result<String> {
        get_local_version(&self.layout.webmin_core, self.force)
    }

    /// Upstream versions, newest first
    pub fn remote_versions(&mut self) -> Result<Vec<String>> {
        Ok(self.resolver.remote_versions()?.to_vec())
    }

    /// Newest upstream version
    pub fn latest_version(&mut self) -> Result<String> {
        self.resolver.latest()
    }

    /// Compare the packaged version with the newest upstream version
    pub fn check(&mut self) -> Result<UpdateStatus> {
        let local = self.local_version()?;
        let remote = self.latest_version()?;
        let status = has_update(&local, &remote)?;
        let detail = format!("- local version: {}, remote version: {}", local, remote);
        match status {
            UpdateStatus::Available(_) => info!("New version available {}", detail),
            UpdateStatus::UpToDate(_) => info!("No update available {}", detail),
        }
        Ok(status)
    }

    /// Modules and themes currently in the source tree
    pub fn plugin_counts(&self) -> (usize, usize) {
        (
            count_entries(&self.layout.modules),
            count_entries(&self.layout.themes),
        )
    }

    /// Wipe and recreate every staging directory
    pub fn clean_paths(&self) -> Result<()> {
        info!("Cleaning paths");
        for path in self.layout.staging_dirs() {
            info!("- {}", path.display());
            match fs::remove_dir_all(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(BuildError::io(path, e)),
            }
            fs::create_dir_all(path).map_err(|e| BuildError::io(path, e))?;
        }
        Ok(())
    }

    /// Update the package source to `request` (`latest` or an upstream
    /// version)
    ///
    /// The same version in a different spelling (`2.0` and `2.0.0`) counts as
    /// already current.
    pub async fn update(&mut self, request: &str) -> Result<UpdateOutcome> {
        let version = self.resolver.resolve(request)?;
        let previous = self.local_version()?;
        if Version::parse(&version)? == Version::parse(&previous)? {
            if !self.force {
                info!("Nothing to do - local version already {}", version);
                return Ok(UpdateOutcome::NothingToDo { version });
            }
            info!("Forcing rebuild of version {}", version);
        }

        let (modules, themes) = self.plugin_counts();
        info!(
            "Current source {}: {} modules and {} themes",
            previous, modules, themes
        );

        // nothing is wiped unless the download would be allowed
        self.downloader.check_checkout()?;
        self.clean_paths()?;
        self.downloader.download_release(&version).await?;

        let core_tmp = self
            .layout
            .core_staging()
            .join(format!("webmin-{}", version));
        info!(
            "Moving {} to {}",
            core_tmp.display(),
            self.layout.webmin_core.display()
        );
        let webmin_core = &self.layout.webmin_core;
        fs::remove_dir(webmin_core).map_err(|e| BuildError::io(webmin_core, e))?;
        fs::rename(&core_tmp, webmin_core).map_err(|e| BuildError::io(&core_tmp, e))?;

        let full_tree = self
            .layout
            .all_staging()
            .join(format!("webmin-{}", version));
        let plugins = self.load_trees(&full_tree, webmin_core, &version, false)?;

        let patch_summary = update_patch_version(&self.layout.patch_file, &previous, &version)?;
        info!("{}", patch_summary);
        info!("Updated Webmin source to {}", version);
        info!(
            "- {} modules and {} themes",
            plugins.modules.len(),
            plugins.themes.len()
        );

        Ok(UpdateOutcome::Updated {
            previous,
            version,
            plugins,
            patch_summary,
        })
    }

    /// Move the plugins of an unpacked full tree into place
    ///
    /// Without `version` the version recorded in the full tree is used.
    pub fn load_trees(
        &self,
        full_root: &Path,
        minimal_root: &Path,
        version: &str,
        skip_validation: bool,
    ) -> Result<PluginSet> {
        let requested = (!version.is_empty()).then_some(version);
        if !skip_validation {
            valid_version(full_root, minimal_root, requested)?;
        }
        let version = match requested {
            Some(version) => version.to_string(),
            None => get_local_version(full_root, false)?,
        };
        load_plugins(minimal_root, full_root, &self.layout.root, &version)
    }

    /// Write `debian/control` for `plugins`
    pub fn write_control(&self, plugins: &PluginSet) -> Result<()> {
        control::write_control(&self.layout.control_file, plugins)
    }
}
