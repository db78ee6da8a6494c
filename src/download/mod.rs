//! Download, validation and extraction of upstream release archives
//!
//! Each release ships two archives, the full tree (`webmin-<v>.tar.gz`) and
//! the core tree (`webmin-<v>-minimal.tar.gz`), each with a detached
//! signature published on a separate origin.

mod archive;
mod gpg;
mod http;

pub use archive::extract;
pub use gpg::{Gpg, SignatureVerifier};
pub use http::{ArtifactSource, HttpClient};

use crate::config::{Config, Layout};
use crate::error::{BuildError, Result};
use crate::progress::DownloadSpinner;
use log::info;
use std::path::PathBuf;

/// One release archive and its signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Archive base name, e.g. `webmin-2.105-minimal`
    pub name: String,
    /// Whether this is the core-only archive
    pub minimal: bool,
}

impl Artifact {
    /// The full and minimal archives of a release, in download order
    pub fn for_version(version: &str) -> [Artifact; 2] {
        [
            Artifact {
                name: format!("webmin-{}", version),
                minimal: false,
            },
            Artifact {
                name: format!("webmin-{}-minimal", version),
                minimal: true,
            },
        ]
    }

    pub fn tarball(&self) -> String {
        format!("{}.tar.gz", self.name)
    }

    pub fn signature(&self) -> String {
        format!("{}-sig.asc", self.tarball())
    }

    pub fn archive_url(&self, config: &Config, version: &str) -> String {
        format!(
            "{}/{}/{}",
            config.release_url.trim_end_matches('/'),
            version,
            self.tarball()
        )
    }

    pub fn signature_url(&self, config: &Config) -> String {
        format!(
            "{}/{}",
            config.signature_url.trim_end_matches('/'),
            self.signature()
        )
    }

    /// Where the archive is unpacked: `tmp/core` or `tmp/all`
    pub fn staging_dir(&self, layout: &Layout) -> PathBuf {
        if self.minimal {
            layout.core_staging()
        } else {
            layout.all_staging()
        }
    }
}

/// Fetches, verifies and unpacks the archives of one release
pub struct Downloader {
    layout: Layout,
    config: Config,
    source: Box<dyn ArtifactSource + Send + Sync>,
    verifier: Box<dyn SignatureVerifier>,
    force: bool,
    show_progress: bool,
}

impl Downloader {
    pub fn new(
        layout: Layout,
        config: Config,
        source: Box<dyn ArtifactSource + Send + Sync>,
        verifier: Box<dyn SignatureVerifier>,
    ) -> Self {
        Self {
            layout,
            config,
            source,
            verifier,
            force: false,
            show_progress: false,
        }
    }

    /// Allow downloading outside a git checkout and overwriting staging dirs
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Downloads overwrite the working tree, so only do it where git can
    /// bring the old content back
    pub fn check_checkout(&self) -> Result<()> {
        if !self.layout.is_git_checkout() && !self.force {
            return Err(BuildError::environment(
                "No '.git' dir found - not downloading new files without force",
            ));
        }
        Ok(())
    }

    /// Download an artifact and its signature into the staging directory
    pub async fn fetch(&self, artifact: &Artifact, version: &str) -> Result<(PathBuf, PathBuf)> {
        let downloads = [
            (artifact.tarball(), artifact.archive_url(&self.config, version)),
            (artifact.signature(), artifact.signature_url(&self.config)),
        ];

        let mut paths = Vec::with_capacity(downloads.len());
        for (file, url) in downloads {
            let path = self.layout.tmp.join(&file);
            info!("- downloading {} ({})", file, url);
            let spinner = DownloadSpinner::start(&file, self.show_progress);
            let result = self.source.download(&url, &path).await;
            drop(spinner);
            result?;
            paths.push(path);
        }

        let signature = paths.pop().unwrap_or_default();
        let tarball = paths.pop().unwrap_or_default();
        Ok((tarball, signature))
    }

    /// Download, verify and unpack both archives of `version`
    pub async fn download_release(&self, version: &str) -> Result<()> {
        self.check_checkout()?;
        info!("Downloading and validating files for version: {}", version);
        std::fs::create_dir_all(&self.layout.tmp)
            .map_err(|e| BuildError::io(&self.layout.tmp, e))?;

        for artifact in Artifact::for_version(version) {
            let (tarball, signature) = self.fetch(&artifact, version).await?;

            info!(
                "- validating {} (signature file: {})",
                artifact.tarball(),
                artifact.signature()
            );
            self.verifier.verify(&tarball, &signature)?;

            let dest = artifact.staging_dir(&self.layout);
            info!("- unpacking {} to {}", artifact.tarball(), dest.display());
            extract(&tarball, &dest, self.force)?;
        }
        Ok(())
    }
}
