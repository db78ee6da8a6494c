//! Working tree layout and upstream configuration
//!
//! `Layout` names every path an update run touches, all derived from one
//! root directory. `Config` holds the upstream locations and can be
//! overridden from an optional `buildsrc.toml` in the root.

use crate::error::{BuildError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, looked up in the root directory
pub const CONFIG_FILE_NAME: &str = "buildsrc.toml";

const DEFAULT_REPOSITORY: &str = "webmin/webmin";
const DEFAULT_RELEASE_URL: &str = "https://github.com/webmin/webmin/releases/download";
const DEFAULT_SIGNATURE_URL: &str = "https://download.webmin.com/download/sigs";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Paths of the package source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    /// Staging area for downloads and extracted archives
    pub tmp: PathBuf,
    pub debian_dir: PathBuf,
    pub modules: PathBuf,
    pub themes: PathBuf,
    /// Core (minimal) upstream tree
    pub webmin_core: PathBuf,
    pub control_file: PathBuf,
    /// Bundled upstream signing key
    pub signing_key: PathBuf,
    /// Throwaway keyring the signing key is imported into
    pub keyring: PathBuf,
    /// Quilt patch carrying the circular dependency fixes
    pub patch_file: PathBuf,
}

impl Layout {
    /// Derive the layout from a root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let tmp = root.join("tmp");
        let debian_dir = root.join("debian");
        Self {
            modules: root.join("modules"),
            themes: root.join("themes"),
            webmin_core: root.join("webmin_core"),
            control_file: debian_dir.join("control"),
            signing_key: root.join("jcameron-key.asc"),
            keyring: tmp.join("webmin.gpg"),
            patch_file: debian_dir
                .join("patches")
                .join("fix-module-dependencies.diff"),
            tmp,
            debian_dir,
            root,
        }
    }

    /// Directories wiped and recreated at the start of each update
    pub fn staging_dirs(&self) -> [&Path; 4] {
        [&self.tmp, &self.modules, &self.themes, &self.webmin_core]
    }

    /// Extraction target for the minimal archive
    pub fn core_staging(&self) -> PathBuf {
        self.tmp.join("core")
    }

    /// Extraction target for the full archive
    pub fn all_staging(&self) -> PathBuf {
        self.tmp.join("all")
    }

    /// Whether the root is a git checkout
    pub fn is_git_checkout(&self) -> bool {
        self.root.join(".git").exists()
    }
}

/// Upstream settings, overridable from `buildsrc.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// GitHub `user/repo` passed to the release helper
    pub repository: String,
    /// Explicit path to the release listing helper
    pub release_helper: Option<PathBuf>,
    /// Origin of the release archives
    pub release_url: String,
    /// Origin of the detached signatures
    pub signature_url: String,
    /// Ignore pre-release versions
    pub stable_only: bool,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            release_helper: None,
            release_url: DEFAULT_RELEASE_URL.to_string(),
            signature_url: DEFAULT_SIGNATURE_URL.to_string(),
            stable_only: true,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            BuildError::environment(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load configuration from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(BuildError::io(path, e)),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
