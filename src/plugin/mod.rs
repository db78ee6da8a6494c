//! Webmin modules and themes
//!
//! This module provides:
//! - The plugin model and its kind detection
//! - The `.info` file reader
//! - Classification of upstream trees into core and plugins

mod classify;
mod info;

pub use classify::{classify, load_plugins, PluginSet, MINIMAL_INSTALL_MARKER};
pub use info::{read_info, PluginInfo};

use crate::error::{BuildError, Result};
use log::info;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The two kinds of optional Webmin components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Module,
    Theme,
}

impl PluginKind {
    /// Kinds in the order their marker files are checked
    pub const ALL: [PluginKind; 2] = [PluginKind::Module, PluginKind::Theme];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Module => "module",
            PluginKind::Theme => "theme",
        }
    }

    /// Marker file that identifies this kind, e.g. `module.info`
    pub fn info_file(&self) -> String {
        format!("{}.info", self.as_str())
    }

    /// Category directory name, e.g. `modules`
    pub fn category(&self) -> String {
        format!("{}s", self.as_str())
    }

    /// Detect the kind of a plugin directory from its marker file
    pub fn detect(dir: &Path) -> Option<PluginKind> {
        Self::ALL
            .into_iter()
            .find(|kind| dir.join(kind.info_file()).exists())
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A module or theme taken from the full upstream tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    /// Directory name, also the package suffix
    pub name: String,
    /// `None` only for plugins loaded in non-strict mode without a marker
    pub kind: Option<PluginKind>,
    /// Tree the plugin was found in
    pub source_dir: PathBuf,
    /// Current location
    pub dir: PathBuf,
    /// Upstream version the plugin is packaged against
    pub version: String,
    pub info: PluginInfo,
    /// Target of the plugin directory when it is a symlink
    pub link: Option<PathBuf>,
}

impl Plugin {
    /// Load `<source_dir>/<name>`
    ///
    /// In strict mode a directory without a `module.info` or `theme.info` is
    /// an error. A symlinked plugin gets its link target added to its
    /// dependencies.
    pub fn load(name: &str, source_dir: &Path, version: &str, strict: bool) -> Result<Self> {
        let dir = source_dir.join(name);
        let kind = PluginKind::detect(&dir);
        let mut info = match kind {
            Some(kind) => read_info(&dir, kind)?,
            None if strict => {
                return Err(BuildError::integrity(format!(
                    "Module/theme info file not found: {}",
                    dir.display()
                )))
            }
            None => PluginInfo::default(),
        };

        let is_link = fs::symlink_metadata(&dir)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        let link = if is_link {
            let target = fs::read_link(&dir).map_err(|e| BuildError::io(&dir, e))?;
            info.depends = format!("{} {}", info.depends, target.display());
            Some(target)
        } else {
            None
        };

        Ok(Self {
            name: name.to_string(),
            kind,
            source_dir: source_dir.to_path_buf(),
            dir,
            version: version.to_string(),
            info,
            link,
        })
    }

    /// Whether upstream declares the plugin usable on Debian
    pub fn debian_support(&self) -> bool {
        let os_support = self.info.os_support.as_str();
        os_support.is_empty()
            || os_support == "!windows"
            || os_support.contains("debian-linux")
            || os_support.contains("*-linux")
    }

    pub fn kind_str(&self) -> &'static str {
        self.kind.map_or("plugin", |kind| kind.as_str())
    }

    /// Move the plugin into `<base_dst_dir>/<name>`
    ///
    /// A symlinked plugin is left in place; an empty directory with a README
    /// explaining the link is created instead.
    pub fn move_to(&mut self, base_dst_dir: &Path) -> Result<()> {
        let dst_dir = base_dst_dir.join(&self.name);
        if dst_dir == self.dir {
            info!("Nothing to do");
            return Ok(());
        }
        fs::create_dir_all(base_dst_dir).map_err(|e| BuildError::io(base_dst_dir, e))?;

        if let Some(ref link) = self.link {
            fs::create_dir(&dst_dir).map_err(|e| BuildError::io(&dst_dir, e))?;
            let kind = self.kind_str();
            let readme = format!(
                "README\n======\n\
                 \nThe original {name} {kind} was a symlink to {target} {kind}\
                 \nThis directory is intentionally left empty and the generated \
                 package will depend on the target {kind}\n",
                name = self.name,
                kind = kind,
                target = link.display(),
            );
            let readme_path = dst_dir.join("README");
            fs::write(&readme_path, readme).map_err(|e| BuildError::io(&readme_path, e))?;
        } else {
            fs::rename(&self.dir, &dst_dir).map_err(|e| BuildError::io(&self.dir, e))?;
        }
        self.dir = dst_dir;
        Ok(())
    }

    /// Move the plugin into its category directory under `root`
    /// (`modules/<name>` or `themes/<name>`)
    pub fn move_into(&mut self, root: &Path) -> Result<()> {
        let kind = self.kind.ok_or_else(|| {
            BuildError::integrity(format!("cannot place {} without a known kind", self.name))
        })?;
        self.move_to(&root.join(kind.category()))
    }
}
