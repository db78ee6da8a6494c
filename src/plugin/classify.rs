//! Core vs. plugin classification of the upstream trees
//!
//! The minimal archive holds the core; the full archive holds the core plus
//! every module and theme. Anything only present in the full tree is a
//! plugin. The only entry allowed to exist solely in the minimal tree is the
//! `minimal-install` marker; anything else there means upstream changed its
//! packaging layout and must be looked at by a human.

use super::{Plugin, PluginKind};
use crate::error::{BuildError, Result};
use log::{info, warn};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Marker directory upstream ships only in the minimal archive
pub const MINIMAL_INSTALL_MARKER: &str = "minimal-install";

/// Top-level entry names of a directory
fn entry_names(dir: &Path) -> Result<BTreeSet<String>> {
    let entries = fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))?;
    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(dir, e))?;
        names.insert(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Return the plugin candidates of `full_root`, sorted by name
///
/// Fails when the minimal tree has entries other than the marker that the
/// full tree lacks, when the marker is missing, or when a full-only entry is
/// a plain file.
pub fn classify(minimal_root: &Path, full_root: &Path) -> Result<Vec<String>> {
    let minimal = entry_names(minimal_root)?;
    let full = entry_names(full_root)?;

    let mut minimal_only: BTreeSet<&str> =
        minimal.difference(&full).map(String::as_str).collect();
    let has_marker = minimal_only.remove(MINIMAL_INSTALL_MARKER);
    if !minimal_only.is_empty() {
        let unexpected: Vec<&str> = minimal_only.into_iter().collect();
        return Err(BuildError::integrity(format!(
            "unexpected objects in {}: {}",
            minimal_root.display(),
            unexpected.join(", ")
        )));
    }
    if !has_marker {
        return Err(BuildError::integrity(format!(
            "expected '{}' not found in {}",
            MINIMAL_INSTALL_MARKER,
            minimal_root.display()
        )));
    }

    let mut candidates = Vec::new();
    for name in full.difference(&minimal) {
        let path = full_root.join(name);
        if path.is_file() {
            return Err(BuildError::integrity(format!(
                "Unexpected file: {}",
                path.display()
            )));
        }
        candidates.push(name.clone());
    }
    Ok(candidates)
}

/// Plugins packaged in one update run
#[derive(Debug, Clone, Default)]
pub struct PluginSet {
    pub modules: Vec<Plugin>,
    pub themes: Vec<Plugin>,
}

impl PluginSet {
    /// Register a plugin under its kind
    pub fn add(&mut self, plugin: Plugin) {
        match plugin.kind {
            Some(PluginKind::Theme) => self.themes.push(plugin),
            _ => self.modules.push(plugin),
        }
    }

    /// All plugins, sorted by name
    pub fn sorted(&self) -> Vec<&Plugin> {
        let mut all: Vec<&Plugin> = self.modules.iter().chain(self.themes.iter()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Names of every packaged plugin
    pub fn names(&self) -> BTreeSet<String> {
        self.modules
            .iter()
            .chain(self.themes.iter())
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len() + self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classify the full tree, skip plugins Debian cannot use and move the rest
/// into `<dest_root>/modules` and `<dest_root>/themes`
pub fn load_plugins(
    minimal_root: &Path,
    full_root: &Path,
    dest_root: &Path,
    version: &str,
) -> Result<PluginSet> {
    info!("Processing modules and themes");
    let mut plugins = PluginSet::default();
    for name in classify(minimal_root, full_root)? {
        info!("- processing item: {}", name);
        let mut plugin = Plugin::load(&name, full_root, version, true)?;
        if !plugin.debian_support() {
            warn!("{} not supported on Debian - skipping", name);
            continue;
        }
        info!("- moving {}: {}", plugin.kind_str(), name);
        plugin.move_into(dest_root)?;
        plugins.add(plugin);
    }
    Ok(plugins)
}
