//! `Depends` line generation for plugin packages
//!
//! Every plugin package depends on the core package at the packaged version
//! plus the packages of the plugins its info file lists, limited to plugins
//! packaged in the same run.
//!
//! Upstream has two modules that depend on each other. The cycle is broken
//! here when generating the control file; the source `module.info` is fixed
//! with a quilt patch at build time so the tree stays identical to upstream.
//! Only these two known cases are handled. A new cycle between other plugins
//! is not detected.

use std::collections::BTreeSet;

/// Maximum width of a single-line `Depends:` field
pub const DEPENDS_MAX_WIDTH: usize = 60;

/// Name prefix of every generated package
pub const PACKAGE_PREFIX: &str = "webmin";

/// How a circular dependency fixup changes a plugin's dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixupRule {
    /// Remove a dependency
    Drop(&'static str),
    /// Add a dependency when it is missing
    Ensure(&'static str),
}

/// A fixup applied to one named plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircularFixup {
    pub plugin: &'static str,
    pub rule: FixupRule,
}

/// `fdisk` and `raid` depend on each other upstream; `lvm` needs `raid` as
/// well so it keeps pulling it in once `fdisk` no longer does
pub const CIRCULAR_FIXUPS: [CircularFixup; 2] = [
    CircularFixup {
        plugin: "fdisk",
        rule: FixupRule::Drop("raid"),
    },
    CircularFixup {
        plugin: "lvm",
        rule: FixupRule::Ensure("raid"),
    },
];

/// Apply the circular dependency fixups for `plugin` to its dependency tokens
pub fn apply_circular_fixups(plugin: &str, mut tokens: Vec<String>) -> Vec<String> {
    for fixup in CIRCULAR_FIXUPS.iter().filter(|f| f.plugin == plugin) {
        match fixup.rule {
            FixupRule::Drop(dep) => tokens.retain(|t| t != dep),
            FixupRule::Ensure(dep) => {
                if !tokens.iter().any(|t| t == dep) {
                    tokens.push(dep.to_string());
                }
            }
        }
    }
    tokens
}

/// Package names a plugin depends on, core package first
pub fn dependency_entries(
    plugin: &str,
    raw_depends: &str,
    version: &str,
    installable: &BTreeSet<String>,
) -> Vec<String> {
    let tokens: Vec<String> = raw_depends
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut entries = vec![format!("{} (>= {})", PACKAGE_PREFIX, version)];
    for token in apply_circular_fixups(plugin, tokens) {
        // numbers are version constraints on the previous name
        if token.is_empty() || token.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        if installable.contains(&token) {
            entries.push(format!("{}-{}", PACKAGE_PREFIX, token));
        }
    }
    entries
}

/// Render the `Depends` value, wrapping one entry per line when the single
/// line form would be longer than `DEPENDS_MAX_WIDTH`
pub fn format_depends(entries: &[String]) -> String {
    let joined = entries.join(", ");
    if format!("Depends: {}", joined).chars().count() > DEPENDS_MAX_WIDTH {
        format!("\n {}", entries.join(",\n "))
    } else {
        joined
    }
}

/// The `Depends` value for a plugin package
pub fn dependency_line(
    plugin: &str,
    raw_depends: &str,
    version: &str,
    installable: &BTreeSet<String>,
) -> String {
    format_depends(&dependency_entries(plugin, raw_depends, version, installable))
}
