//! Version bump of the module dependency quilt patch
//!
//! `debian/patches/fix-module-dependencies.diff` edits upstream `module.info`
//! files, and its context lines carry the upstream version. On every update
//! those version literals are rewritten and the `Last-Update:` header is set
//! to today.

use crate::error::{BuildError, Result};
use chrono::{Local, NaiveDate};
use std::fs;
use std::path::Path;

/// Rewrite `old_version` to `new_version` in the changed lines of a patch
///
/// Every genuine change touches one removed and one added line, so the
/// number of rewritten lines must be even and non-zero.
pub fn update_patch_version(patch: &Path, old_version: &str, new_version: &str) -> Result<String> {
    update_patch_version_on(patch, old_version, new_version, Local::now().date_naive())
}

/// `update_patch_version` with an explicit date for `Last-Update:`
pub fn update_patch_version_on(
    patch: &Path,
    old_version: &str,
    new_version: &str,
    today: NaiveDate,
) -> Result<String> {
    let content = fs::read_to_string(patch).map_err(|e| BuildError::io(patch, e))?;
    let (updated, changed_lines) = rewrite_patch(&content, old_version, new_version, today);
    fs::write(patch, updated).map_err(|e| BuildError::io(patch, e))?;

    if changed_lines != 0 && changed_lines % 2 == 0 {
        Ok(format!(
            "- updated Webmin version in {}\n  {} -> {} on {} lines",
            patch.display(),
            old_version,
            new_version,
            changed_lines
        ))
    } else {
        Err(BuildError::integrity(format!(
            "Incorrect number of version changes in {} - changed {} lines but should be even number > 0",
            patch.display(),
            changed_lines
        )))
    }
}

/// Return the rewritten patch text and the number of version lines changed
fn rewrite_patch(
    content: &str,
    old_version: &str,
    new_version: &str,
    today: NaiveDate,
) -> (String, usize) {
    let mut changed_lines = 0;
    let mut updated = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        if line.starts_with("Last-Update:") {
            updated.push_str(&format!("Last-Update: {}\n", today.format("%Y-%m-%d")));
        } else if (line.starts_with('-') || line.starts_with('+')) && line.contains(old_version) {
            updated.push_str(&line.replace(old_version, new_version));
            changed_lines += 1;
        } else {
            updated.push_str(line);
        }
    }
    (updated, changed_lines)
}
