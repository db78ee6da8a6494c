//! Release listing helper integration
//!
//! Upstream release tags are obtained from the `gh_releases` helper shipped
//! in the TurnKey common overlays. It prints one tag per line; ordering is
//! not guaranteed.

use crate::error::{BuildError, Result};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Name of the helper when looked up in PATH
pub const HELPER_NAME: &str = "gh_releases";

/// Locations of TurnKey common checkouts that carry the helper
const COMMON_ROOTS: [&str; 2] = ["/turnkey/fab/common", "/turnkey/public/common"];

/// Path of the helper inside a common checkout
const COMMON_HELPER_PATH: &str = "overlays/turnkey.d/github-latest-release/usr/local/bin/gh_releases";

/// Source of upstream release tags
pub trait ReleaseLister {
    /// Return the raw release tags of a `user/repo`, in no particular order
    fn list_releases(&self, repository: &str) -> Result<Vec<String>>;
}

/// Runs the `gh_releases` helper
#[derive(Debug, Clone)]
pub struct GhReleases {
    program: PathBuf,
}

impl GhReleases {
    /// Use a specific helper binary
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate the helper: PATH first, then the common overlays. Falls back to
    /// the bare name so a missing helper surfaces when it is run.
    pub fn discover() -> Self {
        let program = which::which(HELPER_NAME)
            .ok()
            .or_else(|| {
                COMMON_ROOTS
                    .iter()
                    .map(|root| Path::new(root).join(COMMON_HELPER_PATH))
                    .find(|path| path.exists())
            })
            .unwrap_or_else(|| PathBuf::from(HELPER_NAME));
        Self { program }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ReleaseLister for GhReleases {
    fn list_releases(&self, repository: &str) -> Result<Vec<String>> {
        let program = self.program.display().to_string();
        debug!("running {} {}", program, repository);

        let output = Command::new(&self.program)
            .arg(repository)
            .output()
            .map_err(|e| BuildError::process(&program, format!("failed to execute: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BuildError::process(
                &program,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_helper_is_error() {
        let lister = GhReleases::new("/nonexistent/gh_releases");
        let err = lister.list_releases("webmin/webmin").unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("/nonexistent/gh_releases"));
        assert!(msg.contains("failed to execute"));
    }

    #[test]
    fn test_discover_returns_some_program() {
        let lister = GhReleases::discover();
        assert!(lister.program().ends_with(HELPER_NAME));
    }

    #[cfg(unix)]
    #[test]
    fn test_helper_output_lines() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let script = temp_dir.path().join("gh_releases");
        std::fs::write(&script, "#!/bin/sh\nprintf '2.105\\n\\n2.104\\n'\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let lister = GhReleases::new(&script);
        let releases = lister.list_releases("webmin/webmin").unwrap();
        assert_eq!(releases, vec!["2.105", "2.104"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_helper_non_zero_exit() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let script = temp_dir.path().join("gh_releases");
        std::fs::write(&script, "#!/bin/sh\necho 'rate limited' >&2\nexit 3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let lister = GhReleases::new(&script);
        let err = lister.list_releases("webmin/webmin").unwrap_err();
        assert!(format!("{}", err).contains("rate limited"));
    }
}
