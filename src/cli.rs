//! CLI argument parsing module for webmin-buildsrc

use crate::config::CONFIG_FILE_NAME;
use crate::release::LATEST;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Webmin Debian package source maintenance
#[derive(Parser, Debug, Clone)]
#[command(
    name = "webmin-buildsrc",
    version,
    about = "Keep the Webmin Debian package source in sync with upstream"
)]
pub struct CliArgs {
    /// Root of the package source tree
    #[arg(short, long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (default: <root>/buildsrc.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Rebuild an up to date source, download outside a git checkout and
    /// overwrite existing staging directories
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Enable quiet mode - only errors are shown
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the newest upstream version
    Latest {
        /// Consider pre-release versions
        #[arg(long)]
        pre: bool,
    },
    /// Exit 0 if an update is available, 100 if already up to date
    Check,
    /// List upstream versions, newest first
    Versions {
        /// Include pre-release versions
        #[arg(long)]
        pre: bool,
    },
    /// Update the package source to VERSION and regenerate debian/control
    Update {
        /// Upstream version to package
        #[arg(default_value = LATEST)]
        version: String,

        /// Leave debian/control untouched
        #[arg(long)]
        no_control: bool,
    },
    /// Regenerate debian/control from already unpacked upstream trees
    Control {
        /// Unpacked full archive
        full: PathBuf,

        /// Unpacked minimal archive
        minimal: PathBuf,

        /// Version to depend on (default: read from the full tree)
        #[arg(long)]
        version: Option<String>,

        /// Do not require the trees' version files to agree
        #[arg(long)]
        skip_validation: bool,
    },
}

impl CliArgs {
    /// Configuration file to load
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.root.join(CONFIG_FILE_NAME))
    }

    /// Default log filter implied by `--quiet` and `--verbose`
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Whether pre-releases are requested for this command
    pub fn include_prereleases(&self) -> bool {
        matches!(
            self.command,
            Command::Latest { pre: true } | Command::Versions { pre: true }
        )
    }
}
