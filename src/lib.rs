//! webmin-buildsrc - Webmin Debian package source maintenance library
//!
//! This library provides the building blocks for keeping the Webmin package
//! source in sync with upstream:
//! - Upstream version resolution (release)
//! - Archive download, signature verification and extraction (download)
//! - Module and theme classification (plugin)
//! - Debian control file generation (control)
//! - Quilt patch version bumps (patch)

pub mod cli;
pub mod config;
pub mod control;
pub mod download;
pub mod error;
pub mod orchestrator;
pub mod patch;
pub mod plugin;
pub mod progress;
pub mod release;
