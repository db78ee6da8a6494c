//! Detached signature verification with gpg
//!
//! Verification uses a throwaway keyring under the staging directory. The
//! bundled upstream signing key is imported into it the first time a file is
//! verified.

use crate::error::{BuildError, Result};
use log::{debug, info};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Checks a file against its detached signature
pub trait SignatureVerifier {
    fn verify(&self, file: &Path, signature: &Path) -> Result<()>;
}

/// gpg with an isolated keyring
#[derive(Debug, Clone)]
pub struct Gpg {
    program: PathBuf,
    keyring: PathBuf,
    signing_key: PathBuf,
}

impl Gpg {
    pub fn new(keyring: impl Into<PathBuf>, signing_key: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("gpg"),
            keyring: keyring.into(),
            signing_key: signing_key.into(),
        }
    }

    /// Use a different gpg binary
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn run(&self, args: &[&OsStr]) -> Result<Output> {
        let mut command = Command::new(&self.program);
        command
            .arg("--no-default-keyring")
            .arg("--keyring")
            .arg(&self.keyring)
            .args(args);
        debug!("running {:?}", command);
        command.output().map_err(|e| {
            BuildError::process(
                self.program.display().to_string(),
                format!("failed to execute: {}", e),
            )
        })
    }

    /// Create the keyring from the bundled signing key if it does not exist
    pub fn ensure_keyring(&self) -> Result<()> {
        if self.keyring.exists() {
            return Ok(());
        }
        info!("- generating temp keyring: {}", self.keyring.display());
        let output = self.run(&[OsStr::new("--import"), self.signing_key.as_os_str()])?;
        if !output.status.success() {
            return Err(BuildError::process(
                self.program.display().to_string(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}

impl SignatureVerifier for Gpg {
    fn verify(&self, file: &Path, signature: &Path) -> Result<()> {
        self.ensure_keyring()?;
        let output = self.run(&[
            OsStr::new("--verify"),
            signature.as_os_str(),
            file.as_os_str(),
        ])?;
        if output.status.success() {
            info!("- validated file: {}", file.display());
            Ok(())
        } else {
            Err(BuildError::process(
                self.program.display().to_string(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}
