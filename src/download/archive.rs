//! Release archive extraction

use crate::error::{BuildError, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::Path;
use tar::Archive;

/// Unpack a `.tar.gz` into `dest`
///
/// `dest` must not exist yet; with `force` an existing `dest` is removed
/// first.
pub fn extract(archive: &Path, dest: &Path, force: bool) -> Result<()> {
    if dest.exists() {
        if !force {
            return Err(BuildError::environment(format!(
                "{} exists; use -f|--force to overwrite",
                dest.display()
            )));
        }
        fs::remove_dir_all(dest).map_err(|e| BuildError::io(dest, e))?;
    }
    fs::create_dir_all(dest).map_err(|e| BuildError::io(dest, e))?;

    let file = File::open(archive).map_err(|e| BuildError::io(archive, e))?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    tar.unpack(dest).map_err(|e| BuildError::io(archive, e))
}
