//! Plugin `.info` file reader
//!
//! `module.info` and `theme.info` are `key=value` text files. Only the keys
//! needed to build package metadata are kept.

use super::PluginKind;
use crate::error::{BuildError, Result};
use std::fs;
use std::path::Path;

/// Package-relevant fields of a plugin info file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginInfo {
    /// Supported operating systems; empty means all
    pub os_support: String,
    /// Whitespace separated plugin names, possibly with version numbers
    pub depends: String,
    /// Short description
    pub desc: String,
    /// Long description
    pub longdesc: String,
}

impl PluginInfo {
    /// Parse info file content. Lines without `=` are an error.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut info = PluginInfo::default();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                BuildError::integrity(format!(
                    "malformed line {} in {}: {:?}",
                    index + 1,
                    path.display(),
                    line
                ))
            })?;
            let value = value.trim().to_string();
            match key {
                "os_support" => info.os_support = value,
                "depends" => info.depends = value,
                "desc" => info.desc = value,
                "longdesc" => info.longdesc = value,
                _ => {}
            }
        }
        Ok(info)
    }
}

/// Read `<plugin_dir>/<kind>.info`
pub fn read_info(plugin_dir: &Path, kind: PluginKind) -> Result<PluginInfo> {
    let path = plugin_dir.join(kind.info_file());
    let content = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
    PluginInfo::parse(&content, &path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognized_keys() {
        let content = "\
desc=Partitions on Local Disks
os_support=*-linux
depends=proc 1.150 raid
longdesc=Create and edit partitions on local SCSI and IDE disks on Linux.
category=hardware
";
        let info = PluginInfo::parse(content, Path::new("module.info")).unwrap();
        assert_eq!(info.desc, "Partitions on Local Disks");
        assert_eq!(info.os_support, "*-linux");
        assert_eq!(info.depends, "proc 1.150 raid");
        assert!(info.longdesc.starts_with("Create and edit"));
    }

    #[test]
    fn test_missing_keys_default_empty() {
        let info = PluginInfo::parse("desc=Theme\n", Path::new("theme.info")).unwrap();
        assert_eq!(info.desc, "Theme");
        assert_eq!(info.os_support, "");
        assert_eq!(info.depends, "");
        assert_eq!(info.longdesc, "");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let info = PluginInfo::parse("longdesc=a=b\n", Path::new("module.info")).unwrap();
        assert_eq!(info.longdesc, "a=b");
    }

    #[test]
    fn test_malformed_line_is_error() {
        let err = PluginInfo::parse("desc=ok\ngarbage\n", Path::new("module.info")).unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("line 2"));
        assert!(msg.contains("module.info"));
    }

    #[test]
    fn test_read_info_from_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("theme.info"), "desc=Gray Theme\n").unwrap();
        let info = read_info(temp_dir.path(), PluginKind::Theme).unwrap();
        assert_eq!(info.desc, "Gray Theme");

        assert!(read_info(temp_dir.path(), PluginKind::Module).is_err());
    }
}
