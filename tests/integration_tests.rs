//! Integration tests for webmin-buildsrc
//!
//! These tests verify:
//! - The full update flow against locally built release archives
//! - Control file generation from unpacked trees
//! - Failure modes that must leave a clear error

use async_trait::async_trait;
use debian_packaging::control::ControlFile;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use webmin_buildsrc::config::{Config, Layout};
use webmin_buildsrc::download::{ArtifactSource, SignatureVerifier};
use webmin_buildsrc::error::{BuildError, Result};
use webmin_buildsrc::orchestrator::{Orchestrator, Services, UpdateOutcome};
use webmin_buildsrc::release::ReleaseLister;

const PATCH: &str = "\
Description: break the fdisk/raid dependency loop
Last-Update: 2024-01-01

--- a/fdisk/module.info
+++ b/fdisk/module.info
@@ -1,2 +1,2 @@
-depends=raid 2.105
+depends=2.105
";

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

struct FixedLister(Vec<String>);

impl ReleaseLister for FixedLister {
    fn list_releases(&self, _repository: &str) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Serves files from a local directory by the last URL segment
struct DirSource {
    dir: PathBuf,
}

#[async_trait]
impl ArtifactSource for DirSource {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let name = url.rsplit('/').next().unwrap_or_default();
        let src = self.dir.join(name);
        if !src.exists() {
            return Err(BuildError::transport(url, "HTTP 404 Not Found"));
        }
        fs::copy(&src, dest).map_err(|e| BuildError::io(dest, e))?;
        Ok(())
    }
}

struct AcceptAll;

impl SignatureVerifier for AcceptAll {
    fn verify(&self, _file: &Path, _signature: &Path) -> Result<()> {
        Ok(())
    }
}

struct RejectAll;

impl SignatureVerifier for RejectAll {
    fn verify(&self, file: &Path, _signature: &Path) -> Result<()> {
        Err(BuildError::process(
            "gpg",
            format!("BAD signature for {}", file.display()),
        ))
    }
}

fn write_plugin(tree: &Path, name: &str, info_file: &str, info: &str) {
    let dir = tree.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(info_file), info).unwrap();
}

/// Pack `<staging>/<top>` into `<out>/<top><suffix>.tar.gz`
fn pack(staging: &Path, top: &str, out: &Path, suffix: &str) {
    let file = fs::File::create(out.join(format!("{}{}.tar.gz", top, suffix))).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.append_dir_all(top, staging.join(top)).unwrap();
    builder.into_inner().unwrap().finish().unwrap();
}

/// Build the full and minimal archives of `version` plus dummy signatures
fn build_release(dir: &Path, version: &str) {
    let top = format!("webmin-{}", version);

    let full = dir.join("full").join(&top);
    fs::create_dir_all(full.join("acl")).unwrap();
    fs::write(full.join("version"), format!("{}\n", version)).unwrap();
    write_plugin(&full, "raid", "module.info", "desc=RAID\ndepends=fdisk\nos_support=*-linux\n");
    write_plugin(&full, "fdisk", "module.info", "desc=Partitions\ndepends=raid proc 1.2\n");
    write_plugin(&full, "lvm", "module.info", "desc=LVM\ndepends=fdisk\n");
    write_plugin(&full, "proc", "module.info", "desc=Processes\n");
    write_plugin(
        &full,
        "gray-theme",
        "theme.info",
        "desc=Gray\nlongdesc=The classic Webmin look.\n",
    );
    write_plugin(&full, "winonly", "module.info", "desc=Windows\nos_support=windows\n");

    let minimal = dir.join("minimal").join(&top);
    fs::create_dir_all(minimal.join("acl")).unwrap();
    fs::create_dir_all(minimal.join("minimal-install")).unwrap();
    fs::write(minimal.join("version"), format!("{}\n", version)).unwrap();

    let out = dir.join("served");
    fs::create_dir_all(&out).unwrap();
    pack(&dir.join("full"), &top, &out, "");
    pack(&dir.join("minimal"), &top, &out, "-minimal");
    for name in [format!("{}.tar.gz", top), format!("{}-minimal.tar.gz", top)] {
        fs::write(out.join(format!("{}-sig.asc", name)), "signature").unwrap();
    }
}

/// A git checkout of the package source at version 2.105
fn create_source_tree(root: &Path) -> Layout {
    let layout = Layout::new(root);
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::create_dir_all(&layout.webmin_core).unwrap();
    fs::write(layout.webmin_core.join("version"), "2.105\n").unwrap();
    fs::create_dir_all(layout.modules.join("old-module")).unwrap();
    let patches = layout.patch_file.parent().unwrap();
    fs::create_dir_all(patches).unwrap();
    fs::write(&layout.patch_file, PATCH).unwrap();
    layout
}

fn orchestrator(
    layout: &Layout,
    served: &Path,
    verifier: Box<dyn SignatureVerifier>,
) -> Orchestrator {
    let services = Services {
        lister: Box::new(FixedLister(vec![
            "2.105".to_string(),
            "2.106".to_string(),
            "2.107-rc1".to_string(),
        ])),
        source: Box::new(DirSource {
            dir: served.to_path_buf(),
        }),
        verifier,
    };
    Orchestrator::new(layout.clone(), Config::default(), false, services)
}

mod update_flow {
    use super::*;

    #[tokio::test]
    async fn test_update_to_latest_stable() {
        let release_dir = create_test_dir();
        build_release(release_dir.path(), "2.106");
        let source_dir = create_test_dir();
        let layout = create_source_tree(source_dir.path());

        let mut orch = orchestrator(&layout, &release_dir.path().join("served"), Box::new(AcceptAll));
        let outcome = orch.update("latest").await.unwrap();

        let plugins = match outcome {
            UpdateOutcome::Updated {
                ref previous,
                ref version,
                ref plugins,
                ref patch_summary,
            } => {
                assert_eq!(previous, "2.105");
                assert_eq!(version, "2.106");
                assert!(patch_summary.contains("2.105 -> 2.106 on 2 lines"));
                plugins.clone()
            }
            UpdateOutcome::NothingToDo { .. } => panic!("expected an update"),
        };

        // core tree replaced, plugins moved out of the full tree
        assert_eq!(
            fs::read_to_string(layout.webmin_core.join("version")).unwrap(),
            "2.106\n"
        );
        assert!(layout.webmin_core.join("minimal-install").is_dir());
        for module in ["fdisk", "lvm", "proc", "raid"] {
            assert!(layout.modules.join(module).join("module.info").is_file());
        }
        assert!(layout.themes.join("gray-theme").join("theme.info").is_file());
        assert!(!layout.modules.join("winonly").exists());
        assert!(!layout.modules.join("old-module").exists());
        assert_eq!(plugins.modules.len(), 4);
        assert_eq!(plugins.themes.len(), 1);

        let patch = fs::read_to_string(&layout.patch_file).unwrap();
        assert!(patch.contains("-depends=raid 2.106"));
        assert!(!patch.contains("Last-Update: 2024-01-01"));

        orch.write_control(&plugins).unwrap();
        let control = fs::read_to_string(&layout.control_file).unwrap();
        assert!(control.starts_with("Source: webmin\n"));
        assert!(control.contains("\n\nPackage: webmin-fdisk\n"));
        assert!(control.contains(
            "Package: webmin-fdisk\nArchitecture: all\nDepends: webmin (>= 2.106), webmin-proc\n"
        ));
        assert!(control.contains("Depends: webmin (>= 2.106), webmin-fdisk, webmin-raid\n"));
        assert!(control.contains(
            "Description: Webmin theme - Gray\n The classic Webmin look.\n"
        ));
        assert!(!control.contains("webmin-winonly"));
        assert!(control.ends_with("\n\n"));

        let parsed = ControlFile::parse_str(&control).unwrap();
        assert_eq!(parsed.paragraphs().count(), 7);
        let theme = parsed
            .paragraphs()
            .find(|p| p.field_str("Package") == Some("webmin-gray-theme"))
            .unwrap();
        assert_eq!(theme.field_str("Architecture"), Some("all"));
    }

    #[tokio::test]
    async fn test_update_explicit_version_already_current() {
        let release_dir = create_test_dir();
        let source_dir = create_test_dir();
        let layout = create_source_tree(source_dir.path());

        let mut orch = orchestrator(&layout, &release_dir.path().join("served"), Box::new(AcceptAll));
        let outcome = orch.update("2.105").await.unwrap();
        assert!(matches!(outcome, UpdateOutcome::NothingToDo { .. }));
        // nothing was cleaned
        assert!(layout.modules.join("old-module").is_dir());
    }

    #[tokio::test]
    async fn test_update_fails_on_bad_signature() {
        let release_dir = create_test_dir();
        build_release(release_dir.path(), "2.106");
        let source_dir = create_test_dir();
        let layout = create_source_tree(source_dir.path());

        let mut orch = orchestrator(&layout, &release_dir.path().join("served"), Box::new(RejectAll));
        let err = orch.update("latest").await.unwrap_err();
        assert!(err.to_string().contains("BAD signature"));
        assert!(!layout.core_staging().exists());
    }

    #[tokio::test]
    async fn test_update_fails_on_missing_archive() {
        let release_dir = create_test_dir();
        let source_dir = create_test_dir();
        let layout = create_source_tree(source_dir.path());

        let mut orch = orchestrator(&layout, &release_dir.path().join("served"), Box::new(AcceptAll));
        let err = orch.update("2.106").await.unwrap_err();
        assert!(err.to_string().contains("webmin-2.106.tar.gz"));
    }

    #[test]
    fn test_prereleases_not_offered() {
        let source_dir = create_test_dir();
        let layout = create_source_tree(source_dir.path());
        let mut orch = orchestrator(&layout, source_dir.path(), Box::new(AcceptAll));
        assert_eq!(orch.remote_versions().unwrap(), vec!["2.106", "2.105"]);
        assert_eq!(orch.latest_version().unwrap(), "2.106");
    }
}

mod control_generation {
    use super::*;

    fn unpacked_trees(dir: &Path, full_version: &str) -> (PathBuf, PathBuf) {
        let full = dir.join("all");
        let minimal = dir.join("core");
        fs::create_dir_all(full.join("acl")).unwrap();
        fs::create_dir_all(minimal.join("acl")).unwrap();
        fs::create_dir_all(minimal.join("minimal-install")).unwrap();
        fs::write(full.join("version"), full_version).unwrap();
        fs::write(minimal.join("version"), "2.105").unwrap();
        write_plugin(&full, "raid", "module.info", "desc=RAID\n");
        (full, minimal)
    }

    #[test]
    fn test_control_from_unpacked_trees() {
        let work = create_test_dir();
        let (full, minimal) = unpacked_trees(work.path(), "2.105");
        let source_dir = create_test_dir();
        let layout = create_source_tree(source_dir.path());
        let orch = orchestrator(&layout, work.path(), Box::new(AcceptAll));

        let plugins = orch.load_trees(&full, &minimal, "", false).unwrap();
        orch.write_control(&plugins).unwrap();

        let control = fs::read_to_string(&layout.control_file).unwrap();
        assert!(control.contains("Package: webmin-raid\nArchitecture: all\nDepends: webmin (>= 2.105)\n"));
        assert!(layout.modules.join("raid").is_dir());
    }

    #[test]
    fn test_control_rejects_mismatched_trees() {
        let work = create_test_dir();
        let (full, minimal) = unpacked_trees(work.path(), "2.106");
        let source_dir = create_test_dir();
        let layout = create_source_tree(source_dir.path());
        let orch = orchestrator(&layout, work.path(), Box::new(AcceptAll));

        let err = orch.load_trees(&full, &minimal, "", false).unwrap_err();
        assert_eq!(err.to_string(), "version validation failed");

        let plugins = orch.load_trees(&full, &minimal, "", true).unwrap();
        assert_eq!(plugins.sorted()[0].version, "2.106");
    }

    #[test]
    fn test_unexpected_minimal_entry() {
        let work = create_test_dir();
        let (full, minimal) = unpacked_trees(work.path(), "2.105");
        fs::create_dir_all(minimal.join("surprise")).unwrap();
        let source_dir = create_test_dir();
        let layout = create_source_tree(source_dir.path());
        let orch = orchestrator(&layout, work.path(), Box::new(AcceptAll));

        let err = orch.load_trees(&full, &minimal, "", false).unwrap_err();
        assert!(err.to_string().contains("unexpected objects"));
        assert!(err.to_string().contains("surprise"));
    }
}
