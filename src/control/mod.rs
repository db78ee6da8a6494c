//! Debian control file generation
//!
//! This module provides:
//! - `Depends` generation with the circular dependency fixups
//! - `Description` generation with long description wrapping
//! - The fixed source and core package stanzas
//!
//! Stanzas are `debian_packaging` control paragraphs and the document is a
//! `ControlFile`, so serialization follows that crate's rules.

mod depends;
mod description;

pub use depends::{
    apply_circular_fixups, dependency_entries, dependency_line, format_depends, CircularFixup,
    FixupRule, CIRCULAR_FIXUPS, DEPENDS_MAX_WIDTH, PACKAGE_PREFIX,
};
pub use description::{description, wrap_text, WRAP_WIDTH};

use crate::error::{BuildError, Result};
use crate::plugin::{Plugin, PluginSet};
use debian_packaging::control::{ControlField, ControlFile, ControlParagraph};
use log::{debug, info};
use std::collections::BTreeSet;
use std::io::{BufWriter, Write};
use std::iter;
use std::path::Path;

/// Core package dependencies, one per continuation line
const CORE_DEPENDS: [&str; 7] = [
    "libauthen-pam-perl",
    "libio-pty-perl",
    "libnet-ssleay-perl",
    "libpam-runtime",
    "openssl",
    "perl",
    "${misc:Depends}",
];

const CORE_SYNOPSIS: &str = "A web-based administration interface for Unix systems.";

const CORE_LONG_DESCRIPTION: [&str; 4] = [
    "Using Webmin you can configure DNS, Samba, NFS, local/remote filesystems",
    "and more using your web browser. After installation, enter the URL",
    "https://localhost:10000/ into your browser and login as root with your",
    "root password.",
];

fn paragraph_from(fields: &[(&'static str, &'static str)]) -> ControlParagraph<'static> {
    let mut paragraph = ControlParagraph::default();
    for (name, value) in fields {
        paragraph.set_field_from_string((*name).into(), (*value).into());
    }
    paragraph
}

/// `Description` field: synopsis, then one continuation line per entry
fn description_field(synopsis: String, long_description: Vec<String>) -> ControlField<'static> {
    ControlField::from_lines(
        "Description".into(),
        iter::once(synopsis).chain(long_description),
    )
}

/// The `Source` stanza of the package source
pub fn source_paragraph() -> ControlParagraph<'static> {
    paragraph_from(&[
        ("Source", "webmin"),
        ("Section", "admin"),
        ("Priority", "optional"),
        ("Maintainer", "Jeremy Davis <jeremy@turnkeylinux.org>"),
        ("Build-Depends", "debhelper (>= 10), gzip, tar"),
        ("Standards-Version", "4.0.0"),
        ("Homepage", "https://webmin.com/"),
        ("Vcs-Browser", "https://github.com/turnkeylinux/webmin/"),
        ("Vcs-Git", "https://github.com/turnkeylinux/webmin.git"),
    ])
}

/// The stanza of the core `webmin` package
pub fn core_paragraph() -> ControlParagraph<'static> {
    let mut paragraph = paragraph_from(&[("Package", PACKAGE_PREFIX), ("Architecture", "all")]);
    // empty first line puts every dependency on its own continuation line
    paragraph.set_field(ControlField::from_lines(
        "Depends".into(),
        iter::once(String::new()).chain(CORE_DEPENDS.iter().map(|dep| format!("{},", dep))),
    ));
    paragraph.set_field_from_string("Pre-Depends".into(), "perl".into());
    paragraph.set_field(description_field(
        CORE_SYNOPSIS.to_string(),
        CORE_LONG_DESCRIPTION.iter().map(|line| line.to_string()).collect(),
    ));
    paragraph
}

/// The package stanza of one plugin
pub fn plugin_paragraph(
    plugin: &Plugin,
    installable: &BTreeSet<String>,
) -> ControlParagraph<'static> {
    debug!("- generating control for {}: {}", plugin.kind_str(), plugin.name);
    let depends = dependency_line(
        &plugin.name,
        &plugin.info.depends,
        &plugin.version,
        installable,
    );
    let (synopsis, long_description) = description(plugin);

    let mut paragraph = ControlParagraph::default();
    paragraph.set_field_from_string(
        "Package".into(),
        format!("{}-{}", PACKAGE_PREFIX, plugin.name).into(),
    );
    paragraph.set_field_from_string("Architecture".into(), "all".into());
    paragraph.set_field_from_string("Depends".into(), depends.into());
    paragraph.set_field(description_field(synopsis, long_description));
    paragraph
}

/// Source stanza, core stanza, then one stanza per plugin sorted by name
///
/// Plugins only depend on other plugins in `plugins`.
pub fn render_document(
    source: ControlParagraph<'static>,
    core: ControlParagraph<'static>,
    plugins: &PluginSet,
) -> ControlFile<'static> {
    let installable = plugins.names();
    let mut document = ControlFile::default();
    document.add_paragraph(source);
    document.add_paragraph(core);
    for plugin in plugins.sorted() {
        document.add_paragraph(plugin_paragraph(plugin, &installable));
    }
    document
}

/// Write the complete control file for `plugins`
pub fn write_control(path: &Path, plugins: &PluginSet) -> Result<()> {
    info!("Writing control file");
    let document = render_document(source_paragraph(), core_paragraph(), plugins);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    let file = std::fs::File::create(path).map_err(|e| BuildError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    document
        .write(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| BuildError::io(path, e))
}
