//! `Description` field generation

use crate::plugin::Plugin;

/// Target width of wrapped long description lines
pub const WRAP_WIDTH: usize = 60;

/// Greedy word wrap into lines shorter than `width`
///
/// Words are never split, so a word of `width` or more gets a line of its own.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() < width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Synopsis line and wrapped extended description of a plugin package
pub fn description(plugin: &Plugin) -> (String, Vec<String>) {
    let synopsis = format!("Webmin {} - {}", plugin.kind_str(), plugin.info.desc);
    (synopsis, wrap_text(&plugin.info.longdesc, WRAP_WIDTH))
}
