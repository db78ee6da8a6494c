//! Upstream release version
//!
//! Webmin tags are plain dotted numbers (`2.105`), occasionally with a
//! pre-release suffix (`1.93-beta`, `2.0rc1`). Versions are parsed with the
//! usual Python-style release rules so that ordering and pre-release
//! detection match what upstream tooling expects:
//! - trailing zero components are insignificant (`1.0 == 1.0.0`)
//! - dev releases < pre-releases < final release < post releases

use crate::error::{BuildError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)^
        v?
        (?:(?P<epoch>\d+)!)?
        (?P<release>\d+(?:\.\d+)*)
        (?:[-_.]?(?P<pre_l>alpha|a|beta|b|preview|pre|rc|c)[-_.]?(?P<pre_n>\d+)?)?
        (?:-(?P<post_n1>\d+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>\d+)?)?
        (?:[-_.]?(?P<dev>dev)[-_.]?(?P<dev_n>\d+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        $",
    )
    .unwrap()
});

/// Pre-release phase, in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Alpha,
    Beta,
    ReleaseCandidate,
}

impl Phase {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "a" | "alpha" => Phase::Alpha,
            "b" | "beta" => Phase::Beta,
            _ => Phase::ReleaseCandidate,
        }
    }
}

/// A parsed upstream version, keeping the literal it was parsed from
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(Phase, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

fn number(value: Option<regex::Match<'_>>, raw: &str) -> Result<Option<u64>> {
    value
        .map(|m| {
            m.as_str()
                .parse::<u64>()
                .map_err(|e| BuildError::invalid_version(raw, e.to_string()))
        })
        .transpose()
}

impl Version {
    /// Parse a version string; anything that is not a valid version is an error
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let caps = VERSION_RE
            .captures(trimmed)
            .ok_or_else(|| BuildError::invalid_version(raw, "not a valid version string"))?;

        let release = caps["release"]
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|e| BuildError::invalid_version(raw, e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let pre = match caps.name("pre_l") {
            Some(label) => Some((
                Phase::from_label(label.as_str()),
                number(caps.name("pre_n"), raw)?.unwrap_or(0),
            )),
            None => None,
        };

        let post = if caps.name("post_n1").is_some() {
            number(caps.name("post_n1"), raw)?
        } else if caps.name("post_l").is_some() {
            Some(number(caps.name("post_n2"), raw)?.unwrap_or(0))
        } else {
            None
        };

        let dev = match caps.name("dev") {
            Some(_) => Some(number(caps.name("dev_n"), raw)?.unwrap_or(0)),
            None => None,
        };

        Ok(Self {
            raw: trimmed.to_string(),
            epoch: number(caps.name("epoch"), raw)?.unwrap_or(0),
            release,
            pre,
            post,
            dev,
            local: caps.name("local").map(|m| m.as_str().to_ascii_lowercase()),
        })
    }

    /// The literal this version was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True for alpha/beta/rc and dev releases
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Release components with insignificant trailing zeros removed
    fn release_key(&self) -> &[u64] {
        let len = self
            .release
            .iter()
            .rposition(|part| *part != 0)
            .map_or(0, |pos| pos + 1);
        &self.release[..len]
    }

    // A bare dev release sorts before every pre-release of the same release,
    // and a final release sorts after all of them.
    fn pre_key(&self) -> (u8, Option<(Phase, u64)>) {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => (0, None),
            (Some(pre), _, _) => (1, Some(pre)),
            (None, _, _) => (2, None),
        }
    }

    fn post_key(&self) -> (u8, u64) {
        self.post.map_or((0, 0), |n| (1, n))
    }

    fn dev_key(&self) -> (u8, u64) {
        self.dev.map_or((1, 0), |n| (0, n))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.release_key().cmp(other.release_key()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post_key().cmp(&other.post_key()))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
