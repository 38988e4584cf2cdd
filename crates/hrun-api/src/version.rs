//! Installed build versions and their ordering

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// One dot- or dash-separated piece of a version string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionComponent {
    Numeric(u64),
    Text(String),
}

/// Comparable version number, e.g. `18.0.532`
///
/// Components compare left to right; a shorter version that is a prefix of a
/// longer one sorts first (`17.5 < 17.5.0`), and text components sort after
/// numeric ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct VersionNumber {
    display: String,
    components: Vec<VersionComponent>,
}

impl VersionNumber {
    pub fn parse(display: impl Into<String>) -> Self {
        let display = display.into();
        let components = display
            .split(['.', '-'])
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<u64>() {
                Ok(n) => VersionComponent::Numeric(n),
                Err(_) => VersionComponent::Text(part.to_string()),
            })
            .collect();

        Self { display, components }
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    pub fn components(&self) -> &[VersionComponent] {
        &self.components
    }

    /// Major release, if the first component is numeric
    pub fn major(&self) -> Option<u64> {
        self.numeric_at(0)
    }

    pub fn minor(&self) -> Option<u64> {
        self.numeric_at(1)
    }

    pub fn build(&self) -> Option<u64> {
        self.numeric_at(2)
    }

    fn numeric_at(&self, idx: usize) -> Option<u64> {
        match self.components.get(idx) {
            Some(VersionComponent::Numeric(n)) => Some(*n),
            _ => None,
        }
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components
            .cmp(&other.components)
            .then_with(|| self.display.cmp(&other.display))
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

impl From<String> for VersionNumber {
    fn from(s: String) -> Self {
        Self::parse(s)
    }
}

impl From<&str> for VersionNumber {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<VersionNumber> for String {
    fn from(v: VersionNumber) -> Self {
        v.display
    }
}

/// An installed build of the application
///
/// Constructed by the build inventory and immutable afterwards; the builder
/// methods consume `self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    number: VersionNumber,
    install_path: PathBuf,
    #[serde(default)]
    is_default: bool,
    /// Variables the install step primes for every launch of this build
    #[serde(default)]
    environment: BTreeMap<String, String>,
    /// Directory build tooling should search for the application's packages
    #[serde(default)]
    plugin_dir: Option<PathBuf>,
}

impl Version {
    pub fn new(number: impl Into<VersionNumber>, install_path: impl Into<PathBuf>) -> Self {
        Self {
            number: number.into(),
            install_path: install_path.into(),
            is_default: false,
            environment: BTreeMap::new(),
            plugin_dir: None,
        }
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_environment(mut self, env: BTreeMap<String, String>) -> Self {
        self.environment.extend(env);
        self
    }

    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_dir = Some(dir.into());
        self
    }

    pub fn number(&self) -> &VersionNumber {
        &self.number
    }

    pub fn display(&self) -> &str {
        self.number.as_str()
    }

    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    pub fn plugin_dir(&self) -> Option<&Path> {
        self.plugin_dir.as_deref()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number)
    }
}

/// Versions sorted ascending; the last element is the latest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Version>")]
pub struct VersionList(Vec<Version>);

impl VersionList {
    pub fn new(mut versions: Vec<Version>) -> Self {
        versions.sort_by(|a, b| a.number().cmp(b.number()));
        Self(versions)
    }

    pub fn latest(&self) -> Option<&Version> {
        self.0.last()
    }

    /// Find a version by its exact display string
    pub fn find(&self, display: &str) -> Option<&Version> {
        self.0.iter().find(|v| v.display() == display)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Version> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Version] {
        &self.0
    }
}

impl From<Vec<Version>> for VersionList {
    fn from(versions: Vec<Version>) -> Self {
        Self::new(versions)
    }
}

impl<'a> IntoIterator for &'a VersionList {
    type Item = &'a Version;
    type IntoIter = std::slice::Iter<'a, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
