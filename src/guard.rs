//! Version and platform guards.
//!
//! A guard restricts whether a context's examples execute. Guards are evaluated
//! against the run configuration; a context's effective guard is the
//! conjunction of its own guards and those of all its ancestors.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Bound;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(\.\d+)*$").expect("version pattern is valid")
});

// ============================================================================
// VERSION
// ============================================================================

/// A dotted version number such as `1.9.3`.
///
/// Missing trailing components compare as zero, so `1.9 == 1.9.0`.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(Vec<u32>);

impl Version {
    pub fn new(components: Vec<u32>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    /// Compares only the first `len` components of `self` against `prefix`,
    /// which makes `1.9.3` fall "within" an inclusive upper bound of `1.9`.
    fn cmp_truncated(&self, prefix: &Version) -> Ordering {
        let len = prefix.0.len();
        let truncated = Version(self.0.iter().copied().take(len).collect());
        truncated.cmp(prefix)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !VERSION_RE.is_match(s) {
            return Err(format!("{s:?} is not a dotted version number"));
        }
        s.split('.')
            .map(|part| part.parse::<u32>().map_err(|e| format!("{part:?}: {e}")))
            .collect::<Result<Vec<_>, _>>()
            .map(Version)
    }
}

impl TryFrom<String> for Version {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

// ============================================================================
// VERSION RANGE
// ============================================================================

/// A version range with an independent bound on each side.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRange {
    pub min: Bound<Version>,
    pub max: Bound<Version>,
}

impl VersionRange {
    pub fn new(min: Bound<Version>, max: Bound<Version>) -> Self {
        Self { min, max }
    }

    /// Parses the range syntax used by version guards.
    ///
    /// - `"1.9"`: 1.9 and later
    /// - `"1.8.7..1.9"`: inclusive on both ends
    /// - `"1.8.7...1.9"`: excludes the upper end
    /// - `"...1.9"`, `"..1.9"`, `"1.9..."`: unbounded on the empty side
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("empty version range".to_string());
        }
        let (lower, upper, exclusive) = if let Some((lo, hi)) = text.split_once("...") {
            (lo, Some(hi), true)
        } else if let Some((lo, hi)) = text.split_once("..") {
            (lo, Some(hi), false)
        } else {
            (text, None, false)
        };

        let min = match lower.trim() {
            "" => Bound::Unbounded,
            text => Bound::Included(text.parse()?),
        };
        let max = match upper.map(str::trim) {
            None | Some("") => Bound::Unbounded,
            Some(text) if exclusive => Bound::Excluded(text.parse()?),
            Some(text) => Bound::Included(text.parse()?),
        };
        if matches!((&min, &max), (Bound::Unbounded, Bound::Unbounded)) && upper.is_some() {
            return Err("a range needs at least one bound".to_string());
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, version: &Version) -> bool {
        let above_min = match &self.min {
            Bound::Unbounded => true,
            Bound::Included(min) => version >= min,
            Bound::Excluded(min) => version > min,
        };
        let below_max = match &self.max {
            Bound::Unbounded => true,
            Bound::Included(max) => version.cmp_truncated(max) != Ordering::Greater,
            Bound::Excluded(max) => version < max,
        };
        above_min && below_max
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.min {
            Bound::Unbounded => {}
            Bound::Included(v) => write!(f, "{v}")?,
            Bound::Excluded(v) => write!(f, "({v}")?,
        }
        match &self.max {
            Bound::Unbounded if matches!(self.min, Bound::Unbounded) => f.write_str(".."),
            Bound::Unbounded => f.write_str("+"),
            Bound::Included(v) => write!(f, "..{v}"),
            Bound::Excluded(v) => write!(f, "...{v}"),
        }
    }
}

// ============================================================================
// GUARD
// ============================================================================

/// A condition restricting whether a context's examples execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    Version(VersionRange),
    PlatformIs(Vec<String>),
    PlatformIsNot(Vec<String>),
}

impl Guard {
    /// Parses a version range into a guard; see [`VersionRange::parse`].
    pub fn version(range: &str) -> Result<Self, String> {
        VersionRange::parse(range).map(Guard::Version)
    }

    pub fn platform_is<S: AsRef<str>>(platforms: &[S]) -> Self {
        Guard::PlatformIs(platforms.iter().map(|p| p.as_ref().to_string()).collect())
    }

    pub fn platform_is_not<S: AsRef<str>>(platforms: &[S]) -> Self {
        Guard::PlatformIsNot(platforms.iter().map(|p| p.as_ref().to_string()).collect())
    }

    /// Unknown platforms never satisfy `PlatformIs` and always satisfy `PlatformIsNot`.
    pub fn admits(&self, config: &RunConfig) -> bool {
        match self {
            Guard::Version(range) => range.contains(&config.target_version),
            Guard::PlatformIs(names) => config
                .platform
                .as_deref()
                .is_some_and(|p| names.iter().any(|n| n == p)),
            Guard::PlatformIsNot(names) => config
                .platform
                .as_deref()
                .map_or(true, |p| names.iter().all(|n| n != p)),
        }
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Version(range) => write!(f, "version {range}"),
            Guard::PlatformIs(names) => write!(f, "platform is {}", names.join("|")),
            Guard::PlatformIsNot(names) => write!(f, "platform is not {}", names.join("|")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn versions_pad_with_zeros() {
        assert_eq!(v("1.9"), v("1.9.0"));
        assert!(v("1.9.3") > v("1.9"));
        assert!(v("1.10") > v("1.9.3"));
    }

    #[test]
    fn rejects_malformed_versions() {
        assert!("1.9a".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
        assert!("1..9".parse::<Version>().is_err());
    }

    #[test]
    fn single_version_means_at_least() {
        let range = VersionRange::parse("1.9").unwrap();
        assert!(range.contains(&v("1.9")));
        assert!(range.contains(&v("2.0")));
        assert!(!range.contains(&v("1.8.7")));
    }

    #[test]
    fn exclusive_upper_bound() {
        let range = VersionRange::parse("...1.9").unwrap();
        assert!(range.contains(&v("1.8.7")));
        assert!(!range.contains(&v("1.9")));
        assert!(!range.contains(&v("1.9.3")));
    }

    #[test]
    fn inclusive_upper_bound_admits_patch_releases() {
        let range = VersionRange::parse("1.8.7..1.9").unwrap();
        assert!(range.contains(&v("1.9.3")));
        assert!(range.contains(&v("1.8.7")));
        assert!(!range.contains(&v("1.8.6")));
        assert!(!range.contains(&v("2.0")));
    }

    #[test]
    fn exclusive_lower_bound_from_code() {
        let range = VersionRange::new(Bound::Excluded(v("1.8")), Bound::Unbounded);
        assert!(!range.contains(&v("1.8.0")));
        assert!(range.contains(&v("1.8.1")));
    }

    #[test]
    fn malformed_ranges() {
        assert!(VersionRange::parse("").is_err());
        assert!(VersionRange::parse("...").is_err());
        assert!(VersionRange::parse("x..1.9").is_err());
    }

    #[test]
    fn platform_guards() {
        let mut config = RunConfig::default();
        config.platform = Some("linux".to_string());
        assert!(Guard::platform_is(&["linux", "darwin"]).admits(&config));
        assert!(!Guard::platform_is_not(&["linux"]).admits(&config));
        config.platform = None;
        assert!(!Guard::platform_is(&["linux"]).admits(&config));
        assert!(Guard::platform_is_not(&["linux"]).admits(&config));
    }
}
