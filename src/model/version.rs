use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)*$").expect("valid version regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("unparsable version string: {0:?}")]
    Malformed(String),
    #[error("version component out of range in {0:?}")]
    Overflow(String),
}

/// Dot-separated numeric version, ordered component by component.
///
/// A shorter version sorts before any longer one sharing its prefix, so
/// `3.8 < 3.8.0 < 3.8.1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolVersion(Vec<u64>);

impl ToolVersion {
    #[cfg(test)]
    pub fn new(components: impl Into<Vec<u64>>) -> Self {
        Self(components.into())
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

impl FromStr for ToolVersion {
    type Err = VersionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if !VERSION_RE.is_match(trimmed) {
            return Err(VersionError::Malformed(trimmed.to_string()));
        }

        trimmed
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| VersionError::Overflow(trimmed.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components().iter().map(u64::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

/// An absent tool never meets the minimum.
pub fn meets_minimum(installed: Option<&ToolVersion>, minimum: &ToolVersion) -> bool {
    installed.is_some_and(|version| version >= minimum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> ToolVersion {
        text.parse().unwrap()
    }

    #[test]
    fn parses_dotted_numbers() {
        assert_eq!(v("3.8.1").components(), &[3, 8, 1]);
        assert_eq!(v(" 7.12.0\n").components(), &[7, 12, 0]);
        assert_eq!(v("4").components(), &[4]);
    }

    #[test]
    fn rejects_non_numeric_versions() {
        assert!(matches!(
            "3.8.1-rc1".parse::<ToolVersion>(),
            Err(VersionError::Malformed(_))
        ));
        assert!("".parse::<ToolVersion>().is_err());
        assert!("3..1".parse::<ToolVersion>().is_err());
        assert!("puppet 3.8.1".parse::<ToolVersion>().is_err());
        assert!(matches!(
            "99999999999999999999999.1".parse::<ToolVersion>(),
            Err(VersionError::Overflow(_))
        ));
    }

    #[test]
    fn minimum_is_inclusive() {
        let minimum = v("3.8.1");
        assert!(meets_minimum(Some(&v("3.8.1")), &minimum));
        assert!(meets_minimum(Some(&v("3.10.0")), &minimum));
        assert!(meets_minimum(Some(&v("4")), &minimum));
    }

    #[test]
    fn older_or_absent_versions_fall_short() {
        let minimum = v("3.8.1");
        assert!(!meets_minimum(Some(&v("3.7.9")), &minimum));
        assert!(!meets_minimum(Some(&v("3.8")), &minimum));
        assert!(!meets_minimum(None, &minimum));
    }

    #[test]
    fn displays_dotted() {
        assert_eq!(v("3.8.1").to_string(), "3.8.1");
    }
}
