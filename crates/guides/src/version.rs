//! Pack version codes and version gates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A Minecraft release encoded as `minor * 100 + patch` for `1.minor.patch`.
///
/// `1.12.2` is `1202`, `1.13` is `1300`, `1.20.5` is `2005`. The encoding
/// totally orders releases, so version gates are plain integer comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u16);

impl Version {
    /// Newest release the guides and tables know about (1.21.5).
    pub const LATEST: Version = Version(2105);
    /// Oldest release accepted as a migration source (1.8).
    pub const OLDEST: Version = Version(800);

    /// Wrap a raw version code.
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Build from the `minor` and `patch` parts of `1.minor.patch`.
    pub const fn release(minor: u16, patch: u16) -> Self {
        Self(minor * 100 + patch)
    }

    /// The raw integer code.
    pub const fn code(self) -> u16 {
        self.0
    }

    /// The first version after this one, i.e. the era reached by crossing a
    /// gate whose `max` is `self`.
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (minor, patch) = (self.0 / 100, self.0 % 100);
        if patch == 0 {
            write!(f, "1.{minor}")
        } else {
            write!(f, "1.{minor}.{patch}")
        }
    }
}

/// Error returned when a version string is neither `1.x[.y]` nor a bare code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version '{0}': expected a release like 1.12.2 or a code like 1202")]
pub struct ParseVersionError(pub String);

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseVersionError(s.to_string());
        if let Some(rest) = s.strip_prefix("1.") {
            let mut parts = rest.split('.');
            let minor: u16 = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
            let patch: u16 = match parts.next() {
                Some(p) => p.parse().map_err(|_| err())?,
                None => 0,
            };
            if parts.next().is_some() || minor > 99 || patch > 99 {
                return Err(err());
            }
            return Ok(Version::release(minor, patch));
        }
        let code: u16 = s.parse().map_err(|_| err())?;
        if code < 100 {
            return Err(err());
        }
        Ok(Version(code))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.0)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(u16),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Code(code) => Ok(Version(code)),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A `min`/`max` window on the source version.
///
/// `max = N` names the last release under which the old behavior was
/// correct: the gate applies only when the migration *crosses* `N`, i.e. the
/// source is at or below `N` and the target is above it. `min` requires the
/// source to be at least that release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// Lowest source version the rule applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Version>,
    /// Last version with the old behavior.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Version>,
}

impl Gate {
    /// A gate that always applies.
    pub const OPEN: Gate = Gate {
        min: None,
        max: None,
    };

    /// Gate crossing `max`.
    pub const fn until(max: Version) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Whether a migration from `source` to `target` passes this gate.
    pub fn applies(&self, source: Version, target: Version) -> bool {
        if let Some(min) = self.min
            && source < min
        {
            return false;
        }
        match self.max {
            Some(max) => source <= max && target > max,
            None => true,
        }
    }

    /// Ordering key: increasing `max`, unbounded gates last.
    pub fn sort_key(&self) -> u16 {
        self.max.map_or(u16::MAX, Version::code)
    }
}

/// A value guarded by a [`Gate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// The window in which `value` is selected.
    pub gate: Gate,
    /// The guarded value.
    pub value: T,
}

/// Select the first entry whose gate applies.
pub fn select<T>(entries: &[Versioned<T>], source: Version, target: Version) -> Option<&Versioned<T>> {
    entries.iter().find(|e| e.gate.applies(source, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_and_bare_codes() {
        assert_eq!("1.12.2".parse::<Version>().unwrap(), Version::new(1202));
        assert_eq!("1.13".parse::<Version>().unwrap(), Version::new(1300));
        assert_eq!("1.20.5".parse::<Version>().unwrap(), Version::new(2005));
        assert_eq!("1605".parse::<Version>().unwrap(), Version::new(1605));
        assert!("2.0".parse::<Version>().is_err());
        assert!("1.x".parse::<Version>().is_err());
        assert!("12".parse::<Version>().is_err());
    }

    #[test]
    fn displays_release_form() {
        assert_eq!(Version::new(1202).to_string(), "1.12.2");
        assert_eq!(Version::new(1300).to_string(), "1.13");
        assert_eq!(Version::LATEST.to_string(), "1.21.5");
    }

    #[test]
    fn deserializes_from_number_or_string() {
        let v: Version = serde_json::from_str("1202").unwrap();
        assert_eq!(v, Version::new(1202));
        let v: Version = serde_json::from_str("\"1.16.5\"").unwrap();
        assert_eq!(v, Version::new(1605));
    }

    #[test]
    fn gate_requires_crossing_max() {
        let gate = Gate::until(Version::new(1202));
        assert!(gate.applies(Version::new(1202), Version::new(1300)));
        assert!(gate.applies(Version::new(800), Version::LATEST));
        assert!(!gate.applies(Version::new(1300), Version::LATEST));
        assert!(!gate.applies(Version::new(800), Version::new(1202)));
    }

    #[test]
    fn gate_min_bounds_source() {
        let gate = Gate {
            min: Some(Version::new(1300)),
            max: Some(Version::new(2004)),
        };
        assert!(!gate.applies(Version::new(1202), Version::LATEST));
        assert!(gate.applies(Version::new(1300), Version::LATEST));
        assert!(Gate::OPEN.applies(Version::new(800), Version::new(800)));
    }

    #[test]
    fn select_takes_first_applicable() {
        let entries = vec![
            Versioned {
                gate: Gate::until(Version::new(1202)),
                value: "legacy",
            },
            Versioned {
                gate: Gate::OPEN,
                value: "modern",
            },
        ];
        let pick = |s| select(&entries, Version::new(s), Version::LATEST).map(|e| e.value);
        assert_eq!(pick(1202), Some("legacy"));
        assert_eq!(pick(1300), Some("modern"));
    }
}
