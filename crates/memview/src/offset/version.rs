use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

const BUILD_DATE_FORMAT: &str = "%Y.%m.%d";

/// Game build identifier.
///
/// Ordering is by `(major, minor, patch)` first; the build date only breaks
/// ties, and a known date sorts after an unknown one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build_date: Option<NaiveDate>,
}

impl GameVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build_date: None,
        }
    }

    pub fn with_build_date(mut self, date: NaiveDate) -> Self {
        self.build_date = Some(date);
        self
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(date) = self.build_date {
            write!(f, "+{}", date.format(BUILD_DATE_FORMAT))?;
        }
        Ok(())
    }
}

impl FromStr for GameVersion {
    type Err = Error;

    /// Parse `"6.5.0"` or `"6.5.0+2023.10.03"`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion(s.to_string());
        let (number, date) = match s.trim().split_once('+') {
            Some((number, date)) => (number, Some(date)),
            None => (s.trim(), None),
        };

        let parts = number
            .split('.')
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        let &[major, minor, patch] = parts.as_slice() else {
            return Err(invalid());
        };

        let mut version = GameVersion::new(major, minor, patch);
        if let Some(date) = date {
            let date = NaiveDate::parse_from_str(date, BUILD_DATE_FORMAT).map_err(|_| invalid())?;
            version = version.with_build_date(date);
        }
        Ok(version)
    }
}

impl TryFrom<String> for GameVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<GameVersion> for String {
    fn from(value: GameVersion) -> Self {
        value.to_string()
    }
}

/// Source of the running game's build (binary sniffing lives outside this crate)
pub trait VersionProbe {
    fn probe(&self) -> Result<GameVersion>;
}

/// Probe that always reports a known version, e.g. from configuration
#[derive(Debug, Clone, Copy)]
pub struct FixedVersion(pub GameVersion);

impl VersionProbe for FixedVersion {
    fn probe(&self) -> Result<GameVersion> {
        Ok(self.0)
    }
}

/// Values keyed by the first game version they apply to
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    entries: Vec<(GameVersion, T)>,
}

impl<T> Versioned<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register `value` for `since` and every later version
    pub fn with(mut self, since: GameVersion, value: T) -> Self {
        let at = self.entries.partition_point(|(v, _)| *v <= since);
        self.entries.insert(at, (since, value));
        self
    }

    /// Newest entry whose starting version is not after `version`
    pub fn select(&self, version: &GameVersion) -> Option<&T> {
        let selected = self.entries.iter().rev().find(|(since, _)| since <= version);
        if let Some((since, _)) = selected {
            debug!("Version {} uses layout introduced in {}", version, since);
        }
        selected.map(|(_, value)| value)
    }
}

impl<T> Default for Versioned<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_version() {
        let v: GameVersion = "6.5.0".parse().unwrap();
        assert_eq!(v, GameVersion::new(6, 5, 0));
        assert_eq!(v.to_string(), "6.5.0");
    }

    #[test]
    fn test_parse_version_with_build_date() {
        let v: GameVersion = "6.5.1+2023.10.03".parse().unwrap();
        assert_eq!(v.build_date, NaiveDate::from_ymd_opt(2023, 10, 3));
        assert_eq!(v.to_string(), "6.5.1+2023.10.03");
    }

    #[test]
    fn test_parse_invalid_versions() {
        for bad in ["", "6.5", "6.5.0.1", "a.b.c", "6.5.0+yesterday"] {
            assert!(bad.parse::<GameVersion>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn test_version_ordering() {
        assert!(GameVersion::new(6, 4, 8) < GameVersion::new(6, 5, 0));
        assert!(GameVersion::new(7, 0, 0) > GameVersion::new(6, 58, 0));
        let dated = GameVersion::new(6, 5, 0)
            .with_build_date(NaiveDate::from_ymd_opt(2023, 10, 3).unwrap());
        assert!(dated >= GameVersion::new(6, 5, 0));
    }

    #[test]
    fn test_versioned_select() {
        let layouts = Versioned::new()
            .with(GameVersion::new(6, 5, 0), "v650")
            .with(GameVersion::new(0, 0, 0), "legacy");

        assert_eq!(layouts.select(&GameVersion::new(6, 4, 5)), Some(&"legacy"));
        assert_eq!(layouts.select(&GameVersion::new(6, 5, 0)), Some(&"v650"));
        assert_eq!(layouts.select(&GameVersion::new(7, 1, 0)), Some(&"v650"));
    }

    #[test]
    fn test_versioned_select_before_first_entry() {
        let layouts = Versioned::new().with(GameVersion::new(6, 5, 0), 1);
        assert_eq!(layouts.select(&GameVersion::new(6, 0, 0)), None);
    }

    #[test]
    fn test_fixed_probe() {
        let probe = FixedVersion(GameVersion::new(6, 5, 8));
        assert_eq!(probe.probe().unwrap(), GameVersion::new(6, 5, 8));
    }

    #[test]
    fn test_version_serde_as_string() {
        let json = serde_json::to_string(&GameVersion::new(6, 5, 0)).unwrap();
        assert_eq!(json, "\"6.5.0\"");
        let back: GameVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GameVersion::new(6, 5, 0));
    }
}
