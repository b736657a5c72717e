//! Product schema versions.
//!
//! Versions are 4-component tuples (`major.minor.patch.security`) with a
//! total ordering. Historical releases used 3-component strings (`"2.1.8"`),
//! so parsing accepts 2 to 4 dot-separated components and zero-fills the
//! rest: `"2.1.8"` and `"2.1.8.0"` denote the same version.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A schema version recorded in the ledger and used to key upgrade steps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
    security: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32, security: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            security,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.security
        )
    }
}

impl FromStr for Version {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(AppError::VersionParse {
                input: s.to_string(),
                reason: "expected 2 to 4 dot-separated components".to_string(),
            });
        }

        let mut components = [0u32; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part.parse().map_err(|_| AppError::VersionParse {
                input: s.to_string(),
                reason: format!("component '{}' is not a non-negative integer", part),
            })?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

impl TryFrom<String> for Version {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_four_components() {
        let v: Version = "4.11.0.0".parse().unwrap();
        assert_eq!(v, Version::new(4, 11, 0, 0));
    }

    #[test]
    fn test_parse_three_components_zero_fills() {
        let v: Version = "2.1.8".parse().unwrap();
        assert_eq!(v, Version::new(2, 1, 8, 0));
        assert_eq!(v, "2.1.8.0".parse().unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Version>().is_err());
        assert!("4".parse::<Version>().is_err());
        assert!("4.x.0".parse::<Version>().is_err());
        assert!("1.2.3.4.5".parse::<Version>().is_err());
        assert!("-1.2.3".parse::<Version>().is_err());
    }

    #[test]
    fn test_ordering() {
        let a: Version = "2.2.14".parse().unwrap();
        let b: Version = "3.0.0".parse().unwrap();
        let c: Version = "3.0.0.1".parse().unwrap();
        assert!(a < b);
        assert!(b < c);
        assert!("2.2.4".parse::<Version>().unwrap() < "2.2.14".parse::<Version>().unwrap());
    }

    #[test]
    fn test_display_round_trip() {
        let v: Version = "3.0.2".parse().unwrap();
        assert_eq!(v.to_string(), "3.0.2.0");
        assert_eq!(v.to_string().parse::<Version>().unwrap(), v);
    }
}
