//! Station identifier type.

use std::fmt;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A stable station identifier as used by the journey planner
/// (e.g. `de:08111:6118`).
///
/// Identifiers are opaque. The only validation is that they are non-empty
/// and contain no whitespace, since they are passed verbatim as query
/// parameters.
///
/// # Examples
///
/// ```
/// use transit_harvest::domain::StationId;
///
/// let id = StationId::parse("de:08111:6118").unwrap();
/// assert_eq!(id.as_str(), "de:08111:6118");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("de 08111").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(String);

impl StationId {
    /// Parse a station identifier, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(InvalidStationId {
                reason: "must not contain whitespace",
            });
        }

        Ok(StationId(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Roundtrip: parse then as_str returns the original
        #[test]
        fn roundtrip(s in "[a-z]{2}:[0-9]{5}:[0-9]{1,5}") {
            let id = StationId::parse(&s).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// Inner whitespace is always rejected
        #[test]
        fn inner_whitespace_rejected(a in "[a-z0-9]{1,5}", b in "[a-z0-9]{1,5}") {
            let joined = format!("{a} {b}");
            prop_assert!(StationId::parse(&joined).is_err());
        }
    }
}
