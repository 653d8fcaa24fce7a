//! Location query model

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Result, WeatherGenError};

/// A user-supplied place name such as `"Tokyo, Japan"`
///
/// The text is opaque: the generative model resolves it. The only check is
/// that something other than whitespace was typed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct LocationQuery(String);

impl LocationQuery {
    /// Parse a raw search string, trimming surrounding whitespace
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(WeatherGenError::validation("Location cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LocationQuery {
    type Error = WeatherGenError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<LocationQuery> for String {
    fn from(value: LocationQuery) -> Self {
        value.0
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_location_is_trimmed() {
        let location = LocationQuery::parse("  Tokyo, Japan \n").unwrap();
        assert_eq!(location.as_str(), "Tokyo, Japan");
        assert_eq!(location.to_string(), "Tokyo, Japan");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn test_blank_location_rejected(#[case] input: &str) {
        let err = LocationQuery::parse(input).unwrap_err();
        assert!(matches!(err, WeatherGenError::Validation { .. }));
        assert!(err.to_string().contains("Location cannot be empty"));
    }

    #[test]
    fn test_location_deserialization_validates() {
        let parsed: LocationQuery = serde_json::from_str("\" Berlin \"").unwrap();
        assert_eq!(parsed.as_str(), "Berlin");
        assert!(serde_json::from_str::<LocationQuery>("\"  \"").is_err());
    }
}
