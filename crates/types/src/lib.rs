//! Validated primitive types shared across the MHR workspace.
//!
//! - [`NonEmptyText`] for identity and name fields that must carry content
//! - Record identifiers ([`PatientId`], [`PregnancyId`], [`DeliveryId`], [`VisitId`],
//!   [`UserId`]), which are always positive integers

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when creating record identifiers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    /// Identifiers start at 1
    #[error("identifier must be a positive integer")]
    Zero,
    /// The input was not an unsigned integer
    #[error("identifier is not a valid integer: {0}")]
    Malformed(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, trimming the input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(try_from = "u64", into = "u64")]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier, rejecting zero.
            pub fn new(raw: u64) -> Result<Self, IdError> {
                if raw == 0 {
                    return Err(IdError::Zero);
                }
                Ok(Self(raw))
            }

            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl TryFrom<u64> for $name {
            type Error = IdError;

            fn try_from(raw: u64) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| IdError::Malformed(s.to_owned()))?;
                Self::new(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of an authenticated user account.
    UserId
);
record_id!(
    /// Identifier of a patient record.
    PatientId
);
record_id!(
    /// Identifier of a pregnancy record.
    PregnancyId
);
record_id!(
    /// Identifier of a delivery record.
    DeliveryId
);
record_id!(
    /// Identifier of a clinical visit.
    VisitId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Jane  ").expect("should accept padded text");
        assert_eq!(text.as_str(), "Jane");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn ids_reject_zero() {
        assert_eq!(PatientId::new(0), Err(IdError::Zero));
        assert_eq!("0".parse::<DeliveryId>(), Err(IdError::Zero));
    }

    #[test]
    fn ids_parse_from_path_segments() {
        let id: PregnancyId = "42".parse().expect("should parse");
        assert_eq!(id.get(), 42);
        assert!(matches!(
            "abc".parse::<PregnancyId>(),
            Err(IdError::Malformed(_))
        ));
    }

    #[test]
    fn ids_deserialise_through_validation() {
        let id: VisitId = serde_json::from_str("7").expect("should deserialise");
        assert_eq!(id.get(), 7);
        assert!(serde_json::from_str::<VisitId>("0").is_err());
        assert_eq!(serde_json::to_string(&id).expect("serialise"), "7");
    }
}
