use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Declares a UUID-backed identifier with `Debug`, `Display` and `FromStr`.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub fn value(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self).map_err(|_| ParseIdError {
                    kind: stringify!($name).to_string(),
                })
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a user.
    UserId
);
uuid_id!(
    /// Unique identifier for a quiz design.
    DesignId
);
uuid_id!(
    /// Unique identifier for a generated quiz.
    QuizId
);
uuid_id!(
    /// Unique identifier for a question bound to a quiz.
    QuestionId
);
uuid_id!(
    /// Unique identifier for a submitted answer.
    AnswerId
);

/// Identifier of a subject that questions are grouped under.
///
/// Subjects are free-form names (for example `"arithmetic.addition"`); the only
/// requirement is that they are non-empty.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    /// Creates a subject identifier.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the name is empty or only whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, ParseIdError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ParseIdError {
                kind: "SubjectId".to_string(),
            });
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubjectId({})", self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubjectId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ─── Errors ────────────────────────────────────────────────────────────────────

/// Error type for parsing an ID from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(QuizId::generate(), QuizId::generate());
    }

    #[test]
    fn quiz_id_round_trips_through_string() {
        let original = QuizId::generate();
        let parsed: QuizId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn question_id_from_str_invalid() {
        let err = "not-a-uuid".parse::<QuestionId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse QuestionId from string");
    }

    #[test]
    fn debug_names_the_id_kind() {
        let id = UserId::from_uuid(Uuid::nil());
        assert_eq!(
            format!("{id:?}"),
            "UserId(00000000-0000-0000-0000-000000000000)"
        );
    }

    #[test]
    fn subject_rejects_blank_names() {
        assert!(SubjectId::new("  ").is_err());
        assert!("".parse::<SubjectId>().is_err());
    }

    #[test]
    fn subject_display_is_the_name() {
        let subject = SubjectId::new("math.addition").unwrap();
        assert_eq!(subject.to_string(), "math.addition");
        assert_eq!(subject.as_str(), "math.addition");
    }
}
