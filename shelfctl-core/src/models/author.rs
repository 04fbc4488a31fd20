//! Author record

use serde::{Deserialize, Serialize};

use super::validation::{optional_text, required_text, validated_text};
use super::ValidationError;

/// Maximum length for usernames
pub const MAX_USERNAME_LEN: usize = 30;
pub const MAX_FIRST_NAME_LEN: usize = 20;
pub const MAX_LAST_NAME_LEN: usize = 25;

validated_text!(
    /// Validated username (unique across authors)
    Username
);

impl Username {
    /// # Example
    /// ```
    /// use shelfctl_core::models::Username;
    ///
    /// assert!(Username::new("tolkien").is_ok());
    /// assert!(Username::new("").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text(s, "username", MAX_USERNAME_LEN).map(Self)
    }
}

/// Persisted author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorInput {
    #[serde(default)]
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub username: Username,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl AuthorInput {
    pub fn validate(self) -> Result<NewAuthor, ValidationError> {
        Ok(NewAuthor {
            username: Username::new(&self.username)?,
            first_name: optional_text(
                self.first_name.as_deref(),
                "first_name",
                Some(MAX_FIRST_NAME_LEN),
            )?,
            last_name: optional_text(
                self.last_name.as_deref(),
                "last_name",
                Some(MAX_LAST_NAME_LEN),
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_bounds() {
        assert!(Username::new(&"u".repeat(30)).is_ok());
        assert!(matches!(
            Username::new(&"u".repeat(31)).unwrap_err(),
            ValidationError::TooLong { max: 30, .. }
        ));
        assert!(matches!(
            Username::new("   ").unwrap_err(),
            ValidationError::Blank { .. }
        ));
    }

    #[test]
    fn names_are_optional_and_bounded() {
        let author = AuthorInput {
            username: "jrr".into(),
            first_name: Some("".into()),
            last_name: None,
        }
        .validate()
        .unwrap();
        assert_eq!(author.first_name, None);

        let err = AuthorInput {
            username: "jrr".into(),
            first_name: Some("f".repeat(21)),
            last_name: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::TooLong { field: "first_name", max: 20 });

        let err = AuthorInput {
            username: "jrr".into(),
            first_name: None,
            last_name: Some("l".repeat(26)),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::TooLong { field: "last_name", max: 25 });
    }
}
