//! Validation error types

use std::fmt;

/// Validation error for record fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is blank. `message` overrides the default wording.
    Blank {
        field: &'static str,
        message: Option<&'static str>,
    },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Field is below minimum length
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    /// Decimal does not fit the column precision
    Precision {
        field: &'static str,
        max_digits: u32,
        decimal_places: u32,
    },

    /// String doesn't match required format (e.g., URL)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Value is not one of the allowed choices
    InvalidChoice { field: &'static str, value: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Blank { field, .. }
            | Self::TooLong { field, .. }
            | Self::TooShort { field, .. }
            | Self::Precision { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::InvalidChoice { field, .. } => field,
        }
    }

    pub(crate) fn blank(field: &'static str) -> Self {
        Self::Blank {
            field,
            message: None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank {
                message: Some(message),
                ..
            } => f.write_str(message),
            Self::Blank {
                field,
                message: None,
            } => write!(f, "{} cannot be blank", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::TooShort { field, min, actual } => write!(
                f,
                "{} must have at least {} characters (it has {})",
                field, min, actual
            ),
            Self::Precision {
                field,
                max_digits,
                decimal_places,
            } => write!(
                f,
                "{} must have at most {} digits in total and {} decimal places",
                field, max_digits, decimal_places
            ),
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidChoice { field, value } => {
                write!(f, "'{}' is not a valid choice for {}", value, field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Declares a validated text newtype with the usual accessors.
macro_rules! validated_text {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Get the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

pub(crate) use validated_text;

/// Trim `s` and count its characters.
pub(crate) fn trimmed(s: &str) -> (&str, usize) {
    let t = s.trim();
    (t, t.chars().count())
}

/// Required text with an upper bound.
pub(crate) fn required_text(
    s: &str,
    field: &'static str,
    max: usize,
) -> Result<String, ValidationError> {
    let (t, len) = trimmed(s);
    if len == 0 {
        return Err(ValidationError::blank(field));
    }
    if len > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(t.to_owned())
}

/// Required text with a lower bound.
pub(crate) fn min_text(s: &str, field: &'static str, min: usize) -> Result<String, ValidationError> {
    let (t, len) = trimmed(s);
    if len == 0 {
        return Err(ValidationError::blank(field));
    }
    if len < min {
        return Err(ValidationError::TooShort {
            field,
            min,
            actual: len,
        });
    }
    Ok(t.to_owned())
}

/// Optional text; blank becomes `None`.
pub(crate) fn optional_text(
    s: Option<&str>,
    field: &'static str,
    max: Option<usize>,
) -> Result<Option<String>, ValidationError> {
    let Some(s) = s else { return Ok(None) };
    let (t, len) = trimmed(s);
    if len == 0 {
        return Ok(None);
    }
    if let Some(max) = max {
        if len > max {
            return Err(ValidationError::TooLong { field, max });
        }
    }
    Ok(Some(t.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 125,
        };
        assert_eq!(
            err.to_string(),
            "title exceeds maximum length of 125 characters"
        );
    }

    #[test]
    fn blank_uses_custom_message() {
        let err = ValidationError::Blank {
            field: "title",
            message: Some("no title"),
        };
        assert_eq!(err.to_string(), "no title");
        assert_eq!(ValidationError::blank("username").to_string(), "username cannot be blank");
    }

    #[test]
    fn lengths_count_characters() {
        // 20 two-byte characters
        let s = "ж".repeat(20);
        assert!(min_text(&s, "description", 20).is_ok());
        assert!(required_text(&s, "name", 20).is_ok());
        assert!(required_text(&s, "name", 19).is_err());
    }

    #[test]
    fn optional_blank_is_none() {
        assert_eq!(optional_text(Some("   "), "comment", None).unwrap(), None);
        assert_eq!(optional_text(None, "comment", None).unwrap(), None);
        assert_eq!(
            optional_text(Some(" hi "), "comment", Some(5)).unwrap().as_deref(),
            Some("hi")
        );
    }
}
