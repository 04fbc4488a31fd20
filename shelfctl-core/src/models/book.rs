//! Book record and its field rules

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::{min_text, optional_text, trimmed, validated_text};
use super::ValidationError;

/// Maximum length for book titles
pub const MAX_TITLE_LEN: usize = 125;

/// Minimum length for book descriptions
pub const MIN_DESCRIPTION_LEN: usize = 20;

/// Price column precision: NUMERIC(5, 2)
pub const PRICE_MAX_DIGITS: u32 = 5;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

/// Category column width
pub const MAX_CATEGORY_LEN: usize = 30;

pub const TITLE_BLANK_MESSAGE: &str = "Sorry, a book cannot be created without a title.";
pub const TITLE_UNIQUE_MESSAGE: &str = "It looks like a book with this title already exists.";

validated_text!(
    /// Validated book title
    BookTitle
);

impl BookTitle {
    /// Create a new book title.
    ///
    /// # Rules
    /// - Non-blank (after trimming whitespace)
    /// - Max 125 characters
    ///
    /// # Example
    /// ```
    /// use shelfctl_core::models::BookTitle;
    ///
    /// assert!(BookTitle::new("Dune").is_ok());
    /// assert!(BookTitle::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let (t, len) = trimmed(s);

        if len == 0 {
            return Err(ValidationError::Blank {
                field: "title",
                message: Some(TITLE_BLANK_MESSAGE),
            });
        }

        if len > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }

        Ok(Self(t.to_owned()))
    }
}

validated_text!(
    /// Validated book description (at least 20 characters)
    BookDescription
);

impl BookDescription {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        min_text(s, "description", MIN_DESCRIPTION_LEN).map(Self)
    }
}

/// Book category.
///
/// Stored and serialized as its code (`"Fantasy"`, ..., `"N/A"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Fantasy,
    Mystic,
    Biography,
    #[default]
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fantasy => "Fantasy",
            Self::Mystic => "Mystic",
            Self::Biography => "Biography",
            Self::NotApplicable => "N/A",
        }
    }

    /// Human-readable label shown in the admin.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fantasy => "FANTASY CATEGORY",
            Self::Mystic => "MYSTIC CATEGORY",
            Self::Biography => "BIOGRAPHY CATEGORY",
            Self::NotApplicable => "UNRECOGNISED CATEGORY",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Fantasy,
            Self::Mystic,
            Self::Biography,
            Self::NotApplicable,
        ]
    }

    /// Parse an optional submitted value; `None` falls back to `N/A`.
    pub fn parse_or_default(value: Option<&str>) -> Result<Self, ValidationError> {
        match value {
            None => Ok(Self::default()),
            Some(v) => v.parse(),
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Codes are matched exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidChoice {
                field: "category",
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated price fitting NUMERIC(5, 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price(Decimal);

impl Price {
    /// Check digit counts the way a NUMERIC(5, 2) column would.
    ///
    /// Trailing zeros count: `1.500` has three decimal places and is rejected.
    ///
    /// # Example
    /// ```
    /// use rust_decimal::Decimal;
    /// use shelfctl_core::models::Price;
    ///
    /// assert!(Price::new(Decimal::new(99999, 2)).is_ok()); // 999.99
    /// assert!(Price::new(Decimal::new(100000, 2)).is_err()); // 1000.00
    /// ```
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        let decimals = value.scale();
        let mantissa = value.mantissa().unsigned_abs();
        let mut len = 1;
        let mut rest = mantissa / 10;
        while rest > 0 {
            len += 1;
            rest /= 10;
        }
        let digits = len.max(decimals);
        let whole = digits - decimals;

        if digits > PRICE_MAX_DIGITS
            || decimals > PRICE_DECIMAL_PLACES
            || whole > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES
        {
            return Err(ValidationError::Precision {
                field: "price",
                max_digits: PRICE_MAX_DIGITS,
                decimal_places: PRICE_DECIMAL_PLACES,
            });
        }

        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Persisted book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub comment: Option<String>,
    pub published_date: DateTime<Utc>,
    pub price: Option<Decimal>,
    pub category: Category,
}

/// Book as submitted by an editor, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub comment: Option<String>,
    pub published_date: Option<DateTime<Utc>>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
}

/// Validated book, ready for the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: BookTitle,
    pub description: BookDescription,
    pub comment: Option<String>,
    pub published_date: DateTime<Utc>,
    pub price: Option<Price>,
    pub category: Category,
}

impl BookInput {
    /// Validate fields in declaration order, stopping at the first failure.
    pub fn validate(self) -> Result<NewBook, ValidationError> {
        let title = BookTitle::new(&self.title)?;
        let description = BookDescription::new(&self.description)?;
        let comment = optional_text(self.comment.as_deref(), "comment", None)?;
        let published_date = self
            .published_date
            .ok_or_else(|| ValidationError::blank("published_date"))?;
        let price = self.price.map(Price::new).transpose()?;
        let category = Category::parse_or_default(self.category.as_deref())?;

        Ok(NewBook {
            title,
            description,
            comment,
            published_date,
            price,
            category,
        })
    }
}

impl From<&Book> for BookInput {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            description: book.description.clone(),
            comment: book.comment.clone(),
            published_date: Some(book.published_date),
            price: book.price,
            category: Some(book.category.as_str().to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BookInput {
        BookInput {
            title: "The Hobbit".into(),
            description: "a".repeat(MIN_DESCRIPTION_LEN),
            published_date: Some(Utc::now()),
            ..Default::default()
        }
    }

    #[test]
    fn blank_title_uses_custom_message() {
        let err = BookTitle::new("  ").unwrap_err();
        assert_eq!(err.to_string(), TITLE_BLANK_MESSAGE);
    }

    #[test]
    fn title_max_length() {
        assert!(BookTitle::new(&"t".repeat(125)).is_ok());
        let err = BookTitle::new(&"t".repeat(126)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 125, .. }));
    }

    #[test]
    fn description_boundary() {
        assert!(BookDescription::new(&"d".repeat(20)).is_ok());
        let err = BookDescription::new(&"d".repeat(19)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TooShort {
                min: 20,
                actual: 19,
                ..
            }
        ));
    }

    #[test]
    fn category_choices() {
        for code in ["Fantasy", "Mystic", "Biography", "N/A"] {
            assert_eq!(code.parse::<Category>().unwrap().as_str(), code);
        }
        assert!(matches!(
            "Horror".parse::<Category>().unwrap_err(),
            ValidationError::InvalidChoice { .. }
        ));
        assert!("fantasy".parse::<Category>().is_err());
    }

    #[test]
    fn category_defaults_to_na() {
        let book = input().validate().unwrap();
        assert_eq!(book.category, Category::NotApplicable);
        assert_eq!(
            serde_json::to_string(&book.category).unwrap(),
            "\"N/A\""
        );
    }

    #[test]
    fn price_precision() {
        assert!(Price::new(Decimal::new(99999, 2)).is_ok());
        assert!(Price::new(Decimal::new(5, 0)).is_ok());
        assert!(Price::new(Decimal::new(-12345, 2)).is_ok());
        // 1000
        assert!(Price::new(Decimal::new(1000, 0)).is_err());
        // 1.234
        assert!(Price::new(Decimal::new(1234, 3)).is_err());
        // 1.500 keeps its scale
        assert!(Price::new(Decimal::new(1500, 3)).is_err());
        // 0.001
        assert!(Price::new(Decimal::new(1, 3)).is_err());
    }

    #[test]
    fn price_is_optional() {
        let book = input().validate().unwrap();
        assert!(book.price.is_none());
    }

    #[test]
    fn published_date_required() {
        let mut i = input();
        i.published_date = None;
        assert_eq!(i.validate().unwrap_err().field(), "published_date");
    }

    #[test]
    fn deserializes_price_from_string_or_number() {
        let json = r#"{"title":"T","description":"abcdefghijklmnopqrstuvwxyz",
            "published_date":"2024-01-01T00:00:00Z","price":"12.50","category":"Mystic"}"#;
        let book = serde_json::from_str::<BookInput>(json)
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(book.price.unwrap().value(), Decimal::new(1250, 2));
        assert_eq!(book.category, Category::Mystic);

        let json = r#"{"title":"T","description":"abcdefghijklmnopqrstuvwxyz",
            "published_date":"2024-01-01T00:00:00Z","price":9.5}"#;
        let book = serde_json::from_str::<BookInput>(json)
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(book.price.unwrap().value(), Decimal::new(95, 1));
    }
}
