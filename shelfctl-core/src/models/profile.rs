//! Author profile - one per author, deleted with it

use serde::{Deserialize, Serialize};
use url::Url;

use super::validation::{optional_text, trimmed, validated_text};
use super::ValidationError;

pub const MAX_WEBSITE_LEN: usize = 255;

/// Stored file references are capped at 100 characters
pub const MAX_AVATAR_LEN: usize = 100;

/// Namespace avatars are stored under
pub const AVATAR_DIR: &str = "avatars";

const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

validated_text!(
    /// Validated personal website URL
    WebsiteUrl
);

impl WebsiteUrl {
    /// # Example
    /// ```
    /// use shelfctl_core::models::WebsiteUrl;
    ///
    /// assert!(WebsiteUrl::new("https://example.com/me").is_ok());
    /// assert!(WebsiteUrl::new("mailto:me@example.com").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let (t, len) = trimmed(s);

        if len == 0 {
            return Err(ValidationError::blank("personal_website"));
        }

        if len > MAX_WEBSITE_LEN {
            return Err(ValidationError::TooLong {
                field: "personal_website",
                max: MAX_WEBSITE_LEN,
            });
        }

        let url = Url::parse(t).map_err(|_| ValidationError::InvalidFormat {
            field: "personal_website",
            reason: "enter a valid URL",
        })?;

        if !URL_SCHEMES.contains(&url.scheme()) || url.host_str().is_none() {
            return Err(ValidationError::InvalidFormat {
                field: "personal_website",
                reason: "URL must use http, https, ftp or ftps and name a host",
            });
        }

        Ok(Self(t.to_owned()))
    }
}

validated_text!(
    /// Relative path of a stored avatar image, e.g. `avatars/me.png`
    AvatarPath
);

impl AvatarPath {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let (t, len) = trimmed(s);

        if len == 0 {
            return Err(ValidationError::blank("avatar"));
        }

        if len > MAX_AVATAR_LEN {
            return Err(ValidationError::TooLong {
                field: "avatar",
                max: MAX_AVATAR_LEN,
            });
        }

        let mut parts = t.split('/');
        let in_namespace = parts.next() == Some(AVATAR_DIR);
        let rest: Vec<&str> = parts.collect();
        if !in_namespace
            || rest.is_empty()
            || rest.iter().any(|p| p.is_empty() || *p == "." || *p == "..")
        {
            return Err(ValidationError::InvalidFormat {
                field: "avatar",
                reason: "must be a stored file under avatars/",
            });
        }

        Ok(Self(t.to_owned()))
    }
}

/// Persisted author profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub id: i64,
    pub about: Option<String>,
    pub personal_website: Option<String>,
    pub avatar: String,
    pub author_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorProfileInput {
    pub about: Option<String>,
    pub personal_website: Option<String>,
    pub avatar: Option<String>,
    pub author_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthorProfile {
    pub about: Option<String>,
    pub personal_website: Option<WebsiteUrl>,
    pub avatar: AvatarPath,
    pub author_id: i64,
}

impl AuthorProfileInput {
    pub fn validate(self) -> Result<NewAuthorProfile, ValidationError> {
        let about = optional_text(self.about.as_deref(), "about", None)?;
        let personal_website = match optional_text(
            self.personal_website.as_deref(),
            "personal_website",
            None,
        )? {
            Some(url) => Some(WebsiteUrl::new(&url)?),
            None => None,
        };
        let avatar = AvatarPath::new(self.avatar.as_deref().unwrap_or_default())?;
        let author_id = self
            .author_id
            .ok_or_else(|| ValidationError::blank("author"))?;

        Ok(NewAuthorProfile {
            about,
            personal_website,
            avatar,
            author_id,
        })
    }
}
