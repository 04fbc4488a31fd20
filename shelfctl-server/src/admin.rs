//! Admin registry
//!
//! Describes each record type exposed for CRUD editing: labels, help texts,
//! constraints and choices. The HTTP layer serves these descriptors so an
//! editor can build forms without hard-coding the schema.

use serde::Serialize;

use shelfctl_core::models::{author, book, post, profile, Category};

use crate::db::migrations::{AUTHOR_TABLE, BOOK_TABLE, POST_TABLE, PROFILE_TABLE};

/// App label shared by every registered model
pub const APP_LABEL: &str = "my_app";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("model '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// Editor widget kind for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Id,
    Text,
    LongText,
    DateTime,
    Decimal,
    Choice,
    Url,
    Image,
    ForeignKey,
    OneToOne,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

/// One editable (or read-only) field of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<&'static str>,
    pub required: bool,
    pub unique: bool,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_digits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    /// Target model for relations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<&'static str>,
}

impl FieldDescriptor {
    /// Optional, editable field. The label defaults to the name.
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            label: name,
            help_text: None,
            required: false,
            unique: false,
            read_only: false,
            max_length: None,
            min_length: None,
            max_digits: None,
            decimal_places: None,
            choices: Vec::new(),
            default: None,
            references: None,
        }
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn help(mut self, text: &'static str) -> Self {
        self.help_text = Some(text);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn digits(mut self, max_digits: u32, decimal_places: u32) -> Self {
        self.max_digits = Some(max_digits);
        self.decimal_places = Some(decimal_places);
        self
    }

    pub fn choices(mut self, choices: Vec<Choice>, default: &'static str) -> Self {
        self.choices = choices;
        self.default = Some(default);
        self
    }

    pub fn references(mut self, model: &'static str) -> Self {
        self.references = Some(model);
        self
    }
}

/// Registration of one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelAdmin {
    pub app_label: &'static str,
    pub model_name: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub table: &'static str,
    /// Collection path on the HTTP API
    pub api_path: &'static str,
    /// List ordering, `-` prefix for descending
    pub ordering: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

impl ModelAdmin {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Registered models, in registration order
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminSite {
    models: Vec<ModelAdmin>,
}

impl AdminSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Site with book, author, author profile and post registered.
    pub fn default_site() -> Self {
        let mut site = Self::new();
        for model in [book_admin(), author_admin(), profile_admin(), post_admin()] {
            // Fresh site, names are distinct
            let _ = site.register(model);
        }
        site
    }

    pub fn register(&mut self, model: ModelAdmin) -> Result<(), AdminError> {
        if self.get(model.model_name).is_some() {
            return Err(AdminError::AlreadyRegistered(model.model_name.to_string()));
        }
        tracing::debug!(model = model.model_name, table = model.table, "registered model");
        self.models.push(model);
        Ok(())
    }

    pub fn get(&self, model_name: &str) -> Option<&ModelAdmin> {
        self.models.iter().find(|m| m.model_name == model_name)
    }

    pub fn models(&self) -> &[ModelAdmin] {
        &self.models
    }
}

fn id_field() -> FieldDescriptor {
    FieldDescriptor::new("id", FieldKind::Id).label("ID").read_only()
}

fn book_admin() -> ModelAdmin {
    let choices = Category::all()
        .iter()
        .map(|c| Choice {
            value: c.as_str(),
            label: c.label(),
        })
        .collect();

    ModelAdmin {
        app_label: APP_LABEL,
        model_name: "book",
        verbose_name: "book",
        verbose_name_plural: "books",
        table: BOOK_TABLE,
        api_path: "/books",
        ordering: "-id",
        fields: vec![
            id_field(),
            FieldDescriptor::new("title", FieldKind::Text)
                .label("Book title")
                .required()
                .unique()
                .max_length(book::MAX_TITLE_LEN),
            FieldDescriptor::new("description", FieldKind::LongText)
                .label("Book description")
                .required()
                .min_length(book::MIN_DESCRIPTION_LEN),
            FieldDescriptor::new("comment", FieldKind::LongText),
            FieldDescriptor::new("published_date", FieldKind::DateTime)
                .label("Publication date")
                .required(),
            FieldDescriptor::new("price", FieldKind::Decimal)
                .label("Book price")
                .help("Book price in euros. Should be greater than 0")
                .digits(book::PRICE_MAX_DIGITS, book::PRICE_DECIMAL_PLACES),
            FieldDescriptor::new("category", FieldKind::Choice)
                .label("Book category")
                .help("Book category from the list offered. If unknown, choose 'N/A'")
                .max_length(book::MAX_CATEGORY_LEN)
                .choices(choices, Category::default().as_str()),
        ],
    }
}

fn author_admin() -> ModelAdmin {
    ModelAdmin {
        app_label: APP_LABEL,
        model_name: "author",
        verbose_name: "author",
        verbose_name_plural: "authors",
        table: AUTHOR_TABLE,
        api_path: "/authors",
        ordering: "-id",
        fields: vec![
            id_field(),
            FieldDescriptor::new("username", FieldKind::Text)
                .required()
                .unique()
                .max_length(author::MAX_USERNAME_LEN),
            FieldDescriptor::new("first_name", FieldKind::Text)
                .label("first name")
                .max_length(author::MAX_FIRST_NAME_LEN),
            FieldDescriptor::new("last_name", FieldKind::Text)
                .label("last name")
                .max_length(author::MAX_LAST_NAME_LEN),
        ],
    }
}

fn profile_admin() -> ModelAdmin {
    ModelAdmin {
        app_label: APP_LABEL,
        model_name: "authorprofile",
        verbose_name: "author profile",
        verbose_name_plural: "author profiles",
        table: PROFILE_TABLE,
        api_path: "/author-profiles",
        ordering: "-id",
        fields: vec![
            id_field(),
            FieldDescriptor::new("about", FieldKind::LongText),
            FieldDescriptor::new("personal_website", FieldKind::Url)
                .label("personal website")
                .max_length(profile::MAX_WEBSITE_LEN),
            FieldDescriptor::new("avatar", FieldKind::Image)
                .help("Upload through /media/avatars first, then store the returned path")
                .required()
                .max_length(profile::MAX_AVATAR_LEN),
            FieldDescriptor::new("author_id", FieldKind::OneToOne)
                .label("author")
                .required()
                .unique()
                .references("author"),
        ],
    }
}

fn post_admin() -> ModelAdmin {
    ModelAdmin {
        app_label: APP_LABEL,
        model_name: "post",
        verbose_name: "post",
        verbose_name_plural: "posts",
        table: POST_TABLE,
        api_path: "/posts",
        ordering: "-id",
        fields: vec![
            id_field(),
            FieldDescriptor::new("title", FieldKind::Text)
                .required()
                .max_length(post::MAX_TITLE_LEN),
            FieldDescriptor::new("content", FieldKind::LongText)
                .required()
                .min_length(post::MIN_CONTENT_LEN),
            FieldDescriptor::new("author_id", FieldKind::ForeignKey)
                .label("author")
                .references("author"),
            FieldDescriptor::new("created_at", FieldKind::DateTime)
                .label("created at")
                .read_only(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_site_registers_all_models() {
        let site = AdminSite::default_site();
        let names: Vec<_> = site.models().iter().map(|m| m.model_name).collect();
        assert_eq!(names, ["book", "author", "authorprofile", "post"]);

        for model in site.models() {
            assert_eq!(model.app_label, APP_LABEL);
            assert!(model.table.starts_with("my_app_"));
        }
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut site = AdminSite::default_site();
        let err = site.register(book_admin()).unwrap_err();
        assert_eq!(err, AdminError::AlreadyRegistered("book".into()));
        assert_eq!(site.models().len(), 4);
    }

    #[test]
    fn book_fields_carry_labels_and_choices() {
        let site = AdminSite::default_site();
        let book = site.get("book").unwrap();

        let title = book.field("title").unwrap();
        assert_eq!(title.label, "Book title");
        assert!(title.required && title.unique);
        assert_eq!(title.max_length, Some(125));

        let price = book.field("price").unwrap();
        assert!(!price.required);
        assert_eq!((price.max_digits, price.decimal_places), (Some(5), Some(2)));
        assert_eq!(
            price.help_text,
            Some("Book price in euros. Should be greater than 0")
        );

        let category = book.field("category").unwrap();
        assert_eq!(category.default, Some("N/A"));
        assert_eq!(category.choices.len(), 4);
        assert!(category
            .choices
            .iter()
            .any(|c| c.value == "N/A" && c.label == "UNRECOGNISED CATEGORY"));
    }

    #[test]
    fn relations_reference_author() {
        let site = AdminSite::default_site();
        let post_author = site.get("post").unwrap().field("author_id").unwrap();
        assert_eq!(post_author.kind, FieldKind::ForeignKey);
        assert!(!post_author.required);

        let profile_author = site.get("authorprofile").unwrap().field("author_id").unwrap();
        assert_eq!(profile_author.kind, FieldKind::OneToOne);
        assert!(profile_author.required && profile_author.unique);
        assert_eq!(profile_author.references, Some("author"));
    }

    #[test]
    fn serializes_without_empty_options() {
        let site = AdminSite::default_site();
        let json = serde_json::to_value(site.get("author").unwrap()).unwrap();
        let username = &json["fields"][1];
        assert_eq!(username["name"], "username");
        assert_eq!(username["max_length"], 30);
        assert!(username.get("choices").is_none());
        assert!(username.get("help_text").is_none());
    }
}
