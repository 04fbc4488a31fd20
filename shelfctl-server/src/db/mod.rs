//! Storage layer - store traits, PostgreSQL repositories, in-memory store
//!
//! # Design Principles
//!
//! - One store trait per record type; `Store` bundles all four
//! - Postgres relies on DB constraints and maps violations - no check-then-insert
//! - Author deletion (nullify posts, cascade profile) runs as one transaction
//! - `MemoryStore` enforces the same rules under a single write lock

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repos;

use async_trait::async_trait;
use serde::Serialize;

use shelfctl_core::models::book::TITLE_UNIQUE_MESSAGE;
use shelfctl_core::models::{
    Author, AuthorProfile, Book, NewAuthor, NewAuthorProfile, NewBook, NewPost, Paginated,
    Pagination, Post,
};

pub use memory::MemoryStore;
pub use pool::create_pool;
pub use repos::PgStore;

pub const AUTHOR_UNIQUE_MESSAGE: &str = "Author with this username already exists.";
pub const PROFILE_UNIQUE_MESSAGE: &str = "Author profile with this author already exists.";

/// Storage error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Uniqueness constraint violated on `field`
    #[error("{message}")]
    Conflict { field: &'static str, message: String },
}

impl StoreError {
    pub fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn duplicate_title() -> Self {
        Self::Conflict {
            field: "title",
            message: TITLE_UNIQUE_MESSAGE.to_string(),
        }
    }

    pub fn duplicate_username() -> Self {
        Self::Conflict {
            field: "username",
            message: AUTHOR_UNIQUE_MESSAGE.to_string(),
        }
    }

    pub fn duplicate_profile() -> Self {
        Self::Conflict {
            field: "author",
            message: PROFILE_UNIQUE_MESSAGE.to_string(),
        }
    }
}

/// Side effects of deleting an author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthorDeletion {
    pub author_id: i64,
    /// Posts whose `author_id` was set to null
    pub posts_detached: u64,
    pub profile_deleted: bool,
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create_book(&self, book: NewBook) -> Result<Book, StoreError>;
    async fn get_book(&self, id: i64) -> Result<Book, StoreError>;
    async fn update_book(&self, id: i64, book: NewBook) -> Result<Book, StoreError>;
    async fn delete_book(&self, id: i64) -> Result<(), StoreError>;
    async fn list_books(&self, page: Pagination) -> Result<Paginated<Book>, StoreError>;
}

#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn create_author(&self, author: NewAuthor) -> Result<Author, StoreError>;
    async fn get_author(&self, id: i64) -> Result<Author, StoreError>;
    async fn update_author(&self, id: i64, author: NewAuthor) -> Result<Author, StoreError>;
    /// Nullifies `author_id` on the author's posts and deletes its profile.
    async fn delete_author(&self, id: i64) -> Result<AuthorDeletion, StoreError>;
    async fn list_authors(&self, page: Pagination) -> Result<Paginated<Author>, StoreError>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fails with `NotFound` if `author_id` names a missing author.
    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError>;
    async fn get_post(&self, id: i64) -> Result<Post, StoreError>;
    /// `created_at` is left untouched.
    async fn update_post(&self, id: i64, post: NewPost) -> Result<Post, StoreError>;
    async fn delete_post(&self, id: i64) -> Result<(), StoreError>;
    async fn list_posts(&self, page: Pagination) -> Result<Paginated<Post>, StoreError>;
    /// Reverse relation `Author.posts`
    async fn posts_by_author(
        &self,
        author_id: i64,
        page: Pagination,
    ) -> Result<Paginated<Post>, StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fails with `Conflict` if the author already has a profile.
    async fn create_profile(&self, profile: NewAuthorProfile)
        -> Result<AuthorProfile, StoreError>;
    async fn get_profile(&self, id: i64) -> Result<AuthorProfile, StoreError>;
    async fn update_profile(
        &self,
        id: i64,
        profile: NewAuthorProfile,
    ) -> Result<AuthorProfile, StoreError>;
    async fn delete_profile(&self, id: i64) -> Result<(), StoreError>;
    async fn list_profiles(&self, page: Pagination)
        -> Result<Paginated<AuthorProfile>, StoreError>;
    /// Reverse relation `Author.profile`
    async fn profile_for_author(&self, author_id: i64) -> Result<AuthorProfile, StoreError>;
}

/// Everything the HTTP layer needs
pub trait Store: BookStore + AuthorStore + PostStore + ProfileStore {}

impl<T> Store for T where T: BookStore + AuthorStore + PostStore + ProfileStore {}
