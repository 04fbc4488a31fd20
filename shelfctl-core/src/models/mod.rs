//! Record types with validation at construction
//!
//! Editor input (`*Input`) is validated into drafts (`New*`) before any
//! store sees it. Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod book;
pub mod author;
pub mod post;
pub mod profile;
pub mod pagination;

pub use validation::ValidationError;
pub use book::{Book, BookDescription, BookInput, BookTitle, Category, NewBook, Price};
pub use author::{Author, AuthorInput, NewAuthor, Username};
pub use post::{NewPost, Post, PostContent, PostInput, PostTitle};
pub use profile::{AuthorProfile, AuthorProfileInput, AvatarPath, NewAuthorProfile, WebsiteUrl};
pub use pagination::{Paginated, Pagination, PaginationParams};
