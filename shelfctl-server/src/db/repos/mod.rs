//! PostgreSQL repositories
//!
//! Each repository follows these patterns:
//! - Single-statement writes with RETURNING (no re-read)
//! - Constraint violations mapped to field conflicts by constraint name
//! - List operations count with `COUNT(*) OVER()` in the same query, and
//!   fall back to a plain count for pages past the end

pub mod authors;
pub mod books;
pub mod posts;
pub mod profiles;

use std::future::Future;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use shelfctl_core::models::{Paginated, Pagination};

use super::migrations::{AUTHOR_USERNAME_KEY, BOOK_TITLE_KEY, PROFILE_AUTHOR_KEY};
use super::StoreError;

pub use authors::AuthorRepo;
pub use books::BookRepo;
pub use posts::PostRepo;
pub use profiles::ProfileRepo;

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a sqlx error to a store error.
///
/// Unique violations become field conflicts. A foreign-key violation can only
/// come from an `author_id` column, so it becomes a missing author.
pub(crate) fn classify(err: sqlx::Error, author_id: Option<i64>) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match db.constraint() {
                Some(BOOK_TITLE_KEY) => return StoreError::duplicate_title(),
                Some(AUTHOR_USERNAME_KEY) => return StoreError::duplicate_username(),
                Some(PROFILE_AUTHOR_KEY) => return StoreError::duplicate_profile(),
                _ => {}
            }
        }

        if db.is_foreign_key_violation() {
            if let Some(id) = author_id {
                return StoreError::not_found("author", id);
            }
        }
    }

    StoreError::Sqlx(err)
}

/// Build a page from rows carrying a `total` window column.
///
/// An empty page past the first has no row to read the window from, so
/// `count` is awaited instead.
pub(crate) async fn paginate<T, C>(
    rows: Vec<PgRow>,
    page: Pagination,
    decode: impl Fn(&PgRow) -> Result<T, sqlx::Error>,
    count: C,
) -> Result<Paginated<T>, StoreError>
where
    C: Future<Output = Result<i64, sqlx::Error>>,
{
    let total = match rows.first() {
        Some(r) => r.try_get::<i64, _>("total")?,
        None if page.page > 1 => count.await?,
        None => 0,
    };
    let items = rows.iter().map(decode).collect::<Result<Vec<_>, _>>()?;

    Ok(Paginated {
        items,
        total,
        page: page.page,
        per_page: page.per_page,
    })
}

/// Decode error for a column holding a value the model rejects.
pub(crate) fn decode_error(
    column: &str,
    err: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_owned(),
        source: Box::new(err),
    }
}
