//! Book repository
//!
//! Title uniqueness is left to `my_app_book_title_key`.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use shelfctl_core::models::{Book, Category, NewBook, Paginated, Pagination};

use super::{classify, decode_error, paginate, PgStore};
use crate::db::{BookStore, StoreError};

const COLUMNS: &str = "id, title, description, comment, published_date, price, category";

fn decode(row: &PgRow) -> Result<Book, sqlx::Error> {
    let category: String = row.try_get("category")?;
    Ok(Book {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        comment: row.try_get("comment")?,
        published_date: row.try_get("published_date")?,
        price: row.try_get("price")?,
        category: category
            .parse::<Category>()
            .map_err(|e| decode_error("category", e))?,
    })
}

/// Book repository
pub struct BookRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, book: NewBook) -> Result<Book, StoreError> {
        let sql = format!(
            "INSERT INTO my_app_book (title, description, comment, published_date, price, category)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(book.title.as_str())
            .bind(book.description.as_str())
            .bind(book.comment.as_deref())
            .bind(book.published_date)
            .bind(book.price.map(|p| p.value()))
            .bind(book.category.as_str())
            .fetch_one(self.pool)
            .await
            .map_err(|e| classify(e, None))?;

        Ok(decode(&row)?)
    }

    pub async fn get(&self, id: i64) -> Result<Book, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM my_app_book WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("book", id))?;

        Ok(decode(&row)?)
    }

    pub async fn update(&self, id: i64, book: NewBook) -> Result<Book, StoreError> {
        let sql = format!(
            "UPDATE my_app_book
             SET title = $2, description = $3, comment = $4,
                 published_date = $5, price = $6, category = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(book.title.as_str())
            .bind(book.description.as_str())
            .bind(book.comment.as_deref())
            .bind(book.published_date)
            .bind(book.price.map(|p| p.value()))
            .bind(book.category.as_str())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| classify(e, None))?
            .ok_or_else(|| StoreError::not_found("book", id))?;

        Ok(decode(&row)?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM my_app_book WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("book", id));
        }
        Ok(())
    }

    /// Newest first.
    pub async fn list(&self, page: Pagination) -> Result<Paginated<Book>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS}, COUNT(*) OVER() AS total
             FROM my_app_book
             ORDER BY id DESC
             LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(page.limit()))
            .bind(page.offset() as i64)
            .fetch_all(self.pool)
            .await?;

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM my_app_book")
            .fetch_one(self.pool);
        paginate(rows, page, decode, count).await
    }
}

#[async_trait]
impl BookStore for PgStore {
    async fn create_book(&self, book: NewBook) -> Result<Book, StoreError> {
        BookRepo::new(self.pool()).create(book).await
    }

    async fn get_book(&self, id: i64) -> Result<Book, StoreError> {
        BookRepo::new(self.pool()).get(id).await
    }

    async fn update_book(&self, id: i64, book: NewBook) -> Result<Book, StoreError> {
        BookRepo::new(self.pool()).update(id, book).await
    }

    async fn delete_book(&self, id: i64) -> Result<(), StoreError> {
        BookRepo::new(self.pool()).delete(id).await
    }

    async fn list_books(&self, page: Pagination) -> Result<Paginated<Book>, StoreError> {
        BookRepo::new(self.pool()).list(page).await
    }
}
