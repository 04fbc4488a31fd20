//! Author repository
//!
//! Deletion detaches posts and removes the profile inside one transaction.
//! The foreign keys carry the same rules (`ON DELETE SET NULL` /
//! `ON DELETE CASCADE`); doing it explicitly lets us report counts.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use shelfctl_core::models::{Author, NewAuthor, Paginated, Pagination};

use super::{classify, paginate, PgStore};
use crate::db::{AuthorDeletion, AuthorStore, StoreError};

fn decode(row: &PgRow) -> Result<Author, sqlx::Error> {
    Ok(Author {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
    })
}

/// Author repository
pub struct AuthorRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AuthorRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, author: NewAuthor) -> Result<Author, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO my_app_author (username, first_name, last_name)
            VALUES ($1, $2, $3)
            RETURNING id, username, first_name, last_name
            "#,
        )
        .bind(author.username.as_str())
        .bind(author.first_name.as_deref())
        .bind(author.last_name.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| classify(e, None))?;

        Ok(decode(&row)?)
    }

    pub async fn get(&self, id: i64) -> Result<Author, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, first_name, last_name FROM my_app_author WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("author", id))?;

        Ok(decode(&row)?)
    }

    pub async fn update(&self, id: i64, author: NewAuthor) -> Result<Author, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE my_app_author
            SET username = $2, first_name = $3, last_name = $4
            WHERE id = $1
            RETURNING id, username, first_name, last_name
            "#,
        )
        .bind(id)
        .bind(author.username.as_str())
        .bind(author.first_name.as_deref())
        .bind(author.last_name.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| classify(e, None))?
        .ok_or_else(|| StoreError::not_found("author", id))?;

        Ok(decode(&row)?)
    }

    /// Delete an author, nullifying its posts and deleting its profile.
    ///
    /// Rolls back (dropping the transaction) if the author doesn't exist.
    pub async fn delete(&self, id: i64) -> Result<AuthorDeletion, StoreError> {
        let mut tx = self.pool.begin().await?;

        let posts_detached =
            sqlx::query("UPDATE my_app_post SET author_id = NULL WHERE author_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        let profile_deleted = sqlx::query("DELETE FROM my_app_authorprofile WHERE author_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        let deleted = sqlx::query("DELETE FROM my_app_author WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::not_found("author", id));
        }

        tx.commit().await?;

        Ok(AuthorDeletion {
            author_id: id,
            posts_detached,
            profile_deleted,
        })
    }

    pub async fn list(&self, page: Pagination) -> Result<Paginated<Author>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, first_name, last_name, COUNT(*) OVER() AS total
            FROM my_app_author
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM my_app_author")
            .fetch_one(self.pool);
        paginate(rows, page, decode, count).await
    }
}

#[async_trait]
impl AuthorStore for PgStore {
    async fn create_author(&self, author: NewAuthor) -> Result<Author, StoreError> {
        AuthorRepo::new(self.pool()).create(author).await
    }

    async fn get_author(&self, id: i64) -> Result<Author, StoreError> {
        AuthorRepo::new(self.pool()).get(id).await
    }

    async fn update_author(&self, id: i64, author: NewAuthor) -> Result<Author, StoreError> {
        AuthorRepo::new(self.pool()).update(id, author).await
    }

    async fn delete_author(&self, id: i64) -> Result<AuthorDeletion, StoreError> {
        AuthorRepo::new(self.pool()).delete(id).await
    }

    async fn list_authors(&self, page: Pagination) -> Result<Paginated<Author>, StoreError> {
        AuthorRepo::new(self.pool()).list(page).await
    }
}
