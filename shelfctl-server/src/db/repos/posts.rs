//! Post repository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use shelfctl_core::models::{NewPost, Paginated, Pagination, Post};

use super::{classify, paginate, PgStore};
use crate::db::{PostStore, StoreError};

fn decode(row: &PgRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author_id: row.try_get("author_id")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Post repository
pub struct PostRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// `created_at` comes from the column default.
    pub async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO my_app_post (title, content, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, author_id, created_at
            "#,
        )
        .bind(post.title.as_str())
        .bind(post.content.as_str())
        .bind(post.author_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| classify(e, post.author_id))?;

        Ok(decode(&row)?)
    }

    pub async fn get(&self, id: i64) -> Result<Post, StoreError> {
        let row = sqlx::query(
            "SELECT id, title, content, author_id, created_at FROM my_app_post WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("post", id))?;

        Ok(decode(&row)?)
    }

    pub async fn update(&self, id: i64, post: NewPost) -> Result<Post, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE my_app_post
            SET title = $2, content = $3, author_id = $4
            WHERE id = $1
            RETURNING id, title, content, author_id, created_at
            "#,
        )
        .bind(id)
        .bind(post.title.as_str())
        .bind(post.content.as_str())
        .bind(post.author_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| classify(e, post.author_id))?
        .ok_or_else(|| StoreError::not_found("post", id))?;

        Ok(decode(&row)?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM my_app_post WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("post", id));
        }
        Ok(())
    }

    pub async fn list(&self, page: Pagination) -> Result<Paginated<Post>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, author_id, created_at, COUNT(*) OVER() AS total
            FROM my_app_post
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM my_app_post")
            .fetch_one(self.pool);
        paginate(rows, page, decode, count).await
    }

    /// Posts for one author. An unknown author is `NotFound`, not an empty page.
    pub async fn list_for_author(
        &self,
        author_id: i64,
        page: Pagination,
    ) -> Result<Paginated<Post>, StoreError> {
        let author_exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM my_app_author WHERE id = $1)")
                .bind(author_id)
                .fetch_one(self.pool)
                .await?;

        if !author_exists.0 {
            return Err(StoreError::not_found("author", author_id));
        }

        let rows = sqlx::query(
            r#"
            SELECT id, title, content, author_id, created_at, COUNT(*) OVER() AS total
            FROM my_app_post
            WHERE author_id = $1
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(author_id)
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM my_app_post WHERE author_id = $1",
        )
        .bind(author_id)
        .fetch_one(self.pool);
        paginate(rows, page, decode, count).await
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError> {
        PostRepo::new(self.pool()).create(post).await
    }

    async fn get_post(&self, id: i64) -> Result<Post, StoreError> {
        PostRepo::new(self.pool()).get(id).await
    }

    async fn update_post(&self, id: i64, post: NewPost) -> Result<Post, StoreError> {
        PostRepo::new(self.pool()).update(id, post).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), StoreError> {
        PostRepo::new(self.pool()).delete(id).await
    }

    async fn list_posts(&self, page: Pagination) -> Result<Paginated<Post>, StoreError> {
        PostRepo::new(self.pool()).list(page).await
    }

    async fn posts_by_author(
        &self,
        author_id: i64,
        page: Pagination,
    ) -> Result<Paginated<Post>, StoreError> {
        PostRepo::new(self.pool()).list_for_author(author_id, page).await
    }
}
