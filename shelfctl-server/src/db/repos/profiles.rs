//! Author profile repository
//!
//! One profile per author is enforced by `my_app_authorprofile_author_id_key`.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use shelfctl_core::models::{AuthorProfile, NewAuthorProfile, Paginated, Pagination};

use super::{classify, paginate, PgStore};
use crate::db::{ProfileStore, StoreError};

const COLUMNS: &str = "id, about, personal_website, avatar, author_id";

fn decode(row: &PgRow) -> Result<AuthorProfile, sqlx::Error> {
    Ok(AuthorProfile {
        id: row.try_get("id")?,
        about: row.try_get("about")?,
        personal_website: row.try_get("personal_website")?,
        avatar: row.try_get("avatar")?,
        author_id: row.try_get("author_id")?,
    })
}

/// Author profile repository
pub struct ProfileRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, profile: NewAuthorProfile) -> Result<AuthorProfile, StoreError> {
        let sql = format!(
            "INSERT INTO my_app_authorprofile (about, personal_website, avatar, author_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(profile.about.as_deref())
            .bind(profile.personal_website.as_ref().map(|u| u.as_str()))
            .bind(profile.avatar.as_str())
            .bind(profile.author_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| classify(e, Some(profile.author_id)))?;

        Ok(decode(&row)?)
    }

    pub async fn get(&self, id: i64) -> Result<AuthorProfile, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM my_app_authorprofile WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("author profile", id))?;

        Ok(decode(&row)?)
    }

    pub async fn get_for_author(&self, author_id: i64) -> Result<AuthorProfile, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM my_app_authorprofile WHERE author_id = $1");
        let row = sqlx::query(&sql)
            .bind(author_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                resource: "author profile",
                id: format!("author={}", author_id),
            })?;

        Ok(decode(&row)?)
    }

    pub async fn update(
        &self,
        id: i64,
        profile: NewAuthorProfile,
    ) -> Result<AuthorProfile, StoreError> {
        let sql = format!(
            "UPDATE my_app_authorprofile
             SET about = $2, personal_website = $3, avatar = $4, author_id = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(profile.about.as_deref())
            .bind(profile.personal_website.as_ref().map(|u| u.as_str()))
            .bind(profile.avatar.as_str())
            .bind(profile.author_id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| classify(e, Some(profile.author_id)))?
            .ok_or_else(|| StoreError::not_found("author profile", id))?;

        Ok(decode(&row)?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM my_app_authorprofile WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("author profile", id));
        }
        Ok(())
    }

    pub async fn list(&self, page: Pagination) -> Result<Paginated<AuthorProfile>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS}, COUNT(*) OVER() AS total
             FROM my_app_authorprofile
             ORDER BY id DESC
             LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(page.limit()))
            .bind(page.offset() as i64)
            .fetch_all(self.pool)
            .await?;

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM my_app_authorprofile")
            .fetch_one(self.pool);
        paginate(rows, page, decode, count).await
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn create_profile(
        &self,
        profile: NewAuthorProfile,
    ) -> Result<AuthorProfile, StoreError> {
        ProfileRepo::new(self.pool()).create(profile).await
    }

    async fn get_profile(&self, id: i64) -> Result<AuthorProfile, StoreError> {
        ProfileRepo::new(self.pool()).get(id).await
    }

    async fn update_profile(
        &self,
        id: i64,
        profile: NewAuthorProfile,
    ) -> Result<AuthorProfile, StoreError> {
        ProfileRepo::new(self.pool()).update(id, profile).await
    }

    async fn delete_profile(&self, id: i64) -> Result<(), StoreError> {
        ProfileRepo::new(self.pool()).delete(id).await
    }

    async fn list_profiles(
        &self,
        page: Pagination,
    ) -> Result<Paginated<AuthorProfile>, StoreError> {
        ProfileRepo::new(self.pool()).list(page).await
    }

    async fn profile_for_author(&self, author_id: i64) -> Result<AuthorProfile, StoreError> {
        ProfileRepo::new(self.pool()).get_for_author(author_id).await
    }
}
