//! Schema migrations for the `my_app` tables
//!
//! Every statement is idempotent, so `run` is safe on every startup.

use sqlx::PgPool;

/// Table names, `<app>_<model>`
pub const BOOK_TABLE: &str = "my_app_book";
pub const AUTHOR_TABLE: &str = "my_app_author";
pub const POST_TABLE: &str = "my_app_post";
pub const PROFILE_TABLE: &str = "my_app_authorprofile";

/// Constraint names the repositories map back to field conflicts
pub const BOOK_TITLE_KEY: &str = "my_app_book_title_key";
pub const AUTHOR_USERNAME_KEY: &str = "my_app_author_username_key";
pub const PROFILE_AUTHOR_KEY: &str = "my_app_authorprofile_author_id_key";

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS my_app_book (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(125) NOT NULL,
        description TEXT NOT NULL,
        comment TEXT,
        published_date TIMESTAMPTZ NOT NULL,
        price NUMERIC(5, 2),
        category VARCHAR(30) NOT NULL DEFAULT 'N/A',
        CONSTRAINT my_app_book_title_key UNIQUE (title),
        CONSTRAINT my_app_book_category_check
            CHECK (category IN ('Fantasy', 'Mystic', 'Biography', 'N/A'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS my_app_author (
        id BIGSERIAL PRIMARY KEY,
        username VARCHAR(30) NOT NULL,
        first_name VARCHAR(20),
        last_name VARCHAR(25),
        CONSTRAINT my_app_author_username_key UNIQUE (username)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS my_app_post (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(200) NOT NULL,
        content TEXT NOT NULL,
        author_id BIGINT REFERENCES my_app_author(id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS my_app_authorprofile (
        id BIGSERIAL PRIMARY KEY,
        about TEXT,
        personal_website VARCHAR(255),
        avatar VARCHAR(100) NOT NULL,
        author_id BIGINT NOT NULL REFERENCES my_app_author(id) ON DELETE CASCADE,
        CONSTRAINT my_app_authorprofile_author_id_key UNIQUE (author_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS my_app_post_author_id_idx ON my_app_post(author_id)",
];

/// Create all tables and indexes.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running schema migrations...");

    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!(tables = 4, "Schema migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_names_appear_in_ddl() {
        let ddl = STATEMENTS.concat();
        for name in [BOOK_TITLE_KEY, AUTHOR_USERNAME_KEY, PROFILE_AUTHOR_KEY] {
            assert!(ddl.contains(name), "missing constraint {name}");
        }
        for table in [BOOK_TABLE, AUTHOR_TABLE, POST_TABLE, PROFILE_TABLE] {
            assert!(ddl.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")));
        }
    }

    #[test]
    fn deletion_policies() {
        let ddl = STATEMENTS.concat();
        assert!(ddl.contains("REFERENCES my_app_author(id) ON DELETE SET NULL"));
        assert!(ddl.contains("REFERENCES my_app_author(id) ON DELETE CASCADE"));
    }
}
