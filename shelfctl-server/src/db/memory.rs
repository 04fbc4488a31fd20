//! In-process store
//!
//! Keeps the four tables in ordered maps behind one `RwLock`. Every write
//! holds the write lock for the whole operation, so constraint checks and
//! the author-deletion side effects are atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use shelfctl_core::models::{
    Author, AuthorProfile, Book, NewAuthor, NewAuthorProfile, NewBook, NewPost, Paginated,
    Pagination, Post,
};

use super::{AuthorDeletion, AuthorStore, BookStore, PostStore, ProfileStore, StoreError};

/// Ordered rows plus an id sequence starting at 1
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T: Clone> Table<T> {
    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Newest first, like the SQL repositories.
    fn page(&self, page: Pagination, keep: impl Fn(&T) -> bool) -> Paginated<T> {
        let rows: Vec<T> = self.rows.values().rev().filter(|r| keep(r)).cloned().collect();
        page.window(&rows)
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    books: Table<Book>,
    authors: Table<Author>,
    posts: Table<Post>,
    profiles: Table<AuthorProfile>,
}

impl Tables {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.books
            .rows
            .values()
            .any(|b| b.title == title && Some(b.id) != except)
    }

    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.authors
            .rows
            .values()
            .any(|a| a.username == username && Some(a.id) != except)
    }

    fn profile_taken(&self, author_id: i64, except: Option<i64>) -> bool {
        self.profiles
            .rows
            .values()
            .any(|p| p.author_id == author_id && Some(p.id) != except)
    }

    fn require_author(&self, author_id: i64) -> Result<(), StoreError> {
        if self.authors.rows.contains_key(&author_id) {
            Ok(())
        } else {
            Err(StoreError::not_found("author", author_id))
        }
    }
}

/// Store that lives in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn create_book(&self, book: NewBook) -> Result<Book, StoreError> {
        let mut t = self.tables.write().await;
        if t.title_taken(book.title.as_str(), None) {
            return Err(StoreError::duplicate_title());
        }

        let id = t.books.next_id();
        let record = book_record(id, book);
        t.books.rows.insert(id, record.clone());
        tracing::debug!(id, "book created");
        Ok(record)
    }

    async fn get_book(&self, id: i64) -> Result<Book, StoreError> {
        self.tables
            .read()
            .await
            .books
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("book", id))
    }

    async fn update_book(&self, id: i64, book: NewBook) -> Result<Book, StoreError> {
        let mut t = self.tables.write().await;
        if !t.books.rows.contains_key(&id) {
            return Err(StoreError::not_found("book", id));
        }
        if t.title_taken(book.title.as_str(), Some(id)) {
            return Err(StoreError::duplicate_title());
        }

        let record = book_record(id, book);
        t.books.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_book(&self, id: i64) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .books
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("book", id))
    }

    async fn list_books(&self, page: Pagination) -> Result<Paginated<Book>, StoreError> {
        Ok(self.tables.read().await.books.page(page, |_| true))
    }
}

fn book_record(id: i64, book: NewBook) -> Book {
    Book {
        id,
        title: book.title.into_string(),
        description: book.description.into_string(),
        comment: book.comment,
        published_date: book.published_date,
        price: book.price.map(|p| p.value()),
        category: book.category,
    }
}

#[async_trait]
impl AuthorStore for MemoryStore {
    async fn create_author(&self, author: NewAuthor) -> Result<Author, StoreError> {
        let mut t = self.tables.write().await;
        if t.username_taken(author.username.as_str(), None) {
            return Err(StoreError::duplicate_username());
        }

        let id = t.authors.next_id();
        let record = author_record(id, author);
        t.authors.rows.insert(id, record.clone());
        tracing::debug!(id, "author created");
        Ok(record)
    }

    async fn get_author(&self, id: i64) -> Result<Author, StoreError> {
        self.tables
            .read()
            .await
            .authors
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("author", id))
    }

    async fn update_author(&self, id: i64, author: NewAuthor) -> Result<Author, StoreError> {
        let mut t = self.tables.write().await;
        t.require_author(id)?;
        if t.username_taken(author.username.as_str(), Some(id)) {
            return Err(StoreError::duplicate_username());
        }

        let record = author_record(id, author);
        t.authors.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_author(&self, id: i64) -> Result<AuthorDeletion, StoreError> {
        let mut t = self.tables.write().await;
        if t.authors.rows.remove(&id).is_none() {
            return Err(StoreError::not_found("author", id));
        }

        let mut posts_detached = 0;
        for post in t.posts.rows.values_mut() {
            if post.author_id == Some(id) {
                post.author_id = None;
                posts_detached += 1;
            }
        }

        let before = t.profiles.rows.len();
        t.profiles.rows.retain(|_, p| p.author_id != id);
        let profile_deleted = t.profiles.rows.len() < before;

        Ok(AuthorDeletion {
            author_id: id,
            posts_detached,
            profile_deleted,
        })
    }

    async fn list_authors(&self, page: Pagination) -> Result<Paginated<Author>, StoreError> {
        Ok(self.tables.read().await.authors.page(page, |_| true))
    }
}

fn author_record(id: i64, author: NewAuthor) -> Author {
    Author {
        id,
        username: author.username.into_string(),
        first_name: author.first_name,
        last_name: author.last_name,
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut t = self.tables.write().await;
        if let Some(author_id) = post.author_id {
            t.require_author(author_id)?;
        }

        let id = t.posts.next_id();
        let record = Post {
            id,
            title: post.title.into_string(),
            content: post.content.into_string(),
            author_id: post.author_id,
            created_at: Utc::now(),
        };
        t.posts.rows.insert(id, record.clone());
        tracing::debug!(id, "post created");
        Ok(record)
    }

    async fn get_post(&self, id: i64) -> Result<Post, StoreError> {
        self.tables
            .read()
            .await
            .posts
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("post", id))
    }

    async fn update_post(&self, id: i64, post: NewPost) -> Result<Post, StoreError> {
        let mut t = self.tables.write().await;
        if !t.posts.rows.contains_key(&id) {
            return Err(StoreError::not_found("post", id));
        }
        if let Some(author_id) = post.author_id {
            t.require_author(author_id)?;
        }

        let record = t
            .posts
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("post", id))?;
        record.title = post.title.into_string();
        record.content = post.content.into_string();
        record.author_id = post.author_id;
        Ok(record.clone())
    }

    async fn delete_post(&self, id: i64) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .posts
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("post", id))
    }

    async fn list_posts(&self, page: Pagination) -> Result<Paginated<Post>, StoreError> {
        Ok(self.tables.read().await.posts.page(page, |_| true))
    }

    async fn posts_by_author(
        &self,
        author_id: i64,
        page: Pagination,
    ) -> Result<Paginated<Post>, StoreError> {
        let t = self.tables.read().await;
        t.require_author(author_id)?;
        Ok(t.posts.page(page, |p| p.author_id == Some(author_id)))
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn create_profile(
        &self,
        profile: NewAuthorProfile,
    ) -> Result<AuthorProfile, StoreError> {
        let mut t = self.tables.write().await;
        t.require_author(profile.author_id)?;
        if t.profile_taken(profile.author_id, None) {
            return Err(StoreError::duplicate_profile());
        }

        let id = t.profiles.next_id();
        let record = profile_record(id, profile);
        t.profiles.rows.insert(id, record.clone());
        tracing::debug!(id, author_id = record.author_id, "author profile created");
        Ok(record)
    }

    async fn get_profile(&self, id: i64) -> Result<AuthorProfile, StoreError> {
        self.tables
            .read()
            .await
            .profiles
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("author profile", id))
    }

    async fn update_profile(
        &self,
        id: i64,
        profile: NewAuthorProfile,
    ) -> Result<AuthorProfile, StoreError> {
        let mut t = self.tables.write().await;
        if !t.profiles.rows.contains_key(&id) {
            return Err(StoreError::not_found("author profile", id));
        }
        t.require_author(profile.author_id)?;
        if t.profile_taken(profile.author_id, Some(id)) {
            return Err(StoreError::duplicate_profile());
        }

        let record = profile_record(id, profile);
        t.profiles.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_profile(&self, id: i64) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .profiles
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("author profile", id))
    }

    async fn list_profiles(
        &self,
        page: Pagination,
    ) -> Result<Paginated<AuthorProfile>, StoreError> {
        Ok(self.tables.read().await.profiles.page(page, |_| true))
    }

    async fn profile_for_author(&self, author_id: i64) -> Result<AuthorProfile, StoreError> {
        self.tables
            .read()
            .await
            .profiles
            .rows
            .values()
            .find(|p| p.author_id == author_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                resource: "author profile",
                id: format!("author={}", author_id),
            })
    }
}

fn profile_record(id: i64, profile: NewAuthorProfile) -> AuthorProfile {
    AuthorProfile {
        id,
        about: profile.about,
        personal_website: profile.personal_website.map(|u| u.into_string()),
        avatar: profile.avatar.into_string(),
        author_id: profile.author_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfctl_core::models::{AuthorInput, AuthorProfileInput, BookInput, PostInput};

    fn book(title: &str, description: &str) -> BookInput {
        BookInput {
            title: title.into(),
            description: description.into(),
            published_date: Some(Utc::now()),
            ..Default::default()
        }
    }

    fn author(username: &str) -> NewAuthor {
        AuthorInput {
            username: username.into(),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    fn post(author_id: Option<i64>) -> NewPost {
        PostInput {
            title: "A post".into(),
            content: "c".repeat(50),
            author_id,
        }
        .validate()
        .unwrap()
    }

    fn profile(author_id: i64) -> NewAuthorProfile {
        AuthorProfileInput {
            avatar: Some("avatars/a.png".into()),
            author_id: Some(author_id),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_book_title_conflicts() {
        let store = MemoryStore::new();
        let desc = "d".repeat(20);
        store
            .create_book(book("Dune", &desc).validate().unwrap())
            .await
            .unwrap();

        let err = store
            .create_book(book("Dune", &desc).validate().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "title", .. }));
        assert_eq!(store.list_books(Pagination::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn update_to_taken_title_conflicts() {
        let store = MemoryStore::new();
        let desc = "d".repeat(20);
        store.create_book(book("A", &desc).validate().unwrap()).await.unwrap();
        let b = store.create_book(book("B", &desc).validate().unwrap()).await.unwrap();

        // keeping its own title is fine
        store
            .update_book(b.id, book("B", &desc).validate().unwrap())
            .await
            .unwrap();
        let err = store
            .update_book(b.id, book("A", &desc).validate().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store.create_author(author("ann")).await.unwrap();
        let err = store.create_author(author("ann")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "username", .. }));
    }

    #[tokio::test]
    async fn deleting_author_nullifies_posts() {
        let store = MemoryStore::new();
        let a = store.create_author(author("ann")).await.unwrap();
        let other = store.create_author(author("bob")).await.unwrap();
        for _ in 0..3 {
            store.create_post(post(Some(a.id))).await.unwrap();
        }
        let kept = store.create_post(post(Some(other.id))).await.unwrap();

        let summary = store.delete_author(a.id).await.unwrap();
        assert_eq!(summary.posts_detached, 3);
        assert!(!summary.profile_deleted);

        let posts = store.list_posts(Pagination::default()).await.unwrap();
        assert_eq!(posts.total, 4);
        assert_eq!(posts.items.iter().filter(|p| p.author_id.is_none()).count(), 3);
        assert_eq!(store.get_post(kept.id).await.unwrap().author_id, Some(other.id));
    }

    #[tokio::test]
    async fn deleting_author_cascades_profile() {
        let store = MemoryStore::new();
        let a = store.create_author(author("ann")).await.unwrap();
        let b = store.create_author(author("bob")).await.unwrap();
        let p = store.create_profile(profile(a.id)).await.unwrap();
        store.create_profile(profile(b.id)).await.unwrap();

        let summary = store.delete_author(a.id).await.unwrap();
        assert!(summary.profile_deleted);
        assert!(matches!(
            store.get_profile(p.id).await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert_eq!(store.list_profiles(Pagination::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn deleting_missing_author_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.delete_author(42).await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn one_profile_per_author() {
        let store = MemoryStore::new();
        let a = store.create_author(author("ann")).await.unwrap();
        store.create_profile(profile(a.id)).await.unwrap();
        let err = store.create_profile(profile(a.id)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "author", .. }));
    }

    #[tokio::test]
    async fn profile_needs_existing_author() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.create_profile(profile(7)).await.unwrap_err(),
            StoreError::NotFound { resource: "author", .. }
        ));
    }

    #[tokio::test]
    async fn updating_missing_post_reports_post() {
        let store = MemoryStore::new();
        let err = store.update_post(9, post(Some(42))).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { resource: "post", .. }));
    }

    #[tokio::test]
    async fn post_update_keeps_created_at() {
        let store = MemoryStore::new();
        let p = store.create_post(post(None)).await.unwrap();
        let updated = store.update_post(p.id, post(None)).await.unwrap();
        assert_eq!(updated.created_at, p.created_at);
    }

    #[tokio::test]
    async fn reverse_relations() {
        let store = MemoryStore::new();
        let a = store.create_author(author("ann")).await.unwrap();
        store.create_post(post(Some(a.id))).await.unwrap();
        store.create_post(post(None)).await.unwrap();
        let prof = store.create_profile(profile(a.id)).await.unwrap();

        let posts = store.posts_by_author(a.id, Pagination::default()).await.unwrap();
        assert_eq!(posts.total, 1);
        assert_eq!(store.profile_for_author(a.id).await.unwrap(), prof);
        assert!(store.posts_by_author(99, Pagination::default()).await.is_err());
    }
}
