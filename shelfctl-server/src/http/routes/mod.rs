//! Route handlers organized by resource

pub mod health;
pub mod admin;
pub mod books;
pub mod authors;
pub mod posts;
pub mod profiles;
pub mod media;
