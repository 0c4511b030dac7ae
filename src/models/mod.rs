//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod publishing_house;
pub mod user;

use serde::Deserialize;
use utoipa::IntoParams;

// Re-export commonly used types
pub use author::{Author, AuthorWithBooks};
pub use book::{Book, BookDetails};
pub use publishing_house::{PublishingHouse, PublishingHouseWithBooks};
pub use user::{User, UserClaims};

/// Listing options shared by the entity list endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Join the entity's relations (default true)
    pub include: Option<bool>,
}

impl ListQuery {
    pub fn include(&self) -> bool {
        self.include.unwrap_or(true)
    }
}

/// Sort direction parameter; only `up=false` sorts descending
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SortQuery {
    pub up: Option<String>,
}

impl SortQuery {
    pub fn ascending(&self) -> bool {
        self.up.as_deref() != Some("false")
    }
}

/// Case-insensitive substring search parameter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    pub text: Option<String>,
}
