//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::Book;

/// Author row as stored in the `authors` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
}

/// Author with the books they wrote, loaded only on request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorWithBooks {
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<Book>>,
}

impl AuthorWithBooks {
    pub fn new(author: Author, books: Option<Vec<Book>>) -> Self {
        Self {
            id: author.id,
            name: author.name,
            books,
        }
    }
}

/// Author with the number of books attached to them
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorBookCount {
    pub id: i32,
    pub name: String,
    pub total_books: i64,
}

/// Create author request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateAuthor {
    pub name: Option<String>,
}

/// Update author request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateAuthor {
    pub name: Option<String>,
}
