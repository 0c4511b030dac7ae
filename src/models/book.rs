//! Book model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{author::Author, publishing_house::PublishingHouse};

/// Book row as stored in the `books` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Catalog code, generated by the store
    pub isbn: i32,
    pub title: String,
    pub pages: i32,
    /// Non-negative, two decimal places
    #[schema(value_type = String, example = "29.99")]
    pub price: Decimal,
    /// File name of the uploaded cover image
    pub photo_cover: Option<String>,
    pub discontinued: bool,
    #[sqlx(rename = "authorId")]
    pub author_id: i32,
    #[sqlx(rename = "publishingHouseId")]
    pub publishing_house_id: i32,
}

/// Book with its author and publishing house, when requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    pub isbn: i32,
    pub title: String,
    pub pages: i32,
    #[schema(value_type = String, example = "29.99")]
    pub price: Decimal,
    pub photo_cover: Option<String>,
    pub discontinued: bool,
    pub author_id: i32,
    pub publishing_house_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishing_house: Option<PublishingHouse>,
}

impl From<Book> for BookDetails {
    fn from(book: Book) -> Self {
        BookDetails {
            isbn: book.isbn,
            title: book.title,
            pages: book.pages,
            price: book.price,
            photo_cover: book.photo_cover,
            discontinued: book.discontinued,
            author_id: book.author_id,
            publishing_house_id: book.publishing_house_id,
            author: None,
            publishing_house: None,
        }
    }
}

/// Internal row structure for book queries joined with both relations
#[derive(Debug, Clone, FromRow)]
pub struct BookDetailsRow {
    isbn: i32,
    title: String,
    pages: i32,
    price: Decimal,
    photo_cover: Option<String>,
    discontinued: bool,
    #[sqlx(rename = "authorId")]
    author_id: i32,
    #[sqlx(rename = "publishingHouseId")]
    publishing_house_id: i32,
    author_name: String,
    publishing_house_name: String,
}

impl From<BookDetailsRow> for BookDetails {
    fn from(row: BookDetailsRow) -> Self {
        BookDetails {
            isbn: row.isbn,
            title: row.title,
            pages: row.pages,
            price: row.price,
            photo_cover: row.photo_cover,
            discontinued: row.discontinued,
            author_id: row.author_id,
            publishing_house_id: row.publishing_house_id,
            author: Some(Author {
                id: row.author_id,
                name: row.author_name,
            }),
            publishing_house: Some(PublishingHouse {
                id: row.publishing_house_id,
                name: row.publishing_house_name,
            }),
        }
    }
}

/// Books partitioned by the discontinued flag
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiscontinuedGroups {
    pub discontinued: Vec<BookDetails>,
    pub available: Vec<BookDetails>,
}

impl DiscontinuedGroups {
    pub fn partition(books: Vec<BookDetails>) -> Self {
        let (discontinued, available) = books.into_iter().partition(|book| book.discontinued);
        Self {
            discontinued,
            available,
        }
    }
}

/// Narrow projection: identifier, title and price only
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPrice {
    pub isbn: i32,
    pub title: String,
    #[schema(value_type = String, example = "29.99")]
    pub price: Decimal,
}

/// Book with a 0/1 indicator of an attached author
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAuthorCount {
    pub isbn: i32,
    pub title: String,
    pub total_authors: i32,
}

/// Create book request
///
/// `photo_cover` is never read from the body; it is filled in with the name
/// of the uploaded file when the request carries one.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    pub title: Option<String>,
    pub pages: Option<i32>,
    #[schema(value_type = Option<f64>, example = 29.99)]
    pub price: Option<Decimal>,
    pub discontinued: Option<bool>,
    pub author_id: Option<i32>,
    pub publishing_house_id: Option<i32>,
    #[serde(skip_deserializing)]
    #[schema(read_only)]
    pub photo_cover: Option<String>,
}

/// Update book request; only supplied fields are changed
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub title: Option<String>,
    pub pages: Option<i32>,
    #[schema(value_type = Option<f64>, example = 29.99)]
    pub price: Option<Decimal>,
    pub discontinued: Option<bool>,
    pub author_id: Option<i32>,
    pub publishing_house_id: Option<i32>,
    #[serde(skip_deserializing)]
    #[schema(read_only)]
    pub photo_cover: Option<String>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.pages.is_none()
            && self.price.is_none()
            && self.discontinued.is_none()
            && self.author_id.is_none()
            && self.publishing_house_id.is_none()
            && self.photo_cover.is_none()
    }
}

/// Validated book ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub pages: i32,
    pub price: Decimal,
    pub discontinued: bool,
    pub author_id: i32,
    pub publishing_house_id: i32,
    pub photo_cover: Option<String>,
}

/// Price range query parameters, parsed by the handler
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PriceRangeQuery {
    /// Minimum price (inclusive)
    pub min: Option<String>,
    /// Maximum price (inclusive)
    pub max: Option<String>,
}
