//! Publishing house model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::Book;

/// Publishing house row as stored in the `publishing_houses` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PublishingHouse {
    pub id: i32,
    pub name: String,
}

/// Publishing house with its catalog, loaded only on request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublishingHouseWithBooks {
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<Book>>,
}

impl PublishingHouseWithBooks {
    pub fn new(house: PublishingHouse, books: Option<Vec<Book>>) -> Self {
        Self {
            id: house.id,
            name: house.name,
            books,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishingHouseBookCount {
    pub id: i32,
    pub name: String,
    pub total_books: i64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreatePublishingHouse {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePublishingHouse {
    pub name: Option<String>,
}
