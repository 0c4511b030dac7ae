//! Publishing houses repository for database operations

use sqlx::{Pool, Postgres};

use super::{books::Owner, contains_pattern, direction};
use crate::{
    error::{AppError, AppResult},
    models::publishing_house::{PublishingHouse, PublishingHouseBookCount, PublishingHouseWithBooks},
};

#[derive(Clone)]
pub struct PublishingHousesRepository {
    pool: Pool<Postgres>,
}

impl PublishingHousesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// List all publishing houses in insertion order
    pub async fn list(&self, include_books: bool) -> AppResult<Vec<PublishingHouseWithBooks>> {
        let houses = sqlx::query_as::<_, PublishingHouse>("SELECT id, name FROM publishing_houses ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        self.with_books(houses, include_books).await
    }

    /// Get publishing house by ID
    pub async fn get_by_id(&self, id: i32, include_books: bool) -> AppResult<PublishingHouseWithBooks> {
        let house = self.find(id).await?;
        let mut rows = self.with_books(vec![house], include_books).await?;
        rows.pop()
            .ok_or_else(|| AppError::NotFound(format!("Publishing house {} not found", id)))
    }

    /// List publishing houses ordered by name
    pub async fn list_sorted(
        &self,
        ascending: bool,
        include_books: bool,
    ) -> AppResult<Vec<PublishingHouseWithBooks>> {
        let query = format!(
            "SELECT id, name FROM publishing_houses ORDER BY name {}, id ASC",
            direction(ascending)
        );
        let houses = sqlx::query_as::<_, PublishingHouse>(&query)
            .fetch_all(&self.pool)
            .await?;
        self.with_books(houses, include_books).await
    }

    /// Publishing houses whose name contains `text`, case-insensitive
    pub async fn search(&self, text: &str, include_books: bool) -> AppResult<Vec<PublishingHouseWithBooks>> {
        let houses = sqlx::query_as::<_, PublishingHouse>(
            r#"SELECT id, name FROM publishing_houses WHERE name ILIKE $1 ESCAPE '\' ORDER BY id"#,
        )
        .bind(contains_pattern(text))
        .fetch_all(&self.pool)
        .await?;
        self.with_books(houses, include_books).await
    }

    /// Every publishing house with the size of its catalog
    pub async fn list_with_book_count(&self) -> AppResult<Vec<PublishingHouseBookCount>> {
        let rows = sqlx::query_as::<_, PublishingHouseBookCount>(
            r#"
            SELECT p.id, p.name, COUNT(b.isbn) AS total_books
            FROM publishing_houses p
            LEFT JOIN books b ON b."publishingHouseId" = p.id
            GROUP BY p.id, p.name
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: i32) -> AppResult<PublishingHouse> {
        sqlx::query_as::<_, PublishingHouse>("SELECT id, name FROM publishing_houses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Publishing house {} not found", id)))
    }

    async fn with_books(
        &self,
        houses: Vec<PublishingHouse>,
        include_books: bool,
    ) -> AppResult<Vec<PublishingHouseWithBooks>> {
        if !include_books {
            return Ok(houses
                .into_iter()
                .map(|p| PublishingHouseWithBooks::new(p, None))
                .collect());
        }

        let ids: Vec<i32> = houses.iter().map(|p| p.id).collect();
        let mut books = Owner::PublishingHouse.books_of(&self.pool, &ids).await?;

        Ok(houses
            .into_iter()
            .map(|p| {
                let owned = books.remove(&p.id).unwrap_or_default();
                PublishingHouseWithBooks::new(p, Some(owned))
            })
            .collect())
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Create publishing house
    pub async fn create(&self, name: &str) -> AppResult<PublishingHouse> {
        let row = sqlx::query_as::<_, PublishingHouse>(
            "INSERT INTO publishing_houses (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update publishing house; `None` leaves the name untouched
    pub async fn update(&self, id: i32, name: Option<&str>) -> AppResult<PublishingHouse> {
        let Some(name) = name else {
            return self.find(id).await;
        };

        sqlx::query_as::<_, PublishingHouse>(
            "UPDATE publishing_houses SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Publishing house {} not found", id)))
    }

    /// Delete publishing house; refused while books still reference it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publishing_houses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_constraint(e, &format!("Publishing house {} still has books", id))
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Publishing house {} not found", id)));
        }
        Ok(())
    }
}
