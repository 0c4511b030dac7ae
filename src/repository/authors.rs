//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use super::{books::Owner, contains_pattern, direction};
use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorBookCount, AuthorWithBooks},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// List all authors in insertion order
    pub async fn list(&self, include_books: bool) -> AppResult<Vec<AuthorWithBooks>> {
        let authors = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        self.with_books(authors, include_books).await
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32, include_books: bool) -> AppResult<AuthorWithBooks> {
        let author = self.find(id).await?;
        let mut rows = self.with_books(vec![author], include_books).await?;
        rows.pop()
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// List authors ordered by name
    pub async fn list_sorted(
        &self,
        ascending: bool,
        include_books: bool,
    ) -> AppResult<Vec<AuthorWithBooks>> {
        let query = format!(
            "SELECT id, name FROM authors ORDER BY name {}, id ASC",
            direction(ascending)
        );
        let authors = sqlx::query_as::<_, Author>(&query)
            .fetch_all(&self.pool)
            .await?;
        self.with_books(authors, include_books).await
    }

    /// Authors whose name contains `text`, case-insensitive
    pub async fn search(&self, text: &str, include_books: bool) -> AppResult<Vec<AuthorWithBooks>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"SELECT id, name FROM authors WHERE name ILIKE $1 ESCAPE '\' ORDER BY id"#,
        )
        .bind(contains_pattern(text))
        .fetch_all(&self.pool)
        .await?;
        self.with_books(authors, include_books).await
    }

    /// Every author with the number of books attached to them
    pub async fn list_with_book_count(&self) -> AppResult<Vec<AuthorBookCount>> {
        let rows = sqlx::query_as::<_, AuthorBookCount>(
            r#"
            SELECT a.id, a.name, COUNT(b.isbn) AS total_books
            FROM authors a
            LEFT JOIN books b ON b."authorId" = a.id
            GROUP BY a.id, a.name
            ORDER BY a.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn with_books(
        &self,
        authors: Vec<Author>,
        include_books: bool,
    ) -> AppResult<Vec<AuthorWithBooks>> {
        if !include_books {
            return Ok(authors
                .into_iter()
                .map(|a| AuthorWithBooks::new(a, None))
                .collect());
        }

        let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
        let mut books = Owner::Author.books_of(&self.pool, &ids).await?;

        Ok(authors
            .into_iter()
            .map(|a| {
                let owned = books.remove(&a.id).unwrap_or_default();
                AuthorWithBooks::new(a, Some(owned))
            })
            .collect())
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Create author
    pub async fn create(&self, name: &str) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update author; `None` leaves the name untouched
    pub async fn update(&self, id: i32, name: Option<&str>) -> AppResult<Author> {
        let Some(name) = name else {
            return self.find(id).await;
        };

        sqlx::query_as::<_, Author>(
            "UPDATE authors SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Delete author; refused while books still reference them
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_constraint(e, &format!("Author {} still has books", id))
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }
}
