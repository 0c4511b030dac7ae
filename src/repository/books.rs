//! Books repository for database operations
//!
//! Relation checks and the write they guard run in one transaction: the
//! referenced author and publishing house rows are locked `FOR KEY SHARE`
//! so they cannot disappear between the check and the insert/update.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgConnection, Pool, Postgres};

use super::{contains_pattern, direction};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookAuthorCount, BookDetails, BookDetailsRow, BookPrice, NewBook, UpdateBook},
};

const BOOK_COLUMNS: &str = r#"b.isbn, b.title, b.pages, b.price, b.photo_cover, b.discontinued,
                            b."authorId", b."publishingHouseId""#;

/// Row selection for book listings
#[derive(Debug, Clone, Copy)]
pub enum BookFilter<'a> {
    All,
    Isbn(i32),
    TitleContains(&'a str),
    PriceBetween(Decimal, Decimal),
}

impl BookFilter<'_> {
    fn clause(&self) -> &'static str {
        match self {
            BookFilter::All => "TRUE",
            BookFilter::Isbn(_) => "b.isbn = $1",
            BookFilter::TitleContains(_) => r"b.title ILIKE $1 ESCAPE '\'",
            BookFilter::PriceBetween(_, _) => "b.price BETWEEN $1 AND $2",
        }
    }
}

macro_rules! bind_filter {
    ($query:expr, $filter:expr) => {
        match $filter {
            BookFilter::All => $query,
            BookFilter::Isbn(isbn) => $query.bind(isbn),
            BookFilter::TitleContains(text) => $query.bind(contains_pattern(text)),
            BookFilter::PriceBetween(min, max) => $query.bind(min).bind(max),
        }
    };
}

/// Entity owning a collection of books
#[derive(Debug, Clone, Copy)]
pub enum Owner {
    Author,
    PublishingHouse,
}

impl Owner {
    fn column(self) -> &'static str {
        match self {
            Owner::Author => r#""authorId""#,
            Owner::PublishingHouse => r#""publishingHouseId""#,
        }
    }

    fn key(self, book: &Book) -> i32 {
        match self {
            Owner::Author => book.author_id,
            Owner::PublishingHouse => book.publishing_house_id,
        }
    }

    /// Books owned by any of `ids`, grouped by owner id
    pub async fn books_of(
        self,
        pool: &Pool<Postgres>,
        ids: &[i32],
    ) -> AppResult<HashMap<i32, Vec<Book>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = format!(
            "SELECT * FROM books WHERE {} = ANY($1) ORDER BY isbn",
            self.column()
        );
        let books = sqlx::query_as::<_, Book>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        let mut grouped: HashMap<i32, Vec<Book>> = HashMap::new();
        for book in books {
            grouped.entry(self.key(&book)).or_default().push(book);
        }
        Ok(grouped)
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Fetch books matching `filter`, optionally joined with author and
    /// publishing house
    pub async fn find(
        &self,
        filter: BookFilter<'_>,
        order: &str,
        include_relations: bool,
    ) -> AppResult<Vec<BookDetails>> {
        if include_relations {
            let query = format!(
                r#"
                SELECT {}, a.name AS author_name, p.name AS publishing_house_name
                FROM books b
                JOIN authors a ON a.id = b."authorId"
                JOIN publishing_houses p ON p.id = b."publishingHouseId"
                WHERE {}
                ORDER BY {}
                "#,
                BOOK_COLUMNS,
                filter.clause(),
                order
            );
            let rows = bind_filter!(sqlx::query_as::<_, BookDetailsRow>(&query), filter)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(BookDetails::from).collect())
        } else {
            let query = format!(
                "SELECT {} FROM books b WHERE {} ORDER BY {}",
                BOOK_COLUMNS,
                filter.clause(),
                order
            );
            let rows = bind_filter!(sqlx::query_as::<_, Book>(&query), filter)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(BookDetails::from).collect())
        }
    }

    /// List all books in insertion order
    pub async fn list(&self, include_relations: bool) -> AppResult<Vec<BookDetails>> {
        self.find(BookFilter::All, "b.isbn ASC", include_relations).await
    }

    /// Get book by catalog code
    pub async fn get_by_id(&self, isbn: i32, include_relations: bool) -> AppResult<BookDetails> {
        self.find(BookFilter::Isbn(isbn), "b.isbn ASC", include_relations)
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn)))
    }

    /// List books ordered by title
    pub async fn list_sorted(
        &self,
        ascending: bool,
        include_relations: bool,
    ) -> AppResult<Vec<BookDetails>> {
        let order = format!("b.title {}, b.isbn ASC", direction(ascending));
        self.find(BookFilter::All, &order, include_relations).await
    }

    /// Books whose title contains `text`, case-insensitive
    pub async fn search(&self, text: &str, include_relations: bool) -> AppResult<Vec<BookDetails>> {
        self.find(BookFilter::TitleContains(text), "b.isbn ASC", include_relations)
            .await
    }

    /// Books priced within `[min, max]`; empty when `min > max`
    pub async fn list_by_price(
        &self,
        min: Decimal,
        max: Decimal,
        include_relations: bool,
    ) -> AppResult<Vec<BookDetails>> {
        self.find(BookFilter::PriceBetween(min, max), "b.isbn ASC", include_relations)
            .await
    }

    /// Identifier, title and price of every book
    pub async fn list_prices(&self) -> AppResult<Vec<BookPrice>> {
        let rows = sqlx::query_as::<_, BookPrice>(
            "SELECT isbn, title, price FROM books ORDER BY isbn",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every book with a 0/1 indicator of an attached author
    pub async fn list_with_author_count(&self) -> AppResult<Vec<BookAuthorCount>> {
        let rows = sqlx::query_as::<_, BookAuthorCount>(
            r#"
            SELECT b.isbn, b.title,
                   CASE WHEN a.id IS NULL THEN 0 ELSE 1 END AS total_authors
            FROM books b
            LEFT JOIN authors a ON a.id = b."authorId"
            ORDER BY b.isbn
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Create book once its author and publishing house are known to exist
    pub async fn create(&self, data: &NewBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        lock_relations(&mut tx, Some(data.author_id), Some(data.publishing_house_id)).await?;

        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, pages, price, photo_cover, discontinued, "authorId", "publishingHouseId")
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(data.pages)
        .bind(data.price)
        .bind(&data.photo_cover)
        .bind(data.discontinued)
        .bind(data.author_id)
        .bind(data.publishing_house_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Update book; only the fields present in `data` are written
    pub async fn update(&self, isbn: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1 FOR UPDATE")
            .bind(isbn)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn)))?;

        if data.is_empty() {
            tx.commit().await?;
            return Ok(current);
        }

        lock_relations(&mut tx, data.author_id, data.publishing_house_id).await?;

        let mut sets = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.title, "title");
        add_field!(data.pages, "pages");
        add_field!(data.price, "price");
        add_field!(data.photo_cover, "photo_cover");
        add_field!(data.discontinued, "discontinued");
        add_field!(data.author_id, r#""authorId""#);
        add_field!(data.publishing_house_id, r#""publishingHouseId""#);

        let query = format!(
            "UPDATE books SET {} WHERE isbn = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Book>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.title);
        bind_field!(data.pages);
        bind_field!(data.price);
        bind_field!(data.photo_cover);
        bind_field!(data.discontinued);
        bind_field!(data.author_id);
        bind_field!(data.publishing_house_id);

        let row = builder.bind(isbn).fetch_one(&mut *tx).await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Delete book; its cover file is left in place
    pub async fn delete(&self, isbn: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", isbn)));
        }
        Ok(())
    }
}

/// Check that the referenced rows exist and hold a key-share lock on them
/// until the surrounding transaction ends.
async fn lock_relations(
    conn: &mut PgConnection,
    author_id: Option<i32>,
    publishing_house_id: Option<i32>,
) -> AppResult<()> {
    if let Some(id) = author_id {
        let found: Option<i32> =
            sqlx::query_scalar("SELECT id FROM authors WHERE id = $1 FOR KEY SHARE")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        if found.is_none() {
            return Err(AppError::Validation(format!("Author {} does not exist", id)));
        }
    }

    if let Some(id) = publishing_house_id {
        let found: Option<i32> =
            sqlx::query_scalar("SELECT id FROM publishing_houses WHERE id = $1 FOR KEY SHARE")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        if found.is_none() {
            return Err(AppError::Validation(format!(
                "Publishing house {} does not exist",
                id
            )));
        }
    }

    Ok(())
}
