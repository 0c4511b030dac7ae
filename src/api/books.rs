//! Book endpoints

use std::str::FromStr;

use axum::{
    async_trait,
    extract::{FromRequest, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use axum_extra::extract::Multipart;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{
            Book, BookAuthorCount, BookDetails, BookPrice, CreateBook, DiscontinuedGroups,
            PriceRangeQuery, UpdateBook,
        },
        ListQuery, SearchQuery, SortQuery,
    },
    services::covers::CoverStorage,
    AppState,
};

use super::{parse_id, AuthenticatedUser, MessageResponse};

/// Multipart field carrying the cover image
const COVER_FIELD: &str = "photoCover";

/// Book create/update body, sent either as JSON or as multipart form data
/// with an optional `photoCover` file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookForm {
    pub title: Option<String>,
    pub pages: Option<i32>,
    pub price: Option<Decimal>,
    pub discontinued: Option<bool>,
    pub author_id: Option<i32>,
    pub publishing_house_id: Option<i32>,
    /// Stored file name of an uploaded cover
    #[serde(skip)]
    pub photo_cover: Option<String>,
}

impl From<BookForm> for CreateBook {
    fn from(form: BookForm) -> Self {
        CreateBook {
            title: form.title,
            pages: form.pages,
            price: form.price,
            discontinued: form.discontinued,
            author_id: form.author_id,
            publishing_house_id: form.publishing_house_id,
            photo_cover: form.photo_cover,
        }
    }
}

impl From<BookForm> for UpdateBook {
    fn from(form: BookForm) -> Self {
        UpdateBook {
            title: form.title,
            pages: form.pages,
            price: form.price,
            discontinued: form.discontinued,
            author_id: form.author_id,
            publishing_house_id: form.publishing_house_id,
            photo_cover: form.photo_cover,
        }
    }
}

impl BookForm {
    /// Set one text field from its multipart value
    fn set_field(&mut self, name: &str, value: String) -> AppResult<()> {
        match name {
            "title" => self.title = Some(value),
            "pages" => self.pages = Some(parse_field(name, &value)?),
            "price" => self.price = Some(parse_field(name, &value)?),
            "discontinued" => self.discontinued = Some(parse_field(name, &value)?),
            "authorId" => self.author_id = Some(parse_field(name, &value)?),
            "publishingHouseId" => self.publishing_house_id = Some(parse_field(name, &value)?),
            _ => {}
        }
        Ok(())
    }

    async fn from_multipart(multipart: Multipart, covers: &CoverStorage) -> AppResult<Self> {
        let mut form = BookForm::default();
        let result = form.read_multipart(multipart, covers).await;
        discard_cover_on_error(covers, form.photo_cover.as_deref(), result).await?;
        Ok(form)
    }

    async fn read_multipart(&mut self, mut multipart: Multipart, covers: &CoverStorage) -> AppResult<()> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == COVER_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !bytes.is_empty() {
                    let stored = covers.store(file_name.as_deref(), &bytes).await?;
                    if let Some(previous) = self.photo_cover.replace(stored) {
                        covers.discard(&previous).await;
                    }
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            self.set_field(&name, value)?;
        }

        Ok(())
    }
}

/// Pass `result` through, removing the uploaded cover when it is an error
async fn discard_cover_on_error<T>(
    covers: &CoverStorage,
    cover: Option<&str>,
    result: AppResult<T>,
) -> AppResult<T> {
    if result.is_err() {
        if let Some(file_name) = cover {
            covers.discard(file_name).await;
        }
    }
    result
}

fn parse_field<T: FromStr>(name: &str, value: &str) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid value for '{}'", name)))
}

#[async_trait]
impl FromRequest<AppState> for BookForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            Self::from_multipart(multipart, &state.services.covers).await
        } else {
            let Json(form) = Json::<BookForm>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(form)
        }
    }
}

/// Parse a required price bound
pub fn parse_price_bound(value: Option<&str>, name: &str) -> AppResult<Decimal> {
    let invalid = || {
        AppError::Validation(
            "The 'min' and 'max' parameters are required and must be numbers".to_string(),
        )
    };
    let value = value.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(invalid)?;
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| {
            tracing::debug!(bound = name, value, "Rejected price bound");
            invalid()
        })
}

/// List all books with their relations
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(ListQuery),
    responses(
        (status = 200, description = "List of books", body = Vec<BookDetails>)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<Vec<BookDetails>>> {
    let books = state.services.books.list(list.include()).await?;
    Ok(Json(books))
}

/// List books sorted by title
#[utoipa::path(
    get,
    path = "/books/sorted",
    tag = "books",
    params(SortQuery, ListQuery),
    responses(
        (status = 200, description = "Books sorted by title", body = Vec<BookDetails>)
    )
)]
pub async fn list_books_sorted(
    State(state): State<AppState>,
    Query(sort): Query<SortQuery>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<Vec<BookDetails>>> {
    let books = state
        .services
        .books
        .list_sorted(sort.ascending(), list.include())
        .await?;
    Ok(Json(books))
}

/// Search books by title
#[utoipa::path(
    get,
    path = "/books/contains",
    tag = "books",
    params(SearchQuery, ListQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<BookDetails>),
        (status = 400, description = "Missing search text")
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<Vec<BookDetails>>> {
    let books = state
        .services
        .books
        .search(search.text.as_deref(), list.include())
        .await?;
    Ok(Json(books))
}

/// Identifier, title and price of every book
#[utoipa::path(
    get,
    path = "/books/prices",
    tag = "books",
    responses(
        (status = 200, description = "Books with prices", body = Vec<BookPrice>)
    )
)]
pub async fn list_book_prices(State(state): State<AppState>) -> AppResult<Json<Vec<BookPrice>>> {
    let books = state.services.books.list_prices().await?;
    Ok(Json(books))
}

/// Books grouped by the discontinued flag
#[utoipa::path(
    get,
    path = "/books/grouped/discontinued",
    tag = "books",
    responses(
        (status = 200, description = "Books grouped by discontinued status", body = DiscontinuedGroups)
    )
)]
pub async fn list_books_grouped_by_discontinued(
    State(state): State<AppState>,
) -> AppResult<Json<DiscontinuedGroups>> {
    let groups = state.services.books.grouped_by_discontinued().await?;
    Ok(Json(groups))
}

/// Books within an inclusive price range
#[utoipa::path(
    get,
    path = "/books/by-price",
    tag = "books",
    params(PriceRangeQuery, ListQuery),
    responses(
        (status = 200, description = "Books within the price range", body = Vec<BookDetails>),
        (status = 400, description = "Missing or non-numeric bounds")
    )
)]
pub async fn list_books_by_price(
    State(state): State<AppState>,
    Query(range): Query<PriceRangeQuery>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<Vec<BookDetails>>> {
    let min = parse_price_bound(range.min.as_deref(), "min")?;
    let max = parse_price_bound(range.max.as_deref(), "max")?;
    let books = state
        .services
        .books
        .list_by_price(min, max, list.include())
        .await?;
    Ok(Json(books))
}

/// Books with a 0/1 author indicator
#[utoipa::path(
    get,
    path = "/books/withTotalAuthors",
    tag = "books",
    responses(
        (status = 200, description = "Books with author counts", body = Vec<BookAuthorCount>)
    )
)]
pub async fn list_books_with_total_authors(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookAuthorCount>>> {
    let books = state.services.books.list_with_author_count().await?;
    Ok(Json(books))
}

/// Get a book with its author and publishing house
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book catalog code"), ListQuery),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<BookDetails>> {
    let isbn = parse_id(&id)?;
    let book = state.services.books.get_by_id(isbn, list.include()).await?;
    Ok(Json(book))
}

/// Create a book (JSON or multipart with a `photoCover` file)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Missing field or unknown author/publishing house")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    form: BookForm,
) -> AppResult<(StatusCode, Json<Book>)> {
    let cover = form.photo_cover.clone();
    let result = state.services.books.create(&CreateBook::from(form)).await;
    let book = discard_cover_on_error(&state.services.covers, cover.as_deref(), result).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book; omitted fields keep their value
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book catalog code")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
    form: BookForm,
) -> AppResult<Json<Book>> {
    let cover = form.photo_cover.clone();
    let result = match parse_id(&id) {
        Ok(isbn) => state.services.books.update(isbn, &UpdateBook::from(form)).await,
        Err(e) => Err(e),
    };
    let book = discard_cover_on_error(&state.services.covers, cover.as_deref(), result).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book catalog code")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let isbn = parse_id(&id)?;
    state.services.books.delete(isbn).await?;
    Ok(Json(MessageResponse::new("Book successfully deleted")))
}
