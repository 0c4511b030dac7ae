//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorBookCount, AuthorWithBooks, CreateAuthor, UpdateAuthor},
        ListQuery, SearchQuery, SortQuery,
    },
};

use super::{parse_id, AuthenticatedUser, MessageResponse};

/// List all authors with their books
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(ListQuery),
    responses(
        (status = 200, description = "List of authors", body = Vec<AuthorWithBooks>)
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<Vec<AuthorWithBooks>>> {
    let authors = state.services.authors.list(list.include()).await?;
    Ok(Json(authors))
}

/// List authors sorted by name
#[utoipa::path(
    get,
    path = "/authors/sorted",
    tag = "authors",
    params(SortQuery, ListQuery),
    responses(
        (status = 200, description = "Authors sorted by name", body = Vec<AuthorWithBooks>)
    )
)]
pub async fn list_authors_sorted(
    State(state): State<crate::AppState>,
    Query(sort): Query<SortQuery>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<Vec<AuthorWithBooks>>> {
    let authors = state
        .services
        .authors
        .list_sorted(sort.ascending(), list.include())
        .await?;
    Ok(Json(authors))
}

/// Search authors by name
#[utoipa::path(
    get,
    path = "/authors/contains",
    tag = "authors",
    params(SearchQuery, ListQuery),
    responses(
        (status = 200, description = "Matching authors", body = Vec<AuthorWithBooks>),
        (status = 400, description = "Missing search text")
    )
)]
pub async fn search_authors(
    State(state): State<crate::AppState>,
    Query(search): Query<SearchQuery>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<Vec<AuthorWithBooks>>> {
    let authors = state
        .services
        .authors
        .search(search.text.as_deref(), list.include())
        .await?;
    Ok(Json(authors))
}

/// List authors with their total number of books
#[utoipa::path(
    get,
    path = "/authors/withTotalBooks",
    tag = "authors",
    responses(
        (status = 200, description = "Authors with book counts", body = Vec<AuthorBookCount>)
    )
)]
pub async fn list_authors_with_total_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<AuthorBookCount>>> {
    let authors = state.services.authors.list_with_book_count().await?;
    Ok(Json(authors))
}

/// Get an author with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID"), ListQuery),
    responses(
        (status = 200, description = "Author details", body = AuthorWithBooks),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<AuthorWithBooks>> {
    let id = parse_id(&id)?;
    let author = state.services.authors.get_by_id(id, list.include()).await?;
    Ok(Json(author))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Missing name")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(data): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.services.authors.create(&data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Update an author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    let id = parse_id(&id)?;
    let author = state.services.authors.update(id, &data).await?;
    Ok(Json(author))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author deleted", body = MessageResponse),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still has books")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    state.services.authors.delete(id).await?;
    Ok(Json(MessageResponse::new("Author successfully deleted")))
}
