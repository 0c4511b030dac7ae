//! Publishing house endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        publishing_house::{
            CreatePublishingHouse, PublishingHouse, PublishingHouseBookCount,
            PublishingHouseWithBooks, UpdatePublishingHouse,
        },
        ListQuery, SearchQuery, SortQuery,
    },
};

use super::{parse_id, AuthenticatedUser, MessageResponse};

/// List all publishing houses with their books
#[utoipa::path(
    get,
    path = "/publishingHouses",
    tag = "publishing_houses",
    params(ListQuery),
    responses(
        (status = 200, description = "List of publishing houses", body = Vec<PublishingHouseWithBooks>)
    )
)]
pub async fn list_publishing_houses(
    State(state): State<crate::AppState>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<Vec<PublishingHouseWithBooks>>> {
    let houses = state.services.publishing_houses.list(list.include()).await?;
    Ok(Json(houses))
}

/// List publishing houses sorted by name
#[utoipa::path(
    get,
    path = "/publishingHouses/sorted",
    tag = "publishing_houses",
    params(SortQuery, ListQuery),
    responses(
        (status = 200, description = "Publishing houses sorted by name", body = Vec<PublishingHouseWithBooks>)
    )
)]
pub async fn list_publishing_houses_sorted(
    State(state): State<crate::AppState>,
    Query(sort): Query<SortQuery>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<Vec<PublishingHouseWithBooks>>> {
    let houses = state
        .services
        .publishing_houses
        .list_sorted(sort.ascending(), list.include())
        .await?;
    Ok(Json(houses))
}

/// Search publishing houses by name
#[utoipa::path(
    get,
    path = "/publishingHouses/contains",
    tag = "publishing_houses",
    params(SearchQuery, ListQuery),
    responses(
        (status = 200, description = "Matching publishing houses", body = Vec<PublishingHouseWithBooks>),
        (status = 400, description = "Missing search text")
    )
)]
pub async fn search_publishing_houses(
    State(state): State<crate::AppState>,
    Query(search): Query<SearchQuery>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<Vec<PublishingHouseWithBooks>>> {
    let houses = state
        .services
        .publishing_houses
        .search(search.text.as_deref(), list.include())
        .await?;
    Ok(Json(houses))
}

/// List publishing houses with their total number of books
#[utoipa::path(
    get,
    path = "/publishingHouses/withTotalBooks",
    tag = "publishing_houses",
    responses(
        (status = 200, description = "Publishing houses with book counts", body = Vec<PublishingHouseBookCount>)
    )
)]
pub async fn list_publishing_houses_with_total_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<PublishingHouseBookCount>>> {
    let houses = state.services.publishing_houses.list_with_book_count().await?;
    Ok(Json(houses))
}

/// Get a publishing house with its books
#[utoipa::path(
    get,
    path = "/publishingHouses/{id}",
    tag = "publishing_houses",
    params(("id" = i32, Path, description = "Publishing house ID"), ListQuery),
    responses(
        (status = 200, description = "Publishing house details", body = PublishingHouseWithBooks),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "Publishing house not found")
    )
)]
pub async fn get_publishing_house(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Query(list): Query<ListQuery>,
) -> AppResult<Json<PublishingHouseWithBooks>> {
    let id = parse_id(&id)?;
    let house = state.services.publishing_houses.get_by_id(id, list.include()).await?;
    Ok(Json(house))
}

/// Create a publishing house
#[utoipa::path(
    post,
    path = "/publishingHouses",
    tag = "publishing_houses",
    security(("bearer_auth" = [])),
    request_body = CreatePublishingHouse,
    responses(
        (status = 201, description = "Publishing house created", body = PublishingHouse),
        (status = 400, description = "Missing name")
    )
)]
pub async fn create_publishing_house(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(data): Json<CreatePublishingHouse>,
) -> AppResult<(StatusCode, Json<PublishingHouse>)> {
    let house = state.services.publishing_houses.create(&data).await?;
    Ok((StatusCode::CREATED, Json(house)))
}

/// Update a publishing house
#[utoipa::path(
    put,
    path = "/publishingHouses/{id}",
    tag = "publishing_houses",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Publishing house ID")),
    request_body = UpdatePublishingHouse,
    responses(
        (status = 200, description = "Publishing house updated", body = PublishingHouse),
        (status = 404, description = "Publishing house not found")
    )
)]
pub async fn update_publishing_house(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<UpdatePublishingHouse>,
) -> AppResult<Json<PublishingHouse>> {
    let id = parse_id(&id)?;
    let house = state.services.publishing_houses.update(id, &data).await?;
    Ok(Json(house))
}

/// Delete a publishing house
#[utoipa::path(
    delete,
    path = "/publishingHouses/{id}",
    tag = "publishing_houses",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Publishing house ID")),
    responses(
        (status = 200, description = "Publishing house deleted", body = MessageResponse),
        (status = 404, description = "Publishing house not found"),
        (status = 409, description = "Publishing house still has books")
    )
)]
pub async fn delete_publishing_house(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    state.services.publishing_houses.delete(id).await?;
    Ok(Json(MessageResponse::new("Publishing house successfully deleted")))
}
