//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, health, publishing_houses, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library API",
        version = "1.0.0",
        description = "Book catalog REST API: authors, publishing houses, books and users"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Authors
        authors::list_authors,
        authors::list_authors_sorted,
        authors::search_authors,
        authors::list_authors_with_total_books,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Publishing houses
        publishing_houses::list_publishing_houses,
        publishing_houses::list_publishing_houses_sorted,
        publishing_houses::search_publishing_houses,
        publishing_houses::list_publishing_houses_with_total_books,
        publishing_houses::get_publishing_house,
        publishing_houses::create_publishing_house,
        publishing_houses::update_publishing_house,
        publishing_houses::delete_publishing_house,
        // Books
        books::list_books,
        books::list_books_sorted,
        books::search_books,
        books::list_book_prices,
        books::list_books_grouped_by_discontinued,
        books::list_books_by_price,
        books::list_books_with_total_authors,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorWithBooks,
            crate::models::author::AuthorBookCount,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Publishing houses
            crate::models::publishing_house::PublishingHouse,
            crate::models::publishing_house::PublishingHouseWithBooks,
            crate::models::publishing_house::PublishingHouseBookCount,
            crate::models::publishing_house::CreatePublishingHouse,
            crate::models::publishing_house::UpdatePublishingHouse,
            // Books
            crate::models::book::Book,
            crate::models::book::BookDetails,
            crate::models::book::DiscontinuedGroups,
            crate::models::book::BookPrice,
            crate::models::book::BookAuthorCount,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Health
            health::HealthResponse,
            // Common
            super::MessageResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "authors", description = "Author management"),
        (name = "publishing_houses", description = "Publishing house management"),
        (name = "books", description = "Book catalog"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
