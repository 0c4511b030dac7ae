//! Library Server - book catalog REST API
//!
//! Serves authors, publishing houses, books and users over HTTP.

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

/// Upper bound for request bodies, cover uploads included
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("library_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Library Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| format!("Failed to create uploads directory {}", config.uploads.dir))?;

    // Save server address before moving config
    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone(), config.uploads.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Authors
        .route(
            "/authors",
            get(api::authors::list_authors).post(api::authors::create_author),
        )
        .route("/authors/sorted", get(api::authors::list_authors_sorted))
        .route("/authors/contains", get(api::authors::search_authors))
        .route(
            "/authors/withTotalBooks",
            get(api::authors::list_authors_with_total_books),
        )
        .route(
            "/authors/:id",
            get(api::authors::get_author)
                .put(api::authors::update_author)
                .patch(api::authors::update_author)
                .delete(api::authors::delete_author),
        )
        // Publishing houses
        .route(
            "/publishingHouses",
            get(api::publishing_houses::list_publishing_houses)
                .post(api::publishing_houses::create_publishing_house),
        )
        .route(
            "/publishingHouses/sorted",
            get(api::publishing_houses::list_publishing_houses_sorted),
        )
        .route(
            "/publishingHouses/contains",
            get(api::publishing_houses::search_publishing_houses),
        )
        .route(
            "/publishingHouses/withTotalBooks",
            get(api::publishing_houses::list_publishing_houses_with_total_books),
        )
        .route(
            "/publishingHouses/:id",
            get(api::publishing_houses::get_publishing_house)
                .put(api::publishing_houses::update_publishing_house)
                .patch(api::publishing_houses::update_publishing_house)
                .delete(api::publishing_houses::delete_publishing_house),
        )
        // Books
        .route(
            "/books",
            get(api::books::list_books).post(api::books::create_book),
        )
        .route("/books/sorted", get(api::books::list_books_sorted))
        .route("/books/contains", get(api::books::search_books))
        .route("/books/prices", get(api::books::list_book_prices))
        .route(
            "/books/grouped/discontinued",
            get(api::books::list_books_grouped_by_discontinued),
        )
        .route("/books/by-price", get(api::books::list_books_by_price))
        .route(
            "/books/withTotalAuthors",
            get(api::books::list_books_with_total_authors),
        )
        .route(
            "/books/:id",
            get(api::books::get_book)
                .put(api::books::update_book)
                .patch(api::books::update_book)
                .delete(api::books::delete_book),
        )
        // Users
        .route(
            "/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/users/:id",
            get(api::users::get_user)
                .put(api::users::update_user)
                .patch(api::users::update_user)
                .delete(api::users::delete_user),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    // Uploaded covers
    let uploads = ServeDir::new(&state.config.uploads.dir);

    Router::new()
        .nest("/api/v1", api_v1)
        .nest_service("/uploads", uploads)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
