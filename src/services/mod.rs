//! Business logic services

pub mod auth;
pub mod authors;
pub mod books;
pub mod covers;
pub mod publishing_houses;
pub mod users;

use crate::{
    config::{AuthConfig, UploadsConfig},
    error::{AppError, AppResult},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub authors: authors::AuthorsService,
    pub publishing_houses: publishing_houses::PublishingHousesService,
    pub books: books::BooksService,
    pub users: users::UsersService,
    pub covers: covers::CoverStorage,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, uploads_config: UploadsConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            authors: authors::AuthorsService::new(repository.clone()),
            publishing_houses: publishing_houses::PublishingHousesService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            covers: covers::CoverStorage::new(uploads_config.dir),
            repository,
        }
    }

    /// Check that the database answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

/// Trimmed value of a required text field; missing or blank is a validation error
pub(crate) fn required_text(value: Option<&str>, field: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::Validation(format!("The '{}' field is required", field))),
    }
}

/// Like [`required_text`], but absence is fine (patch semantics)
pub(crate) fn optional_text(value: Option<&str>, field: &str) -> AppResult<Option<String>> {
    value.map(|v| required_text(Some(v), field)).transpose()
}

/// Search text must contain something other than whitespace
pub(crate) fn search_text<'a>(text: Option<&'a str>) -> AppResult<&'a str> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(AppError::Validation("The 'text' parameter is required".to_string())),
    }
}
