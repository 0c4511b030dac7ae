//! Authors service

use crate::{
    error::AppResult,
    models::author::{Author, AuthorBookCount, AuthorWithBooks, CreateAuthor, UpdateAuthor},
    repository::Repository,
};

use super::{optional_text, required_text, search_text};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, include_books: bool) -> AppResult<Vec<AuthorWithBooks>> {
        self.repository.authors.list(include_books).await
    }

    pub async fn get_by_id(&self, id: i32, include_books: bool) -> AppResult<AuthorWithBooks> {
        self.repository.authors.get_by_id(id, include_books).await
    }

    pub async fn list_sorted(&self, ascending: bool, include_books: bool) -> AppResult<Vec<AuthorWithBooks>> {
        self.repository.authors.list_sorted(ascending, include_books).await
    }

    pub async fn search(&self, text: Option<&str>, include_books: bool) -> AppResult<Vec<AuthorWithBooks>> {
        let text = search_text(text)?;
        self.repository.authors.search(text, include_books).await
    }

    pub async fn list_with_book_count(&self) -> AppResult<Vec<AuthorBookCount>> {
        self.repository.authors.list_with_book_count().await
    }

    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let name = required_text(data.name.as_deref(), "name")?;
        let author = self.repository.authors.create(&name).await?;
        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    pub async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        let name = optional_text(data.name.as_deref(), "name")?;
        let author = self.repository.authors.update(id, name.as_deref()).await?;
        tracing::info!(author_id = id, "Author updated");
        Ok(author)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }
}
