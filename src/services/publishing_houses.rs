//! Publishing houses service

use crate::{
    error::AppResult,
    models::publishing_house::{
        CreatePublishingHouse, PublishingHouse, PublishingHouseBookCount, PublishingHouseWithBooks,
        UpdatePublishingHouse,
    },
    repository::Repository,
};

use super::{optional_text, required_text, search_text};

#[derive(Clone)]
pub struct PublishingHousesService {
    repository: Repository,
}

impl PublishingHousesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, include_books: bool) -> AppResult<Vec<PublishingHouseWithBooks>> {
        self.repository.publishing_houses.list(include_books).await
    }

    pub async fn get_by_id(&self, id: i32, include_books: bool) -> AppResult<PublishingHouseWithBooks> {
        self.repository.publishing_houses.get_by_id(id, include_books).await
    }

    pub async fn list_sorted(
        &self,
        ascending: bool,
        include_books: bool,
    ) -> AppResult<Vec<PublishingHouseWithBooks>> {
        self.repository
            .publishing_houses
            .list_sorted(ascending, include_books)
            .await
    }

    pub async fn search(
        &self,
        text: Option<&str>,
        include_books: bool,
    ) -> AppResult<Vec<PublishingHouseWithBooks>> {
        let text = search_text(text)?;
        self.repository.publishing_houses.search(text, include_books).await
    }

    pub async fn list_with_book_count(&self) -> AppResult<Vec<PublishingHouseBookCount>> {
        self.repository.publishing_houses.list_with_book_count().await
    }

    pub async fn create(&self, data: &CreatePublishingHouse) -> AppResult<PublishingHouse> {
        let name = required_text(data.name.as_deref(), "name")?;
        let house = self.repository.publishing_houses.create(&name).await?;
        tracing::info!(publishing_house_id = house.id, "Publishing house created");
        Ok(house)
    }

    pub async fn update(&self, id: i32, data: &UpdatePublishingHouse) -> AppResult<PublishingHouse> {
        let name = optional_text(data.name.as_deref(), "name")?;
        let house = self
            .repository
            .publishing_houses
            .update(id, name.as_deref())
            .await?;
        tracing::info!(publishing_house_id = id, "Publishing house updated");
        Ok(house)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.publishing_houses.delete(id).await?;
        tracing::info!(publishing_house_id = id, "Publishing house deleted");
        Ok(())
    }
}
