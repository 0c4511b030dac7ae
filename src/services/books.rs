//! Books service

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::book::{
        Book, BookAuthorCount, BookDetails, BookPrice, CreateBook, DiscontinuedGroups, NewBook,
        UpdateBook,
    },
    repository::Repository,
};

use super::{optional_text, required_text, search_text};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, include_relations: bool) -> AppResult<Vec<BookDetails>> {
        self.repository.books.list(include_relations).await
    }

    pub async fn get_by_id(&self, isbn: i32, include_relations: bool) -> AppResult<BookDetails> {
        self.repository.books.get_by_id(isbn, include_relations).await
    }

    pub async fn list_sorted(&self, ascending: bool, include_relations: bool) -> AppResult<Vec<BookDetails>> {
        self.repository.books.list_sorted(ascending, include_relations).await
    }

    pub async fn search(&self, text: Option<&str>, include_relations: bool) -> AppResult<Vec<BookDetails>> {
        let text = search_text(text)?;
        self.repository.books.search(text, include_relations).await
    }

    /// Books priced in the inclusive range `[min, max]`
    pub async fn list_by_price(
        &self,
        min: Decimal,
        max: Decimal,
        include_relations: bool,
    ) -> AppResult<Vec<BookDetails>> {
        if min > max {
            return Ok(Vec::new());
        }
        self.repository
            .books
            .list_by_price(min, max, include_relations)
            .await
    }

    pub async fn grouped_by_discontinued(&self) -> AppResult<DiscontinuedGroups> {
        let books = self.repository.books.list(true).await?;
        Ok(DiscontinuedGroups::partition(books))
    }

    pub async fn list_prices(&self) -> AppResult<Vec<BookPrice>> {
        self.repository.books.list_prices().await
    }

    pub async fn list_with_author_count(&self) -> AppResult<Vec<BookAuthorCount>> {
        self.repository.books.list_with_author_count().await
    }

    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let book = validate_new_book(data)?;
        let created = self.repository.books.create(&book).await?;
        tracing::info!(
            isbn = created.isbn,
            author_id = created.author_id,
            publishing_house_id = created.publishing_house_id,
            "Book created"
        );
        Ok(created)
    }

    pub async fn update(&self, isbn: i32, data: &UpdateBook) -> AppResult<Book> {
        let changes = validate_book_changes(data)?;
        let updated = self.repository.books.update(isbn, &changes).await?;
        tracing::info!(isbn, "Book updated");
        Ok(updated)
    }

    pub async fn delete(&self, isbn: i32) -> AppResult<()> {
        self.repository.books.delete(isbn).await?;
        tracing::info!(isbn, "Book deleted");
        Ok(())
    }
}

fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::Validation(format!("The '{}' field is required", field)))
}

fn check_pages(pages: i32) -> AppResult<i32> {
    if pages < 0 {
        return Err(AppError::Validation("'pages' must not be negative".to_string()));
    }
    Ok(pages)
}

/// Largest price a `NUMERIC(9,2)` column holds
const MAX_PRICE: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 2);

/// Non-negative price rounded to two decimal places
fn check_price(price: Decimal) -> AppResult<Decimal> {
    if price < Decimal::ZERO {
        return Err(AppError::Validation("'price' must not be negative".to_string()));
    }
    let price = price.round_dp(2);
    if price > MAX_PRICE {
        return Err(AppError::Validation(format!("'price' must not exceed {}", MAX_PRICE)));
    }
    Ok(price)
}

/// Check a create request and fill in defaults
pub(crate) fn validate_new_book(data: &CreateBook) -> AppResult<NewBook> {
    Ok(NewBook {
        title: required_text(data.title.as_deref(), "title")?,
        pages: check_pages(required(data.pages, "pages")?)?,
        price: check_price(required(data.price, "price")?)?,
        discontinued: data.discontinued.unwrap_or(false),
        author_id: required(data.author_id, "authorId")?,
        publishing_house_id: required(data.publishing_house_id, "publishingHouseId")?,
        photo_cover: data.photo_cover.clone(),
    })
}

/// Check the supplied fields of a patch; absent fields stay absent
pub(crate) fn validate_book_changes(data: &UpdateBook) -> AppResult<UpdateBook> {
    Ok(UpdateBook {
        title: optional_text(data.title.as_deref(), "title")?,
        pages: data.pages.map(check_pages).transpose()?,
        price: data.price.map(check_price).transpose()?,
        discontinued: data.discontinued,
        author_id: data.author_id,
        publishing_house_id: data.publishing_house_id,
        photo_cover: data.photo_cover.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn lotr() -> CreateBook {
        CreateBook {
            title: Some("LOTR".into()),
            pages: Some(1200),
            price: Some(dec("29.99")),
            discontinued: None,
            author_id: Some(1),
            publishing_house_id: Some(1),
            photo_cover: None,
        }
    }

    #[test]
    fn test_new_book_defaults_to_available() {
        let book = validate_new_book(&lotr()).unwrap();
        assert_eq!(book.title, "LOTR");
        assert_eq!(book.pages, 1200);
        assert_eq!(book.price, dec("29.99"));
        assert!(!book.discontinued);
        assert_eq!(book.author_id, 1);
        assert_eq!(book.publishing_house_id, 1);
    }

    #[test]
    fn test_new_book_requires_every_field() {
        let cases = [
            CreateBook { title: None, ..lotr() },
            CreateBook { title: Some("  ".into()), ..lotr() },
            CreateBook { pages: None, ..lotr() },
            CreateBook { price: None, ..lotr() },
            CreateBook { author_id: None, ..lotr() },
            CreateBook { publishing_house_id: None, ..lotr() },
        ];
        for data in cases {
            assert!(matches!(validate_new_book(&data), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_negative_values_are_rejected() {
        let mut data = lotr();
        data.price = Some(dec("-0.01"));
        assert!(validate_new_book(&data).is_err());

        let mut data = lotr();
        data.pages = Some(-1);
        assert!(validate_new_book(&data).is_err());
    }

    #[test]
    fn test_price_must_fit_the_column() {
        let mut data = lotr();
        data.price = Some(dec("9999999.99"));
        assert_eq!(validate_new_book(&data).unwrap().price, dec("9999999.99"));

        for too_big in ["10000000", "9999999.999", "123456789012"] {
            data.price = Some(dec(too_big));
            assert!(matches!(validate_new_book(&data), Err(AppError::Validation(_))));
        }

        let patch = UpdateBook {
            price: Some(dec("10000000.00")),
            ..Default::default()
        };
        assert!(matches!(validate_book_changes(&patch), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_price_is_rounded_to_cents() {
        let mut data = lotr();
        data.price = Some(dec("10.005"));
        assert_eq!(validate_new_book(&data).unwrap().price, dec("10.00"));
        data.price = Some(dec("0"));
        assert_eq!(validate_new_book(&data).unwrap().price, Decimal::ZERO);
    }

    #[test]
    fn test_empty_patch_stays_empty() {
        let changes = validate_book_changes(&UpdateBook::default()).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_patch_keeps_only_supplied_fields() {
        let patch = UpdateBook {
            title: Some(" The Hobbit ".into()),
            price: Some(dec("12.5")),
            ..Default::default()
        };
        let changes = validate_book_changes(&patch).unwrap();
        assert_eq!(changes.title.as_deref(), Some("The Hobbit"));
        assert_eq!(changes.price, Some(dec("12.50")));
        assert_eq!(changes.pages, None);
        assert_eq!(changes.author_id, None);
        assert_eq!(changes.discontinued, None);
    }

    #[test]
    fn test_patch_rejects_blank_title() {
        let patch = UpdateBook {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(validate_book_changes(&patch), Err(AppError::Validation(_))));
    }
}
