//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book to the catalog
    pub fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        let created = self.repository.write(|library| library.catalog.add(book))?;
        tracing::info!(book_id = %created.id, copies = created.total_copies, "Book added");
        Ok(created)
    }

    /// Get a book by ID
    pub fn get_book(&self, id: &str) -> AppResult<Book> {
        self.repository
            .read(|library| library.catalog.find(id).cloned())?
            .ok_or_else(|| AppError::book_not_found(id))
    }

    /// List books, optionally filtered by text and category, ordered by title
    pub fn search_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let text = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let category = query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        tracing::debug!(?text, ?category, "Searching catalog");

        self.repository.read(|library| {
            let books = match text {
                Some(text) => library.catalog.search(text),
                None => library.catalog.list(),
            };
            match category {
                Some(category) => books.into_iter().filter(|b| b.has_category(category)).collect(),
                None => books,
            }
        })
    }

    /// Distinct category labels
    pub fn categories(&self) -> AppResult<Vec<String>> {
        self.repository.read(|library| library.catalog.categories())
    }

    /// Load the demonstration books into an empty catalog.
    /// Returns how many books were added.
    pub fn seed_sample_catalog(&self) -> AppResult<usize> {
        self.repository.write(|library| {
            if !library.catalog.is_empty() {
                return Ok(0);
            }
            let samples = sample_books();
            let count = samples.len();
            for book in samples {
                library.catalog.add(book)?;
            }
            Ok(count)
        })
    }
}

fn sample_books() -> Vec<CreateBook> {
    let book = |id: &str, title: &str, author: &str, categories: &[&str], copies: u32| CreateBook {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        total_copies: copies,
    };

    vec![
        book("9780140449136", "The Odyssey", "Homer", &["Classic", "Epic"], 4),
        book(
            "9780061120084",
            "To Kill a Mockingbird",
            "Harper Lee",
            &["Fiction", "Classic"],
            5,
        ),
        book(
            "9780262033848",
            "Introduction to Algorithms",
            "Cormen, Leiserson, Rivest, Stein",
            &["Computer Science", "Algorithms"],
            2,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn seeded() -> CatalogService {
        let service = CatalogService::new(Repository::default());
        assert_eq!(service.seed_sample_catalog().unwrap(), 3);
        service
    }

    #[test]
    fn test_seed_only_into_empty_catalog() {
        let service = seeded();
        assert_eq!(service.seed_sample_catalog().unwrap(), 0);
        assert_eq!(service.search_books(&BookQuery::default()).unwrap().len(), 3);
    }

    #[test]
    fn test_search_with_category_filter() {
        let service = seeded();

        let classics = service
            .search_books(&BookQuery {
                search: None,
                category: Some("classic".to_string()),
            })
            .unwrap();
        assert_eq!(classics.len(), 2);

        let homer = service
            .search_books(&BookQuery {
                search: Some("  homer ".to_string()),
                category: Some("Classic".to_string()),
            })
            .unwrap();
        assert_eq!(homer.len(), 1);
        assert_eq!(homer[0].title, "The Odyssey");

        // Category filtering is exact, not substring
        let none = service
            .search_books(&BookQuery {
                search: None,
                category: Some("Class".to_string()),
            })
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_add_and_get() {
        let service = seeded();
        let err = service
            .add_book(CreateBook {
                id: "9780140449136".to_string(),
                title: "Dup".to_string(),
                author: String::new(),
                categories: vec![],
                total_copies: 1,
            })
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BookAlreadyExists);

        let err = service
            .add_book(CreateBook {
                id: "new".to_string(),
                title: String::new(),
                author: String::new(),
                categories: vec![],
                total_copies: 1,
            })
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadValue);

        assert_eq!(service.get_book("9780262033848").unwrap().available_copies, 2);
        assert_eq!(service.get_book("missing").unwrap_err().code(), ErrorCode::BookNotFound);
        assert_eq!(service.categories().unwrap().len(), 5);
    }
}
