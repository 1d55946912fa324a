//! Book catalog and copy counters

use std::collections::{BTreeMap, HashMap};

use crate::{
    collation,
    config::OverReturnPolicy,
    error::{AppError, AppResult, ErrorCode},
    models::book::{Book, CreateBook},
};

#[derive(Debug, Default, Clone)]
pub struct Catalog {
    books: HashMap<String, Book>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a book with every copy available
    pub fn add(&mut self, book: CreateBook) -> AppResult<Book> {
        if self.books.contains_key(&book.id) {
            return Err(AppError::Conflict(
                ErrorCode::BookAlreadyExists,
                format!("Book {} already exists", book.id),
            ));
        }

        let book = Book {
            id: book.id,
            title: book.title,
            author: book.author,
            categories: book.categories,
            total_copies: book.total_copies,
            available_copies: book.total_copies,
        };
        self.books.insert(book.id.clone(), book.clone());
        Ok(book)
    }

    pub fn find(&self, id: &str) -> Option<&Book> {
        self.books.get(id)
    }

    pub fn get(&self, id: &str) -> AppResult<&Book> {
        self.find(id).ok_or_else(|| AppError::book_not_found(id))
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    /// All books ordered by title
    pub fn list(&self) -> Vec<Book> {
        let mut books: Vec<Book> = self.books.values().cloned().collect();
        sort_by_title(&mut books);
        books
    }

    /// Books whose title, author or categories contain `query`, ordered by title
    pub fn search(&self, query: &str) -> Vec<Book> {
        let needle = query.to_lowercase();
        let mut books: Vec<Book> = self
            .books
            .values()
            .filter(|b| b.matches(&needle))
            .cloned()
            .collect();
        sort_by_title(&mut books);
        books
    }

    /// Distinct category labels, first spelling wins
    pub fn categories(&self) -> Vec<String> {
        let mut seen: BTreeMap<String, String> = BTreeMap::new();
        for book in self.list() {
            for category in book.categories {
                seen.entry(collation::collation_key(&category))
                    .or_insert(category);
            }
        }
        seen.into_values().collect()
    }

    /// Move a book's available counter by `delta`.
    ///
    /// Only the ledger calls this. Going below zero is always an error; going
    /// above the total copy count is clamped or rejected according to `policy`.
    pub(crate) fn adjust_availability(
        &mut self,
        id: &str,
        delta: i64,
        policy: OverReturnPolicy,
    ) -> AppResult<u32> {
        let book = self
            .books
            .get_mut(id)
            .ok_or_else(|| AppError::book_not_found(id))?;
        let target = Self::checked_target(book, delta, policy)?;
        book.available_copies = target;
        Ok(target)
    }

    /// Validate an adjustment without applying it
    pub(crate) fn check_adjustment(
        &self,
        id: &str,
        delta: i64,
        policy: OverReturnPolicy,
    ) -> AppResult<u32> {
        let book = self.get(id)?;
        Self::checked_target(book, delta, policy)
    }

    fn checked_target(book: &Book, delta: i64, policy: OverReturnPolicy) -> AppResult<u32> {
        let target = i64::from(book.available_copies) + delta;
        let total = i64::from(book.total_copies);

        if target < 0 {
            return Err(AppError::PreconditionFailed(
                ErrorCode::BookUnavailable,
                format!(
                    "Book {} has only {} copies available",
                    book.id, book.available_copies
                ),
            ));
        }

        if target > total {
            match policy {
                OverReturnPolicy::Clamp => {
                    tracing::warn!(
                        book_id = %book.id,
                        available = book.available_copies,
                        total = book.total_copies,
                        delta,
                        "Availability clamped at total copies"
                    );
                    return Ok(book.total_copies);
                }
                OverReturnPolicy::Reject => {
                    return Err(AppError::PreconditionFailed(
                        ErrorCode::AvailabilityOverflow,
                        format!(
                            "Returning to book {} would exceed its {} copies",
                            book.id, book.total_copies
                        ),
                    ));
                }
            }
        }

        // 0 <= target <= total <= u32::MAX
        Ok(target as u32)
    }
}

fn sort_by_title(books: &mut [Book]) {
    books.sort_by(|a, b| collation::compare(&a.title, &b.title).then_with(|| a.id.cmp(&b.id)));
}
