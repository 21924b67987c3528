//! Category filtering and carousel state for the browse surfaces.

use std::fmt;

use crate::model::Book;

/// Which slice of the catalog the carousel shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Parse a user-supplied category. `"all"` (any case) and blank input mean no filter.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(trimmed.to_string())
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        match self {
            Self::All => true,
            Self::Named(category) => book.category.as_deref() == Some(category.as_str()),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All books"),
            Self::Named(category) => f.write_str(category),
        }
    }
}

/// Books passing `filter`, in catalog order.
pub fn filter_books<'a>(books: &'a [Book], filter: &CategoryFilter) -> Vec<&'a Book> {
    books.iter().filter(|book| filter.matches(book)).collect()
}

/// The book that gets the "popular" badge: the first one shown.
pub fn popular_book<'a>(books: &[&'a Book]) -> Option<&'a Book> {
    books.first().copied()
}

/// Counts shown under the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShelfSummary {
    pub total: usize,
    /// Books with at least one copy on the shelf
    pub available: usize,
}

impl ShelfSummary {
    pub fn of(books: &[&Book]) -> Self {
        Self {
            total: books.len(),
            available: books.iter().filter(|book| book.is_available()).count(),
        }
    }

    pub fn describe(&self, filter: &CategoryFilter) -> String {
        format!(
            "{}: {} books, {} available to borrow",
            filter, self.total, self.available
        )
    }
}

/// Rotation cursor over the currently filtered books.
#[derive(Debug, Clone, Default)]
pub struct Carousel {
    filter: CategoryFilter,
    index: usize,
}

impl Carousel {
    pub fn new(filter: CategoryFilter) -> Self {
        Self { filter, index: 0 }
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Switch category. The cursor starts over.
    pub fn set_filter(&mut self, filter: CategoryFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.index = 0;
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// The book under the cursor, if the filtered list is non-empty.
    ///
    /// The cursor is clamped into range in case the catalog shrank since the
    /// last tick.
    pub fn current<'a>(&self, books: &'a [Book]) -> Option<&'a Book> {
        let shown = filter_books(books, &self.filter);
        if shown.is_empty() {
            return None;
        }
        Some(shown[self.index % shown.len()])
    }

    /// Move to the next book, wrapping at the end. No-op when nothing is shown.
    pub fn advance<'a>(&mut self, books: &'a [Book]) -> Option<&'a Book> {
        let len = books.iter().filter(|book| self.filter.matches(book)).count();
        if len == 0 {
            self.index = 0;
            return None;
        }
        self.index = (self.index + 1) % len;
        self.current(books)
    }
}
