//! Shelf Monitor Library
//!
//! This module exposes the core components of Shelf Monitor: loan-category
//! statistics, catalog browsing, and the library API client.

pub mod api;
pub mod browse;
pub mod config;
pub mod export;
pub mod model;
pub mod stats;
pub mod traits;
pub mod view;

// Re-export commonly used types
pub use api::LibraryApiClient;
pub use browse::{Carousel, CategoryFilter, ShelfSummary, filter_books, popular_book};
pub use config::AppConfig;
pub use model::{Book, LoanRecord};
pub use stats::{
    CategoryCount, CategorySummary, CategorySummaryEntry, StatsError, UNCATEGORIZED,
    category_distribution, summarize,
};
pub use traits::{Clock, LibrarySource, MockClock, MockLibrary, SystemClock};
pub use view::{StatsView, load_shelf, load_stats};
