//! Load-then-summarize flows behind the statistics and carousel surfaces.
//!
//! Fetch failures stop here: they are logged and turned into something a
//! view can show, so the aggregator only ever sees complete lists.

use crate::model::Book;
use crate::stats::{CategorySummary, StatsError, summarize};
use crate::traits::LibrarySource;

/// Shown when the library could not be reached.
pub const FETCH_FAILED_MESSAGE: &str = "Could not load loan history. Please try again later.";

/// Shown when the user has never borrowed anything.
pub const NO_LOANS_MESSAGE: &str = "No statistics available yet.";

/// What the statistics screen should display.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsView {
    /// The user has no loans
    Empty,
    /// Loading failed; the message is user-facing
    Failed(String),
    Ready(CategorySummary),
}

impl StatsView {
    /// Text for the non-chart states.
    pub fn message(&self) -> Option<&str> {
        match self {
            StatsView::Empty => Some(NO_LOANS_MESSAGE),
            StatsView::Failed(msg) => Some(msg.as_str()),
            StatsView::Ready(_) => None,
        }
    }
}

/// Fetch the catalog and `user_id`'s loans, then rank the top `top_n` categories.
///
/// An invalid `top_n` fails before anything is fetched.
pub async fn load_stats<S: LibrarySource>(source: &S, user_id: i64, top_n: usize) -> StatsView {
    if top_n == 0 {
        return StatsView::Failed(StatsError::InvalidTopN(top_n).to_string());
    }

    let (books, loans) = match tokio::try_join!(source.fetch_books(), source.fetch_loans(user_id))
    {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(user_id, "Failed to load loan statistics: {:#}", e);
            return StatsView::Failed(FETCH_FAILED_MESSAGE.to_string());
        }
    };

    if loans.is_empty() {
        tracing::debug!(user_id, "No loans on record");
        return StatsView::Empty;
    }

    match summarize(&books, &loans, top_n) {
        Ok(summary) => {
            tracing::info!(
                user_id,
                sample_size = summary.total_sample_size,
                "Loan statistics ready"
            );
            StatsView::Ready(summary)
        }
        Err(e) => StatsView::Failed(e.to_string()),
    }
}

/// Fetch the catalog for the carousel. A failed fetch shows an empty shelf.
pub async fn load_shelf<S: LibrarySource>(source: &S) -> Vec<Book> {
    match source.fetch_books().await {
        Ok(books) => books,
        Err(e) => {
            tracing::warn!("Failed to fetch books: {:#}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockLibrary;

    #[test]
    fn test_messages() {
        assert_eq!(StatsView::Empty.message(), Some(NO_LOANS_MESSAGE));
        assert_eq!(StatsView::Failed("boom".to_string()).message(), Some("boom"));

        let ready = StatsView::Ready(CategorySummary {
            entries: Vec::new(),
            total_sample_size: 0,
        });
        assert!(ready.message().is_none());
    }

    #[tokio::test]
    async fn test_invalid_top_n_surfaces_as_failure() {
        let library = MockLibrary::new();
        library.add_loan(1, "X");

        let view = load_stats(&library, 1, 0).await;
        assert_eq!(
            view,
            StatsView::Failed("top_n must be at least 1, got 0".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_top_n_without_loans_fails_before_fetching() {
        let library = MockLibrary::new();

        let view = load_stats(&library, 1, 0).await;
        assert!(matches!(view, StatsView::Failed(_)), "got {:?}", view);
        assert_eq!(library.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_top_n_wins_over_fetch_failure() {
        let library = MockLibrary::new();
        library.set_failing(true);

        let view = load_stats(&library, 1, 0).await;
        assert_eq!(
            view,
            StatsView::Failed("top_n must be at least 1, got 0".to_string())
        );
    }
}
