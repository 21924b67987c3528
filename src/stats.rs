use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::model::{Book, LoanRecord};

/// Bucket for loans whose title has no catalog match or whose book has no category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Slices below this share are drawn without an inline label.
pub const INLINE_LABEL_MIN_SHARE: f64 = 0.07;

/// Errors raised by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("top_n must be at least 1, got {0}")]
    InvalidTopN(usize),
}

// ==================== Output Types ====================

/// Number of loans that resolved to one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// One row of the ranked summary handed to charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummaryEntry {
    /// Resolved category name
    pub category: String,
    /// Loans mapped to this category
    pub count: usize,
    /// Share of all loans, in [0, 1]
    pub percent: f64,
}

impl CategorySummaryEntry {
    /// Whole-percent label, e.g. `"67%"`.
    pub fn percent_label(&self) -> String {
        format!("{:.0}%", self.percent * 100.0)
    }

    /// Whether the pie chart has room to print this slice's name inside it.
    pub fn shows_inline_label(&self) -> bool {
        self.percent >= INLINE_LABEL_MIN_SHARE
    }
}

/// Ranked top-N categories plus the size of the whole sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub entries: Vec<CategorySummaryEntry>,
    /// Every loan, including those outside the top entries
    pub total_sample_size: usize,
}

impl CategorySummary {
    pub fn is_empty(&self) -> bool {
        self.total_sample_size == 0
    }
}

// ==================== Aggregation ====================

/// Count loans per category across the whole sample.
///
/// Loans join to the catalog by exact title. When the catalog repeats a
/// title, the first book carrying it wins. Unmatched loans and books without
/// a category land in [`UNCATEGORIZED`].
///
/// The result is sorted by count descending, then by category name
/// ascending, so equal counts always come out in the same order.
pub fn category_distribution(catalog: &[Book], loans: &[LoanRecord]) -> Vec<CategoryCount> {
    let mut by_title: HashMap<&str, &Book> = HashMap::with_capacity(catalog.len());
    for book in catalog {
        by_title.entry(book.title.as_str()).or_insert(book);
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for loan in loans {
        let category = by_title
            .get(loan.title.as_str())
            .and_then(|book| book.category_label())
            .unwrap_or(UNCATEGORIZED);
        *counts.entry(category).or_insert(0) += 1;
    }

    let mut buckets: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    buckets.sort_by(rank);
    buckets
}

fn rank(a: &CategoryCount, b: &CategoryCount) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.category.cmp(&b.category))
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Rank loan categories and keep the `top_n` largest.
///
/// `total_sample_size` always reflects every loan, not just the kept entries.
/// Empty inputs are fine; only `top_n == 0` is rejected.
pub fn summarize(
    catalog: &[Book],
    loans: &[LoanRecord],
    top_n: usize,
) -> Result<CategorySummary, StatsError> {
    if top_n == 0 {
        return Err(StatsError::InvalidTopN(top_n));
    }

    let total = loans.len();
    let entries = category_distribution(catalog, loans)
        .into_iter()
        .take(top_n)
        .map(|bucket| CategorySummaryEntry {
            percent: share(bucket.count, total),
            category: bucket.category,
            count: bucket.count,
        })
        .collect();

    tracing::debug!(total, top_n, "Summarized loan categories");

    Ok(CategorySummary {
        entries,
        total_sample_size: total,
    })
}
