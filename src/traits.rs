//! Abstractions for time and data access to enable testing.
//!
//! This module provides traits for:
//! - `Clock`: Abstracting time access for deterministic export filenames
//! - `LibrarySource`: Abstracting where books and loans come from

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::model::{Book, LoanRecord};

// ==================== Clock Trait ====================

/// Trait for abstracting time access.
pub trait Clock: Send + Sync {
    /// Get the current time in UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for testing with controllable time.
#[derive(Debug, Clone)]
pub struct MockClock {
    utc_time: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a new mock clock set to the given UTC time.
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            utc_time: Arc::new(Mutex::new(time)),
        }
    }

    /// Set the mock clock to a new time.
    pub fn set_time(&self, time: DateTime<Utc>) {
        *self.utc_time.lock().unwrap() = time;
    }
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.utc_time.lock().unwrap()
    }
}

// ==================== LibrarySource Trait ====================

/// Where the catalog and a user's loan history come from.
///
/// Implementations own transport, timeouts and retries. Callers only ever
/// see a complete list or an error.
pub trait LibrarySource: Send + Sync {
    /// Fetch the full catalog.
    fn fetch_books(&self) -> impl Future<Output = Result<Vec<Book>>> + Send;

    /// Fetch every loan recorded for `user_id`.
    fn fetch_loans(&self, user_id: i64) -> impl Future<Output = Result<Vec<LoanRecord>>> + Send;
}

/// In-memory source for tests that records how often it was asked.
#[derive(Debug, Clone, Default)]
pub struct MockLibrary {
    books: Arc<Mutex<Vec<Book>>>,
    loans: Arc<Mutex<Vec<(i64, LoanRecord)>>>,
    failing: Arc<AtomicBool>,
    fetches: Arc<AtomicUsize>,
}

impl MockLibrary {
    /// Create an empty mock library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock library holding `books`.
    pub fn with_books(books: Vec<Book>) -> Self {
        let library = Self::new();
        *library.books.lock().unwrap() = books;
        library
    }

    /// Record a loan of `title` by `user_id`.
    pub fn add_loan(&self, user_id: i64, title: &str) {
        self.loans
            .lock()
            .unwrap()
            .push((user_id, LoanRecord::new(title)));
    }

    /// Make every following fetch fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of fetch calls made so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("mock library is offline");
        }
        Ok(())
    }
}

impl LibrarySource for MockLibrary {
    async fn fetch_books(&self) -> Result<Vec<Book>> {
        self.check()?;
        Ok(self.books.lock().unwrap().clone())
    }

    async fn fetch_loans(&self, user_id: i64) -> Result<Vec<LoanRecord>> {
        self.check()?;
        Ok(self
            .loans
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, loan)| loan.clone())
            .collect())
    }
}
