use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::config::NetworkConfig;
use crate::model::{Book, LoanRecord};
use crate::traits::LibrarySource;

/// API client for the library backend.
#[derive(Clone, Debug)]
pub struct LibraryApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl LibraryApiClient {
    /// Create a new API client with configurable timeouts.
    pub fn new(base_url: String, network_config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network_config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network_config.connect_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn books_url(&self) -> String {
        format!("{}/books", self.base_url)
    }

    pub fn loans_url(&self, user_id: i64) -> String {
        format!("{}/users/{}/loans", self.base_url, user_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to library API", what))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("API returned error status for {}: {}", what, status);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }
}

impl LibrarySource for LibraryApiClient {
    async fn fetch_books(&self) -> Result<Vec<Book>> {
        let books: Vec<Book> = self.get_json(&self.books_url(), "books").await?;
        tracing::debug!("Fetched {} books", books.len());
        Ok(books)
    }

    async fn fetch_loans(&self, user_id: i64) -> Result<Vec<LoanRecord>> {
        let loans: Vec<LoanRecord> = self.get_json(&self.loans_url(user_id), "loans").await?;
        tracing::debug!(user_id, "Fetched {} loans", loans.len());
        Ok(loans)
    }
}
