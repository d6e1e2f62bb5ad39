//! Remote observation table client.
//!
//! Talks to a multi-tenant relational table over a PostgREST-style HTTP
//! API. Every query carries the owner filter, so one user's sync traffic
//! can never read or write another user's rows.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;

use crate::config::RemoteConfig;
use crate::models::{RemoteRow, RemoteRowPayload};
use crate::util::compact_text;
use crate::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ROWS_ROUTE: &str = "/rest/v1/observations";

/// Remote store seam the sync engine reconciles against.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Look up the row for `(user_id, local_id)`; not-found is `Ok(None)`.
    async fn find(&self, user_id: &str, local_id: &str) -> Result<Option<RemoteRow>>;

    /// Insert a new row.
    async fn insert(&self, payload: &RemoteRowPayload) -> Result<()>;

    /// Update an existing row by its server-assigned id.
    async fn update(&self, server_id: i64, payload: &RemoteRowPayload) -> Result<()>;

    /// Fetch all rows owned by `user_id` in one request.
    async fn list_all(&self, user_id: &str) -> Result<Vec<RemoteRow>>;
}

/// HTTP implementation of [`RemoteStore`].
#[derive(Clone)]
pub struct HttpRemoteStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpRemoteStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpRemoteStore")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl HttpRemoteStore {
    /// Build a client from a validated remote configuration.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn rows_url(&self) -> String {
        format!("{}{ROWS_ROUTE}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Remote(format!(
            "HTTP {status}: {}",
            compact_text(&body)
        )))
    }
}

/// Build a PostgREST equality filter, percent-encoding the value.
fn eq_filter(column: &str, value: &str) -> String {
    format!("{column}=eq.{}", urlencoding::encode(value))
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn find(&self, user_id: &str, local_id: &str) -> Result<Option<RemoteRow>> {
        let url = format!(
            "{}?{}&{}",
            self.rows_url(),
            eq_filter("user_id", user_id),
            eq_filter("local_id", local_id)
        );

        let response = self.authorize(self.client.get(url)).send().await?;
        let rows: Vec<RemoteRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, payload: &RemoteRowPayload) -> Result<()> {
        let response = self
            .authorize(self.client.post(self.rows_url()))
            .json(payload)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update(&self, server_id: i64, payload: &RemoteRowPayload) -> Result<()> {
        let url = format!(
            "{}?{}",
            self.rows_url(),
            eq_filter("id", &server_id.to_string())
        );

        let response = self
            .authorize(self.client.patch(url))
            .json(payload)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_all(&self, user_id: &str) -> Result<Vec<RemoteRow>> {
        let url = format!("{}?{}", self.rows_url(), eq_filter("user_id", user_id));

        let response = self.authorize(self.client.get(url)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
