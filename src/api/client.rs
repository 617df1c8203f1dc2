//! HTTP implementation of [`ArticleApi`] on `reqwest`.

use reqwest::header::CACHE_CONTROL;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::ArticleApi;
use crate::error::{Error, Result};
use crate::model::{AuthenticatedUser, ItemPayload, RemoteItem};

/// How HTTP 429 responses are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries before giving up. `0` retries forever without waiting.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based), or `None` when the
    /// budget is spent.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if self.max_retries == 0 {
            return Some(Duration::ZERO);
        }
        if attempt > self.max_retries {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        Some(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }
}

/// Qiita's JSON error body.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Qiita API v2 client.
pub struct QiitaClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    retry: RetryPolicy,
}

impl QiitaClient {
    /// Create a client for `endpoint` (e.g. `https://qiita.com/api/v2`).
    #[must_use]
    pub fn new(endpoint: &str, token: &str, retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
            retry,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    /// Send a request built by `build`, retrying on 429 per the policy.
    async fn send<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder + Send,
    {
        let mut attempt = 0;
        loop {
            let response = build(&self.client)
                .bearer_auth(&self.token)
                .header(CACHE_CONTROL, "no-cache, no-store")
                .send()
                .await?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            attempt += 1;
            let url = response.url().to_string();
            let Some(delay) = self.retry.delay(attempt) else {
                return Err(Error::RateLimited { url, attempts: attempt });
            };
            warn!(%url, attempt, ?delay, "Rate limited by Qiita, retrying");
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Turn a non-success response into `Error::Http`.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text).map_or(text, |body| body.message);
    Err(Error::Http {
        status: status.as_u16(),
        url,
        message,
    })
}

fn not_found(id: &str) -> Error {
    Error::ItemNotFound { id: id.to_string() }
}

impl ArticleApi for QiitaClient {
    async fn authenticated_user(&self) -> Result<String> {
        let url = self.url("/authenticated_user");
        let response = ensure_success(self.send(|c| c.get(&url)).await?).await?;
        let user: AuthenticatedUser = response.json().await?;
        Ok(user.id)
    }

    async fn list_page(&self, page: u32, per_page: u32) -> Result<Vec<RemoteItem>> {
        let url = self.url("/authenticated_user/items");
        let query = [("page", page), ("per_page", per_page)];
        let response = ensure_success(self.send(|c| c.get(&url).query(&query)).await?).await?;
        let items: Option<Vec<RemoteItem>> = response.json().await?;
        Ok(items.unwrap_or_default())
    }

    async fn get_item(&self, id: &str) -> Result<Option<RemoteItem>> {
        let url = self.url(&format!("/items/{id}"));
        let response = self.send(|c| c.get(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(id, "Item not found");
            return Ok(None);
        }
        let item = ensure_success(response).await?.json().await?;
        Ok(Some(item))
    }

    async fn create_item(&self, payload: &ItemPayload) -> Result<RemoteItem> {
        let url = self.url("/items");
        let response = ensure_success(self.send(|c| c.post(&url).json(payload)).await?).await?;
        Ok(response.json().await?)
    }

    async fn update_item(&self, id: &str, payload: &ItemPayload) -> Result<RemoteItem> {
        let url = self.url(&format!("/items/{id}"));
        let response = self.send(|c| c.patch(&url).json(payload)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(not_found(id));
        }
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("/items/{id}"));
        let response = self.send(|c| c.delete(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(not_found(id));
        }
        ensure_success(response).await?;
        Ok(())
    }
}
