//! Qiita REST API collaborator.
//!
//! [`ArticleApi`] is the seam the sync engine talks to; [`QiitaClient`] is
//! the HTTP implementation.

mod client;
#[cfg(test)]
pub(crate) mod fake;

pub use client::{QiitaClient, RetryPolicy};

use std::future::Future;
use tracing::debug;

use crate::error::Result;
use crate::model::{ItemPayload, RemoteItem};

/// Default Qiita API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://qiita.com/api/v2";

/// Items requested per page when listing.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Operations on the authenticated user's Qiita items.
///
/// Requests are issued one at a time; implementations need not support
/// concurrent use.
pub trait ArticleApi: Send + Sync {
    /// Account id of the token owner (`GET /authenticated_user`).
    fn authenticated_user(&self) -> impl Future<Output = Result<String>> + Send;

    /// One page of the owner's items. A `null` page is returned as empty.
    fn list_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<Vec<RemoteItem>>> + Send;

    /// A single item, or `None` if it does not exist.
    fn get_item(&self, id: &str) -> impl Future<Output = Result<Option<RemoteItem>>> + Send;

    /// Create an item. The response carries the assigned id.
    fn create_item(
        &self,
        payload: &ItemPayload,
    ) -> impl Future<Output = Result<RemoteItem>> + Send;

    /// Replace an item. Fails with `ItemNotFound` if it does not exist.
    fn update_item(
        &self,
        id: &str,
        payload: &ItemPayload,
    ) -> impl Future<Output = Result<RemoteItem>> + Send;

    /// Delete an item. Fails with `ItemNotFound` if it does not exist.
    fn delete_item(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Fetch every item, page by page, stopping at the first empty page.
///
/// # Errors
///
/// Returns the first request error.
pub async fn fetch_all_items<A: ArticleApi>(api: &A, per_page: u32) -> Result<Vec<RemoteItem>> {
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let batch = api.list_page(page, per_page).await?;
        debug!(page, count = batch.len(), "Fetched item page");
        if batch.is_empty() {
            break;
        }
        items.extend(batch);
        page += 1;
    }

    Ok(items)
}
