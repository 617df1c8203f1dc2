//! Qiita wire types.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::tag::TagSet;

/// An item as returned by the Qiita API.
///
/// Only the fields sync needs are kept; the rest of the response is
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub private: bool,
    pub updated_at: DateTime<FixedOffset>,
    pub created_at: DateTime<FixedOffset>,
}

/// Body of `POST /items` and `PATCH /items/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ItemPayload {
    pub body: String,
    pub tags: TagSet,
    pub title: String,
    pub private: bool,
}

/// Response of `GET /authenticated_user`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
}
