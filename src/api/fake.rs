//! In-memory `ArticleApi` for engine tests.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::sync::Mutex;

use super::ArticleApi;
use crate::error::{Error, Result};
use crate::model::{ItemPayload, RemoteItem, TagSet};

#[derive(Default)]
struct State {
    items: Vec<RemoteItem>,
    calls: Vec<String>,
    created: u32,
}

pub struct FakeApi {
    user: String,
    /// Timestamp stamped on created and updated items.
    pub now: DateTime<FixedOffset>,
    state: Mutex<State>,
}

impl FakeApi {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            now: Utc
                .with_ymd_and_hms(2030, 1, 1, 0, 0, 0)
                .unwrap()
                .fixed_offset(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn insert_item(&self, id: &str, title: &str, body: &str) {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        self.insert_item_at(id, title, "test", body, at);
    }

    pub fn insert_item_at(&self, id: &str, title: &str, tags: &str, body: &str, at: DateTime<Utc>) {
        let item = RemoteItem {
            id: id.to_string(),
            title: title.to_string(),
            tags: TagSet::parse(tags),
            body: body.to_string(),
            private: false,
            updated_at: at.fixed_offset(),
            created_at: at.fixed_offset(),
        };
        let mut state = self.state.lock().unwrap();
        state.items.retain(|i| i.id != id);
        state.items.push(item);
    }

    pub fn item(&self, id: &str) -> Option<RemoteItem> {
        self.state.lock().unwrap().items.iter().find(|i| i.id == id).cloned()
    }

    pub fn item_count(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than listing and lookups.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list") && !c.starts_with("get") && c != "user")
            .collect()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl ArticleApi for FakeApi {
    async fn authenticated_user(&self) -> Result<String> {
        self.record("user".to_string());
        Ok(self.user.clone())
    }

    async fn list_page(&self, page: u32, per_page: u32) -> Result<Vec<RemoteItem>> {
        self.record(format!("list {page}"));
        let state = self.state.lock().unwrap();
        let start = ((page - 1) * per_page) as usize;
        Ok(state
            .items
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn get_item(&self, id: &str) -> Result<Option<RemoteItem>> {
        self.record(format!("get {id}"));
        Ok(self.item(id))
    }

    async fn create_item(&self, payload: &ItemPayload) -> Result<RemoteItem> {
        self.record("create".to_string());
        let mut state = self.state.lock().unwrap();
        state.created += 1;
        let item = RemoteItem {
            id: format!("new{}", state.created),
            title: payload.title.clone(),
            tags: payload.tags.clone(),
            body: payload.body.clone(),
            private: payload.private,
            updated_at: self.now,
            created_at: self.now,
        };
        state.items.push(item.clone());
        Ok(item)
    }

    async fn update_item(&self, id: &str, payload: &ItemPayload) -> Result<RemoteItem> {
        self.record(format!("update {id}"));
        let mut state = self.state.lock().unwrap();
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::ItemNotFound { id: id.to_string() })?;
        item.title.clone_from(&payload.title);
        item.tags = payload.tags.clone();
        item.body.clone_from(&payload.body);
        item.private = payload.private;
        item.updated_at = self.now;
        Ok(item.clone())
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        self.record(format!("delete {id}"));
        let mut state = self.state.lock().unwrap();
        let before = state.items.len();
        state.items.retain(|i| i.id != id);
        if state.items.len() == before {
            return Err(Error::ItemNotFound { id: id.to_string() });
        }
        Ok(())
    }
}
