//! In-memory `ItemSource` for exercising the resolver and cache without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::error::SourceError;
use crate::hn_client::ItemSource;
use crate::models::{ItemType, RawItem};

type DelayFn = Box<dyn Fn(u64) -> Duration + Send + Sync>;

#[derive(Clone, Copy)]
enum Failure {
    Missing,
    Transport,
}

pub struct FakeSource {
    ids: Vec<u64>,
    overrides: HashMap<u64, RawItem>,
    failing: HashMap<u64, Failure>,
    delay: Option<DelayFn>,
    list_fails: AtomicBool,
    list_calls: AtomicUsize,
    item_calls: AtomicUsize,
}

impl FakeSource {
    /// Every ID is a linked story unless overridden.
    pub fn stories(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            overrides: HashMap::new(),
            failing: HashMap::new(),
            delay: None,
            list_fails: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            item_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_comment(mut self, id: u64) -> Self {
        let item = RawItem {
            id,
            kind: ItemType::Comment,
            text: Some("first!".into()),
            ..Default::default()
        };
        self.overrides.insert(id, item);
        self
    }

    pub fn with_text_post(mut self, id: u64) -> Self {
        let item = RawItem {
            id,
            kind: ItemType::Story,
            title: format!("Ask HN: question {}", id),
            text: Some("What do you think?".into()),
            ..Default::default()
        };
        self.overrides.insert(id, item);
        self
    }

    /// Upstream answers `null` for this item.
    pub fn with_missing(mut self, id: u64) -> Self {
        self.failing.insert(id, Failure::Missing);
        self
    }

    /// Fetching this item fails at the HTTP layer.
    pub fn with_transport_failure(mut self, id: u64) -> Self {
        self.failing.insert(id, Failure::Transport);
        self
    }

    pub fn with_delay_fn(mut self, delay: impl Fn(u64) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn fail_list(&self, fail: bool) {
        self.list_fails.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }

    fn story(&self, id: u64) -> RawItem {
        RawItem {
            id,
            by: "pg".into(),
            score: 100,
            time: 1_700_000_000,
            title: format!("Story {} (list #{})", id, self.list_calls()),
            kind: ItemType::Story,
            descendants: 3,
            kids: vec![id * 1000 + 1],
            url: Some(format!("https://www.site{}.example/post", id)),
            ..Default::default()
        }
    }
}

impl ItemSource for FakeSource {
    fn top_ids(&self) -> Result<Vec<u64>, SourceError> {
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(SourceError::Decode(
                serde_json::from_str::<Vec<u64>>("<html>").unwrap_err(),
            ));
        }
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ids.clone())
    }

    fn item(&self, id: u64) -> Result<RawItem, SourceError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = &self.delay {
            thread::sleep(delay(id));
        }
        match self.failing.get(&id) {
            Some(Failure::Missing) => return Err(SourceError::MissingItem(id)),
            Some(Failure::Transport) => return Err(transport_error()),
            None => {}
        }
        Ok(self
            .overrides
            .get(&id)
            .cloned()
            .unwrap_or_else(|| self.story(id)))
    }
}

/// A genuine `reqwest::Error`, produced without touching the network.
fn transport_error() -> SourceError {
    let err = reqwest::blocking::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();
    SourceError::Transport(err)
}
