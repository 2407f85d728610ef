use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::SourceError;
use crate::models::{Feed, RawItem};

/// Read access to the upstream item API.
///
/// Implementations are called from many threads at once and must not keep
/// per-call state.
pub trait ItemSource: Send + Sync {
    /// Current ranked ID list, best first.
    fn top_ids(&self) -> Result<Vec<u64>, SourceError>;

    fn item(&self, id: u64) -> Result<RawItem, SourceError>;
}

/// Blocking client for the Hacker News Firebase API.
pub struct HackerNewsClient {
    client: Client,
    api_base: String,
    feed: Feed,
}

impl HackerNewsClient {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            feed: config.feed,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let url = format!("{}/{}", self.api_base, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send()?.error_for_status()?;
        let body = response.bytes()?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl ItemSource for HackerNewsClient {
    fn top_ids(&self) -> Result<Vec<u64>, SourceError> {
        self.get_json(self.feed.endpoint())
    }

    fn item(&self, id: u64) -> Result<RawItem, SourceError> {
        // Deleted or unknown items come back as a literal `null`
        let item = self
            .get_json::<Option<RawItem>>(&format!("item/{}.json", id))?
            .ok_or(SourceError::MissingItem(id))?;

        if item.id != id {
            return Err(SourceError::Decode(serde::de::Error::custom(format!(
                "requested item {} but got id {}",
                id, item.id
            ))));
        }
        Ok(item)
    }
}
