use std::time::Duration;

use crate::error::{Result, StoriesError};
use crate::models::Feed;

pub const DEFAULT_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";
pub const DEFAULT_USER_AGENT: &str = concat!("quiet_hn/", env!("CARGO_PKG_VERSION"));

/// How the cached story list gets refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// Readers refresh synchronously once the entry has expired.
    #[default]
    OnRead,
    /// A background thread refreshes on a fixed tick; readers never wait on upstream.
    Background,
}

/// What to do when the ranked list runs out before enough stories qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortfallPolicy {
    /// Return the stories found so far.
    #[default]
    Partial,
    /// Fail with `InsufficientStories`.
    Fail,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub num_stories: usize,
    pub cache_duration: Duration,
    pub refresh_interval: Duration,
    pub refresh_mode: RefreshMode,
    pub shortfall: ShortfallPolicy,
    pub feed: Feed,
    pub api_base: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_stories: 30,
            cache_duration: Duration::from_secs(1),
            refresh_interval: Duration::from_millis(800),
            refresh_mode: RefreshMode::OnRead,
            shortfall: ShortfallPolicy::Partial,
            feed: Feed::Top,
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.num_stories == 0 {
            return Err(invalid("num_stories must be positive"));
        }
        if self.request_timeout.is_zero() {
            return Err(invalid("request_timeout must be non-zero"));
        }
        if self.api_base.trim().is_empty() {
            return Err(invalid("api_base must not be empty"));
        }
        if self.refresh_mode == RefreshMode::Background {
            if self.refresh_interval.is_zero() {
                return Err(invalid("refresh_interval must be non-zero"));
            }
            if self.refresh_interval >= self.cache_duration {
                return Err(invalid(format!(
                    "refresh_interval ({:?}) must be shorter than cache_duration ({:?})",
                    self.refresh_interval, self.cache_duration
                )));
            }
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> StoriesError {
    StoriesError::InvalidConfig(msg.into())
}
