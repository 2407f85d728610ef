//! Fetch the Hacker News front page, keep only linked stories, and cache the
//! result for a short while.
//!
//! The entry point is [`StoryCache::get_stories`]:
//!
//! ```no_run
//! use quiet_hn::{Config, StoryCache};
//!
//! let cache = StoryCache::from_config(&Config::default())?;
//! for story in cache.get_stories(30)?.iter() {
//!     println!("{} ({})", story.title(), story.host);
//! }
//! # Ok::<(), quiet_hn::StoriesError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod hn_client;
pub mod models;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use cache::{CacheEntry, RefreshHandle, StoryCache};
pub use config::{Config, RefreshMode, ShortfallPolicy};
pub use error::{SourceError, StoriesError};
pub use hn_client::{HackerNewsClient, ItemSource};
pub use models::{DisplayStory, Feed, ItemType, RawItem};
pub use resolver::{ResolveStats, Resolver};
