//! Turns the ranked ID list into an ordered list of displayable stories.
//!
//! Items are fetched in windows, one thread per ID. Because some items get
//! filtered out, each window asks for a quarter more IDs than are still
//! missing, and further windows follow until enough stories are in hand or
//! the ranked list runs out.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use log::{debug, error, info, warn};

use crate::config::ShortfallPolicy;
use crate::error::{Result, SourceError, StoriesError};
use crate::filter;
use crate::hn_client::ItemSource;
use crate::models::DisplayStory;

/// Counters for a single resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub windows: usize,
    pub fetched: usize,
    pub failed: usize,
    pub filtered: usize,
}

#[derive(Debug)]
pub struct Resolution {
    pub stories: Vec<DisplayStory>,
    pub stats: ResolveStats,
}

#[derive(Clone)]
pub struct Resolver {
    source: Arc<dyn ItemSource>,
    shortfall: ShortfallPolicy,
}

/// IDs to fetch when `needed` stories are still missing: `ceil(needed * 5 / 4)`.
/// Saturates for huge counts; callers clamp it to the IDs left anyway.
pub fn window_size(needed: usize) -> usize {
    needed.saturating_mul(5).div_ceil(4)
}

impl Resolver {
    pub fn new(source: Arc<dyn ItemSource>, shortfall: ShortfallPolicy) -> Self {
        Self { source, shortfall }
    }

    pub fn resolve(&self, num_stories: usize) -> Result<Vec<DisplayStory>> {
        self.resolve_with_stats(num_stories).map(|r| r.stories)
    }

    pub fn resolve_with_stats(&self, num_stories: usize) -> Result<Resolution> {
        if num_stories == 0 {
            return Err(StoriesError::InvalidConfig(
                "story count must be positive".into(),
            ));
        }

        let ids = self.source.top_ids().map_err(|e| {
            error!("Failed to load ranked story IDs: {}", e);
            StoriesError::UpstreamUnavailable(e)
        })?;

        let mut stories = Vec::with_capacity(num_stories.min(ids.len()));
        let mut stats = ResolveStats::default();
        let mut at = 0;

        while stories.len() < num_stories && at < ids.len() {
            let window = window_size(num_stories - stories.len()).min(ids.len() - at);
            let batch = &ids[at..at + window];
            stories.extend(self.fetch_window(batch, &mut stats));
            stats.windows += 1;
            at += window;
        }
        stories.truncate(num_stories);

        info!(
            "Resolved {}/{} stories from {} of {} IDs ({} windows, {} failed, {} filtered)",
            stories.len(),
            num_stories,
            stats.fetched,
            ids.len(),
            stats.windows,
            stats.failed,
            stats.filtered
        );

        if stories.len() < num_stories {
            warn!(
                "Ranked list exhausted with only {} of {} stories",
                stories.len(),
                num_stories
            );
            if self.shortfall == ShortfallPolicy::Fail {
                return Err(StoriesError::InsufficientStories {
                    wanted: num_stories,
                    found: stories.len(),
                });
            }
        }

        Ok(Resolution { stories, stats })
    }

    /// Fetch every ID in `ids` concurrently and return the qualifying stories
    /// in the order of `ids`. Per-item failures are logged and dropped.
    fn fetch_window(&self, ids: &[u64], stats: &mut ResolveStats) -> Vec<DisplayStory> {
        type Outcome = (usize, u64, std::result::Result<Option<DisplayStory>, SourceError>);

        let source = &*self.source;
        let (tx, rx) = mpsc::sync_channel::<Outcome>(ids.len());

        let mut results: Vec<Outcome> = thread::scope(|scope| {
            for (idx, &id) in ids.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move || {
                    let outcome = source.item(id).map(filter::qualify);
                    let _ = tx.send((idx, id, outcome));
                });
            }
            drop(tx);

            // One message per spawned fetch; recv only fails if a fetch thread died
            (0..ids.len()).map_while(|_| rx.recv().ok()).collect()
        });

        results.sort_by_key(|(idx, _, _)| *idx);
        stats.fetched += ids.len();

        let mut stories = Vec::with_capacity(results.len());
        for (_, id, outcome) in results {
            match outcome {
                Ok(Some(story)) => stories.push(story),
                Ok(None) => {
                    debug!("Item {} is not a linked story, skipping", id);
                    stats.filtered += 1;
                }
                Err(e) => {
                    warn!("Dropping item {}: {}", id, e);
                    stats.failed += 1;
                }
            }
        }
        stories
    }
}
