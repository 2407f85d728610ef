use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::{Config, RefreshMode};
use crate::error::{Result, StoriesError};
use crate::hn_client::HackerNewsClient;
use crate::models::DisplayStory;
use crate::resolver::Resolver;

/// One resolved story list and when it stops being fresh.
///
/// Entries are never edited; a refresh swaps in a whole new one.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    stories: Arc<[DisplayStory]>,
    num_stories: usize,
    fetched_at: Instant,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(stories: Vec<DisplayStory>, num_stories: usize, ttl: Duration) -> Self {
        let fetched_at = Instant::now();
        Self {
            stories: stories.into(),
            num_stories,
            fetched_at,
            expires_at: fetched_at + ttl,
        }
    }

    fn is_fresh_for(&self, num_stories: usize, now: Instant) -> bool {
        self.num_stories == num_stories && now < self.expires_at
    }

    pub fn stories(&self) -> &Arc<[DisplayStory]> {
        &self.stories
    }

    /// The count this entry was resolved for; it may hold fewer.
    pub fn num_stories(&self) -> usize {
        self.num_stories
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

struct Shared {
    resolver: Resolver,
    entry: Mutex<Option<CacheEntry>>,
    // Serializes resolutions so concurrent misses don't all hit upstream
    refresh_lock: Mutex<()>,
}

/// Time-bounded cache in front of the resolver.
///
/// Cloning is cheap; clones share the same entry.
#[derive(Clone)]
pub struct StoryCache {
    shared: Arc<Shared>,
    mode: RefreshMode,
    num_stories: usize,
    cache_duration: Duration,
    refresh_interval: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Entries are swapped whole, so a panic elsewhere can't leave one half-written
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StoryCache {
    pub fn new(resolver: Resolver, config: &Config) -> Self {
        Self {
            shared: Arc::new(Shared {
                resolver,
                entry: Mutex::new(None),
                refresh_lock: Mutex::new(()),
            }),
            mode: config.refresh_mode,
            num_stories: config.num_stories,
            cache_duration: config.cache_duration,
            refresh_interval: config.refresh_interval,
        }
    }

    /// Validate `config` and wire up a cache backed by the live API.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = HackerNewsClient::new(config).map_err(StoriesError::UpstreamUnavailable)?;
        let resolver = Resolver::new(Arc::new(client), config.shortfall);
        Ok(Self::new(resolver, config))
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    /// Stories for the configured count.
    pub fn top_stories(&self) -> Result<Arc<[DisplayStory]>> {
        self.get_stories(self.num_stories)
    }

    /// The top `num_stories` stories, from cache when possible.
    ///
    /// In `OnRead` mode an expired entry (or one resolved for another count)
    /// is refreshed before returning; if that fails the error is returned and
    /// the old entry stays in place.
    ///
    /// In `Background` mode the last resolved entry is returned whatever its
    /// age, cut down to `num_stories` if it holds more. Upstream is only
    /// contacted here when there is no entry yet.
    pub fn get_stories(&self, num_stories: usize) -> Result<Arc<[DisplayStory]>> {
        if num_stories == 0 {
            return Err(StoriesError::InvalidConfig(
                "story count must be positive".into(),
            ));
        }

        match self.mode {
            RefreshMode::OnRead => {
                if let Some(stories) = self.fresh(num_stories) {
                    debug!("Story cache hit for {} stories", num_stories);
                    return Ok(stories);
                }
                self.refresh_unless(num_stories, |entry| {
                    entry.is_fresh_for(num_stories, Instant::now())
                })
            }
            RefreshMode::Background => {
                let stories = match self.snapshot() {
                    Some(entry) => entry.stories,
                    None => self.refresh_unless(self.num_stories, |_| true)?,
                };
                Ok(take_prefix(stories, num_stories))
            }
        }
    }

    /// The current entry, without touching upstream.
    pub fn snapshot(&self) -> Option<CacheEntry> {
        lock(&self.shared.entry).clone()
    }

    /// Drop the current entry so the next read resolves again.
    pub fn invalidate(&self) {
        lock(&self.shared.entry).take();
    }

    /// Resolve unconditionally and publish the result.
    pub fn refresh(&self) -> Result<Arc<[DisplayStory]>> {
        self.refresh_unless(self.num_stories, |_| false)
    }

    /// Spawn the background refresher. It resolves right away and then on
    /// every `refresh_interval` tick until the handle is stopped or dropped.
    /// A failed refresh leaves the previous entry in place.
    pub fn start_refresher(&self) -> RefreshHandle {
        let cache = self.clone();
        let interval = self.refresh_interval;
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            info!("Story refresher started, interval {:?}", interval);
            loop {
                match cache.refresh() {
                    Ok(stories) => debug!("Background refresh published {} stories", stories.len()),
                    Err(e) => warn!("Background refresh failed, keeping last entry: {}", e),
                }
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            info!("Story refresher stopped");
        });

        RefreshHandle {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    fn fresh(&self, num_stories: usize) -> Option<Arc<[DisplayStory]>> {
        let entry = lock(&self.shared.entry);
        entry
            .as_ref()
            .filter(|e| e.is_fresh_for(num_stories, Instant::now()))
            .map(|e| e.stories.clone())
    }

    /// Resolve `num_stories` and swap the entry in, unless `satisfied` accepts
    /// the entry present once the refresh lock is held. The entry lock is
    /// never held while talking to upstream.
    fn refresh_unless(
        &self,
        num_stories: usize,
        satisfied: impl Fn(&CacheEntry) -> bool,
    ) -> Result<Arc<[DisplayStory]>> {
        let _refreshing = lock(&self.shared.refresh_lock);

        if let Some(entry) = lock(&self.shared.entry).as_ref().filter(|e| satisfied(*e)) {
            return Ok(entry.stories.clone());
        }

        let stories = self.shared.resolver.resolve(num_stories)?;
        let entry = CacheEntry::new(stories, num_stories, self.cache_duration);
        let stories = entry.stories.clone();
        *lock(&self.shared.entry) = Some(entry);

        info!("Story cache refreshed with {} stories", stories.len());
        Ok(stories)
    }
}

fn take_prefix(stories: Arc<[DisplayStory]>, n: usize) -> Arc<[DisplayStory]> {
    if stories.len() <= n {
        stories
    } else {
        stories[..n].into()
    }
}

/// Keeps the background refresher alive; stopping or dropping it ends the thread.
pub struct RefreshHandle {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Signal the refresher and wait for it to finish its current refresh.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Story refresher panicked");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
