use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::info;

use quiet_hn::config::DEFAULT_API_BASE;
use quiet_hn::{Config, DisplayStory, Feed, RefreshMode, ShortfallPolicy, StoryCache};

/// Print the current Hacker News front page, links only.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of stories to show
    #[arg(long, default_value_t = 30)]
    stories: usize,

    /// Which list to read: top, new, best, ask, show or job
    #[arg(long, default_value_t = Feed::Top)]
    feed: Feed,

    /// How long a fetched list stays fresh
    #[arg(long, default_value_t = 1)]
    cache_secs: u64,

    /// Background refresh tick, used with --background
    #[arg(long, default_value_t = 800)]
    refresh_ms: u64,

    /// Refresh from a background thread instead of on read
    #[arg(long)]
    background: bool,

    /// Fail instead of printing a short list when the feed runs out
    #[arg(long)]
    strict: bool,

    /// Reprint every N seconds until interrupted
    #[arg(long, value_name = "SECS")]
    watch: Option<u64>,

    /// Per-request HTTP timeout
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,
}

impl Args {
    fn to_config(&self) -> Config {
        Config {
            num_stories: self.stories,
            cache_duration: Duration::from_secs(self.cache_secs),
            refresh_interval: Duration::from_millis(self.refresh_ms),
            refresh_mode: if self.background {
                RefreshMode::Background
            } else {
                RefreshMode::OnRead
            },
            shortfall: if self.strict {
                ShortfallPolicy::Fail
            } else {
                ShortfallPolicy::Partial
            },
            feed: self.feed,
            api_base: self.api_base.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
            ..Default::default()
        }
    }
}

fn print_stories(stories: &[DisplayStory]) {
    let now = Utc::now();
    for (rank, story) in stories.iter().enumerate() {
        if story.host.is_empty() {
            println!("{:>3}. {}", rank + 1, story.title());
        } else {
            println!("{:>3}. {} ({})", rank + 1, story.title(), story.host);
        }
        println!(
            "     {} points by {} {} | {} comments <{}>",
            story.item.score,
            story.item.by,
            story.item.time_ago(now),
            story.comments_count(),
            story.comments_url()
        );
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.to_config();
    let cache = StoryCache::from_config(&config).context("Failed to set up story cache")?;

    info!("Reading the {} feed, refresh mode {:?}", config.feed, cache.mode());
    let _refresher = (cache.mode() == RefreshMode::Background).then(|| cache.start_refresher());

    loop {
        let start = Instant::now();
        let stories = cache
            .top_stories()
            .with_context(|| format!("Failed to load {} stories", config.feed))?;
        info!("Loaded {} stories in {:?}", stories.len(), start.elapsed());
        if let Some(entry) = cache.snapshot() {
            info!("Cached list is {}s old", entry.age().as_secs());
        }

        print_stories(&stories);

        match args.watch {
            Some(secs) => {
                thread::sleep(Duration::from_secs(secs));
                println!();
            }
            None => break,
        }
    }

    Ok(())
}
