use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Type tag of an upstream item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Story,
    Comment,
    Job,
    Poll,
    PollOpt,
    #[default]
    #[serde(other)]
    Unknown,
}

/// An item record as served by the Hacker News API.
///
/// Every field, `id` included, defaults when upstream omits it; the client
/// rejects records whose `id` doesn't match the one requested.
/// `text` and `url` are never both set.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RawItem {
    pub id: u64,
    pub by: String,
    pub score: i64,
    pub time: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub descendants: i64,
    pub kids: Vec<u64>,
    pub text: Option<String>,
    pub url: Option<String>,
    pub dead: bool,
    pub deleted: bool,
}

impl RawItem {
    /// The external link, if there is a non-empty one.
    pub fn link(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }

    /// Age relative to `now`, worded the way the HN front page shows it.
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        match self.posted_at() {
            Some(posted) => format_time_ago(posted, now),
            None => String::new(),
        }
    }
}

fn format_time_ago(posted: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - posted).num_seconds().max(0);
    let (amount, unit) = match secs {
        0..=59 => return "just now".to_string(),
        60..=3_599 => (secs / 60, "minute"),
        3_600..=86_399 => (secs / 3_600, "hour"),
        _ => (secs / 86_400, "day"),
    };
    if amount == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", amount, unit)
    }
}

/// A qualifying story ready for display: the raw item plus its link host.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayStory {
    pub item: RawItem,
    pub host: String,
}

impl DisplayStory {
    pub fn id(&self) -> u64 {
        self.item.id
    }

    pub fn title(&self) -> &str {
        &self.item.title
    }

    pub fn url(&self) -> &str {
        self.item.link().unwrap_or_default()
    }

    pub fn comments_count(&self) -> i64 {
        self.item.descendants
    }

    /// Link to the discussion page on news.ycombinator.com
    pub fn comments_url(&self) -> String {
        format!("https://news.ycombinator.com/item?id={}", self.item.id)
    }
}

/// Ranked lists exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feed {
    #[default]
    Top,
    New,
    Best,
    Ask,
    Show,
    Job,
}

impl Feed {
    /// Path of the list endpoint, relative to the API base.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Feed::Top => "topstories.json",
            Feed::New => "newstories.json",
            Feed::Best => "beststories.json",
            Feed::Ask => "askstories.json",
            Feed::Show => "showstories.json",
            Feed::Job => "jobstories.json",
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feed::Top => "top",
            Feed::New => "new",
            Feed::Best => "best",
            Feed::Ask => "ask",
            Feed::Show => "show",
            Feed::Job => "job",
        };
        f.write_str(name)
    }
}

impl FromStr for Feed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" | "hot" => Ok(Feed::Top),
            "new" | "newest" => Ok(Feed::New),
            "best" => Ok(Feed::Best),
            "ask" => Ok(Feed::Ask),
            "show" => Ok(Feed::Show),
            "job" | "jobs" => Ok(Feed::Job),
            other => Err(format!("unknown feed '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_story_with_missing_fields() {
        let item: RawItem = serde_json::from_str(
            r#"{"id": 8863, "by": "dhouston", "score": 111, "time": 1175714200,
                "title": "My YC app: Dropbox", "type": "story",
                "url": "http://www.getdropbox.com/u/2/screencast.html"}"#,
        )
        .unwrap();

        assert_eq!(item.id, 8863);
        assert_eq!(item.kind, ItemType::Story);
        assert_eq!(item.kids, Vec::<u64>::new());
        assert_eq!(item.descendants, 0);
        assert_eq!(item.text, None);
        assert_eq!(
            item.link(),
            Some("http://www.getdropbox.com/u/2/screencast.html")
        );
    }

    #[test]
    fn unknown_type_tag_is_not_an_error() {
        let item: RawItem = serde_json::from_str(r#"{"id": 1, "type": "banner"}"#).unwrap();
        assert_eq!(item.kind, ItemType::Unknown);

        let item: RawItem = serde_json::from_str(r#"{"id": 2, "type": "pollopt"}"#).unwrap();
        assert_eq!(item.kind, ItemType::PollOpt);
    }

    #[test]
    fn empty_url_is_no_link() {
        let item = RawItem {
            url: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(item.link(), None);
    }

    #[test]
    fn time_ago_wording() {
        let now = DateTime::from_timestamp(1_000_000, 0).unwrap();
        let at = |secs_before: i64| RawItem {
            time: 1_000_000 - secs_before,
            ..Default::default()
        };

        assert_eq!(at(5).time_ago(now), "just now");
        assert_eq!(at(60).time_ago(now), "1 minute ago");
        assert_eq!(at(3 * 3_600 + 10).time_ago(now), "3 hours ago");
        assert_eq!(at(2 * 86_400).time_ago(now), "2 days ago");
    }

    #[test]
    fn display_story_accessors() {
        let story = DisplayStory {
            item: RawItem {
                id: 8863,
                title: "My YC app: Dropbox".into(),
                descendants: 71,
                url: Some("http://www.getdropbox.com/u/2/screencast.html".into()),
                ..Default::default()
            },
            host: "getdropbox.com".into(),
        };

        assert_eq!(story.id(), 8863);
        assert_eq!(story.comments_count(), 71);
        assert_eq!(story.comments_url(), "https://news.ycombinator.com/item?id=8863");
    }

    #[test]
    fn feed_names_round_trip_through_from_str() {
        for feed in [Feed::Top, Feed::New, Feed::Best, Feed::Ask, Feed::Show, Feed::Job] {
            assert_eq!(feed.to_string().parse::<Feed>(), Ok(feed));
        }
        assert_eq!("hot".parse::<Feed>(), Ok(Feed::Top));
        assert!("frontpage".parse::<Feed>().is_err());
    }
}
