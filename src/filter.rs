//! Decides which items make it onto the page and derives their display host.

use url::Url;

use crate::models::{DisplayStory, ItemType, RawItem};

/// A story with an external link. Text posts, jobs and comments don't count.
pub fn is_qualifying_story(item: &RawItem) -> bool {
    item.kind == ItemType::Story && item.link().is_some()
}

/// Attach the link host. A link that doesn't parse just leaves the host empty.
pub fn to_display_story(item: RawItem) -> DisplayStory {
    let host = item.link().map(host_of).unwrap_or_default();
    DisplayStory { item, host }
}

pub fn qualify(item: RawItem) -> Option<DisplayStory> {
    is_qualifying_story(&item).then(|| to_display_story(item))
}

fn host_of(link: &str) -> String {
    let Ok(url) = Url::parse(link) else {
        return String::new();
    };
    let host = url.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}
