use thiserror::Error;

/// Failures talking to the upstream item API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network failure or non-success HTTP status
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Body was not the JSON we expected
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Upstream answered `null` for this item (deleted or never existed)
    #[error("item {0} not found upstream")]
    MissingItem(u64),
}

/// Errors surfaced to consumers of the story cache and resolver.
#[derive(Debug, Error)]
pub enum StoriesError {
    #[error("failed to load top stories: {0}")]
    UpstreamUnavailable(#[source] SourceError),

    #[error("only {found} of {wanted} stories available")]
    InsufficientStories { wanted: usize, found: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = StoriesError> = std::result::Result<T, E>;
