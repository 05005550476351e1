use std::path::PathBuf;
use thiserror::Error;

/// Transport-level failure while retrieving a document.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response from {url} is not valid UTF-8")]
    Decode { url: String },

    #[error("response from {url} is not valid JSON: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a single theater's collection.
///
/// Rows and tables that an adapter is allowed to skip never surface here,
/// they are only logged.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{cinema}: cannot parse showtime {raw:?}")]
    Showtime { cinema: String, raw: String },

    #[error("{cinema}: unexpected feed layout: {source}")]
    Feed {
        cinema: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid selector {0:?}")]
    Selector(String),

    #[error("cannot resolve link {href:?} against {base}")]
    Link { base: String, href: String },

    #[error("cannot render report: {0}")]
    Render(#[from] askama::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no theaters configured")]
    Empty,
}
