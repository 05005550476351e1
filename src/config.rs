//! Theater configuration, loaded once and handed to the pipeline.
//!
//! ```toml
//! timeout_secs = 20
//!
//! [[theater]]
//! name = "Kino am Markt"
//! kind = "table-week"
//! url = "https://kino-am-markt.example/programm"
//! ```

use crate::error::ConfigError;
use crate::flat_list::FlatListAdapter;
use crate::json_feed_a::JsonFeedAAdapter;
use crate::json_feed_b::JsonFeedBAdapter;
use crate::paginated_list::PaginatedListAdapter;
use crate::table_week::TableWeekAdapter;
use crate::SiteAdapter;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(rename = "theater", default)]
    theaters: Vec<TheaterConfig>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TheaterConfig {
    pub name: String,
    #[serde(flatten)]
    pub source: Source,
}

/// The site families an adapter exists for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Source {
    TableWeek { url: String },
    FlatList { url: String },
    PaginatedList { url: String },
    JsonFeedA { url: String },
    JsonFeedB { url: String },
}

impl TheaterConfig {
    /// `today` anchors adapters whose pages omit the year.
    pub fn adapter(&self, today: NaiveDate) -> Box<dyn SiteAdapter> {
        let name = self.name.clone();
        match &self.source {
            Source::TableWeek { url } => Box::new(TableWeekAdapter::new(name, url.clone(), today)),
            Source::FlatList { url } => Box::new(FlatListAdapter::new(name, url.clone())),
            Source::PaginatedList { url } => Box::new(PaginatedListAdapter::new(name, url.clone())),
            Source::JsonFeedA { url } => Box::new(JsonFeedAAdapter::new(name, url.clone())),
            Source::JsonFeedB { url } => Box::new(JsonFeedBAdapter::new(name, url.clone())),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        if config.theaters.is_empty() {
            return Err(ConfigError::Empty);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// `<user config dir>/kino-scrape/theaters.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kino-scrape").join("theaters.toml"))
    }

    pub fn theaters(&self) -> &[TheaterConfig] {
        &self.theaters
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn adapters(&self, today: NaiveDate) -> Vec<Box<dyn SiteAdapter>> {
        self.theaters.iter().map(|t| t.adapter(today)).collect()
    }
}
