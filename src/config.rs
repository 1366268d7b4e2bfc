use std::{path::Path, time::Duration};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "newsdesk.toml";

const DEFAULT_ORIGIN: &str = "http://localhost:8000";
const DEFAULT_SEARCH_URL: &str = "https://api.nytimes.com/svc/search/v2/articlesearch.json";

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub page: PageConfig,
}

impl Config {
    /// `path` (if it exists) overlaid by `NEWSDESK_SECTION__KEY` variables.
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("NEWSDESK_").split("__"))
    }

    pub fn load(path: &Path) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the backend serving `/api/key`, `/me` and the comments.
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Cookie header value sent on credentialed requests.
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default = "default_search_url")]
    pub search_url: String,
    /// Search API key. Fetched from the backend when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Requests wait indefinitely unless this is set.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            session: None,
            search_url: default_search_url(),
            api_key: None,
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// The HTTP client shared by the backend and search clients.
    pub fn http(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().map_err(FetchError::Client)
    }
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_owned()
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_owned()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PageConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Search run when the front page loads.
    #[serde(default = "default_query")]
    pub query: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            query: default_query(),
        }
    }
}

fn default_title() -> String {
    "Daily News".to_owned()
}

fn default_query() -> String {
    "Sacramento".to_owned()
}
