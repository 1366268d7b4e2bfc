use reqwest::Client;
use tracing::{debug, instrument};

use crate::{
    article::Article,
    config::ClientConfig,
    error::Result,
    request::{fetch_json, SearchResponse},
};

/// Client for the remote article search API.
#[derive(Clone, Debug)]
pub struct SearchClient {
    http: Client,
    url: String,
}

impl SearchClient {
    pub fn new(http: Client, config: &ClientConfig) -> Self {
        Self {
            http,
            url: config.search_url.clone(),
        }
    }

    /// Documents matching `query`, in the order the API ranks them.
    #[instrument(skip(self, api_key))]
    pub async fn search(&self, query: &str, api_key: Option<&str>) -> Result<Vec<Article>> {
        let mut request = self.http.get(&self.url).query(&[("q", query)]);
        if let Some(key) = api_key {
            request = request.query(&[("api-key", key)]);
        }

        let body: SearchResponse = fetch_json(request, &self.url).await?;
        debug!(count = body.response.docs.len(), "search finished");
        Ok(body.response.docs)
    }
}
