use reqwest::{RequestBuilder, Response};
use serde::{
    de::{DeserializeOwned, IgnoredAny},
    Deserialize, Deserializer,
};
use tracing::warn;

use crate::{
    article::Article,
    error::{FetchError, Result},
};

/// Body of `GET /api/key`.
#[derive(Deserialize)]
pub struct ApiKeyResponse {
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

/// Body of the article search endpoint; only the documents are kept.
#[derive(Deserialize)]
pub struct SearchResponse {
    pub response: SearchDocs,
}

#[derive(Deserialize)]
pub struct SearchDocs {
    #[serde(default, deserialize_with = "readable_docs")]
    pub docs: Vec<Article>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Doc {
    Article(Article),
    Unreadable(IgnoredAny),
}

/// Drops documents that are not articles instead of failing the whole page.
fn readable_docs<'de, D>(deserializer: D) -> Result<Vec<Article>, D::Error>
where
    D: Deserializer<'de>,
{
    let docs = Option::<Vec<Doc>>::deserialize(deserializer)?.unwrap_or_default();
    let total = docs.len();
    let articles: Vec<Article> = docs
        .into_iter()
        .filter_map(|doc| match doc {
            Doc::Article(article) => Some(article),
            Doc::Unreadable(_) => None,
        })
        .collect();

    if articles.len() < total {
        warn!(skipped = total - articles.len(), "ignored unreadable search documents");
    }
    Ok(articles)
}

/// Body of `GET /me`. The backend answers `{"email": null}` with a 401.
#[derive(Deserialize)]
pub struct MeResponse {
    pub email: Option<String>,
}

/// Body of the comment create and delete endpoints.
#[derive(Deserialize, Debug)]
pub struct MessageResponse {
    pub message: Option<String>,
}

/// Sends `request` and fails on transport errors or a non-success status.
pub(crate) async fn send(request: RequestBuilder, url: &str) -> Result<Response> {
    let response = request.send().await.map_err(|source| FetchError::Transport {
        url: url.to_owned(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_owned(),
            status,
        });
    }

    Ok(response)
}

/// Like [`send`], then decodes the JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> Result<T> {
    send(request, url)
        .await?
        .json()
        .await
        .map_err(|source| FetchError::Malformed {
            url: url.to_owned(),
            source,
        })
}
