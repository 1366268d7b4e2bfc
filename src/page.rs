use askama::Template;
use tracing::{info, instrument, warn};

use crate::{
    article::{Article, ArticleCard},
    backend::Backend,
    comment::format_comment_count,
    config::PageConfig,
    date,
    search::SearchClient,
    surface::{LOGIN_PATH, LOGOUT_PATH},
};

#[derive(Clone, Debug, Template)]
#[template(path = "front.html")]
pub struct FrontPage {
    pub title: String,
    pub date: String,
    pub cards: Vec<ArticleCard>,
    /// Signed-in email; comment controls are only offered when set.
    pub user: Option<String>,
    pub login_path: &'static str,
    pub logout_path: &'static str,
}

/// Runs the search the page opens with. A failed search is logged and
/// leaves the page without articles.
#[instrument(skip(search, backend, api_key))]
pub async fn load_articles(
    search: &SearchClient,
    backend: &Backend,
    api_key: Option<&str>,
    query: &str,
) -> Vec<Article> {
    let fetched;
    let api_key = match api_key {
        Some(key) => Some(key),
        None => {
            fetched = backend.api_key().await;
            match &fetched {
                Ok(key) => Some(key.as_str()),
                Err(err) => {
                    warn!(error = %err, "no API key, searching without one");
                    None
                }
            }
        }
    };

    match search.search(query, api_key).await {
        Ok(articles) => articles,
        Err(err) => {
            warn!(error = %err, "no articles available");
            Vec::new()
        }
    }
}

impl FrontPage {
    /// Everything the page shows on load: date header, article cards with
    /// their comment counts, and the session.
    pub async fn load(
        config: &PageConfig,
        search: &SearchClient,
        backend: &Backend,
        api_key: Option<&str>,
    ) -> Self {
        let articles = load_articles(search, backend, api_key, &config.query).await;

        let mut cards = Vec::with_capacity(articles.len());
        for article in &articles {
            let count = backend.list_comments(&article.headline.main).await.len();
            cards.push(ArticleCard::new(
                article,
                format_comment_count(u64::try_from(count).ok()),
            ));
        }

        let user = backend.current_user().await;
        info!(articles = cards.len(), signed_in = user.is_some(), "front page loaded");

        FrontPage {
            title: config.title.clone(),
            date: date::today(),
            cards,
            user,
            login_path: LOGIN_PATH,
            logout_path: LOGOUT_PATH,
        }
    }
}
