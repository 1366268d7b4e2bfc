use reqwest::{header::COOKIE, Client, Method, RequestBuilder};
use tracing::{debug, instrument, warn};

use crate::{
    comment::{Comment, CommentRequest},
    config::ClientConfig,
    error::{FetchError, Result},
    request::{fetch_json, send, ApiKeyResponse, MeResponse, MessageResponse},
};

/// Client for the same-origin backend: key lookup, session check and
/// comments.
///
/// Only [`Backend::api_key`] reports failures. The session and comment calls
/// log what went wrong and fall back to "no user", no comments or `false`, so
/// a broken backend never takes the page down with it.
#[derive(Clone, Debug)]
pub struct Backend {
    http: Client,
    origin: String,
    session: Option<String>,
}

impl Backend {
    pub fn new(http: Client, config: &ClientConfig) -> Self {
        Self {
            http,
            origin: config.origin.trim_end_matches('/').to_owned(),
            session: config.session.clone(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(config.http()?, config))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.origin)
    }

    /// A request carrying the session cookie, if there is one.
    fn credentialed(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.http.request(method, url);
        match &self.session {
            Some(session) => request.header(COOKIE, session),
            None => request,
        }
    }

    #[instrument(skip(self))]
    pub async fn api_key(&self) -> Result<String> {
        let url = self.url("/api/key");
        let body: ApiKeyResponse = fetch_json(self.http.get(&url), &url).await?;
        body.api_key.ok_or(FetchError::MissingField {
            url,
            field: "apiKey",
        })
    }

    /// Email of the signed-in user, or `None` without a valid session.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Option<String> {
        let url = self.url("/me");
        let body: Result<MeResponse> =
            fetch_json(self.credentialed(Method::GET, &url), &url).await;
        match body {
            Ok(MeResponse { email }) => email,
            Err(err) if err.status().is_some() => {
                debug!(error = %err, "not signed in");
                None
            }
            Err(err) => {
                warn!(error = %err, "session check failed");
                None
            }
        }
    }

    async fn try_list_comments(&self, article_title: &str) -> Result<Vec<Comment>> {
        let url = self.url(&format!(
            "/api/comments/{}",
            urlencoding::encode(article_title)
        ));
        fetch_json(self.credentialed(Method::GET, &url), &url).await
    }

    /// Comments on the article with this title, in backend order.
    #[instrument(skip(self))]
    pub async fn list_comments(&self, article_title: &str) -> Vec<Comment> {
        match self.try_list_comments(article_title).await {
            Ok(comments) => {
                debug!(count = comments.len(), "listed comments");
                comments
            }
            Err(err) => {
                warn!(error = %err, "could not list comments");
                Vec::new()
            }
        }
    }

    async fn try_create_comment(&self, request: &CommentRequest) -> Result<()> {
        let url = self.url("/api/comments");
        let response = send(self.credentialed(Method::POST, &url).json(request), &url).await?;
        if let Ok(MessageResponse {
            message: Some(message),
        }) = response.json::<MessageResponse>().await
        {
            debug!(%message, "comment created");
        }
        Ok(())
    }

    /// Adds a comment, optionally as a reply. Returns whether the backend
    /// accepted it.
    #[instrument(skip(self, content))]
    pub async fn create_comment(
        &self,
        article_title: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> bool {
        let request = CommentRequest::new(article_title, content, parent_id);
        match self.try_create_comment(&request).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "could not create comment");
                false
            }
        }
    }

    async fn try_delete_comment(&self, comment_id: &str) -> Result<()> {
        let url = self.url(&format!("/api/comments/{}", urlencoding::encode(comment_id)));
        let response = send(self.credentialed(Method::DELETE, &url), &url).await?;
        if let Ok(MessageResponse {
            message: Some(message),
        }) = response.json::<MessageResponse>().await
        {
            debug!(%message, "comment deleted");
        }
        Ok(())
    }

    /// Returns whether the backend deleted the comment.
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, comment_id: &str) -> bool {
        match self.try_delete_comment(comment_id).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "could not delete comment");
                false
            }
        }
    }

    /// Moderator actions address a comment by article title and author.
    async fn try_moderate(&self, method: Method, article_title: &str, user: &str) -> Result<()> {
        let url = self.url(&format!(
            "/api/comments/{}/{}",
            urlencoding::encode(article_title),
            urlencoding::encode(user)
        ));
        let response = send(self.credentialed(method, &url), &url).await?;
        if let Ok(MessageResponse {
            message: Some(message),
        }) = response.json::<MessageResponse>().await
        {
            debug!(%message, "comment moderated");
        }
        Ok(())
    }

    /// Masks `user`'s comment on the article. Only moderators may do this;
    /// returns whether the backend accepted it.
    #[instrument(skip(self))]
    pub async fn redact_comment(&self, article_title: &str, user: &str) -> bool {
        match self.try_moderate(Method::PATCH, article_title, user).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "could not redact comment");
                false
            }
        }
    }

    /// Replaces `user`'s comment on the article with the removal notice.
    /// Only moderators may do this; returns whether the backend accepted it.
    #[instrument(skip(self))]
    pub async fn remove_comment(&self, article_title: &str, user: &str) -> bool {
        match self.try_moderate(Method::DELETE, article_title, user).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "could not remove comment");
                false
            }
        }
    }

    /// Follows a navigation to `path` with the session cookie, the way a
    /// browser would load the page.
    #[instrument(skip(self))]
    pub async fn visit(&self, path: &str) {
        let url = self.url(path);
        match send(self.credentialed(Method::GET, &url), &url).await {
            Ok(response) => debug!(status = %response.status(), "navigated"),
            Err(err) => warn!(error = %err, "navigation failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn backend(origin: &str, session: Option<&str>) -> Backend {
        let config = ClientConfig {
            origin: origin.to_owned(),
            session: session.map(str::to_owned),
            ..ClientConfig::default()
        };
        Backend::from_config(&config).unwrap()
    }

    /// Nothing listens on port 1, so every request is refused.
    fn unreachable_backend() -> Backend {
        backend("http://127.0.0.1:1", Some("session=abc"))
    }

    #[tokio::test]
    async fn api_key_is_read_from_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "apiKey": "test-key" })))
            .expect(1)
            .mount(&server)
            .await;

        let key = backend(&server.uri(), Some("session=abc")).api_key().await.unwrap();
        assert_eq!(key, "test-key");

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("cookie").is_none());
    }

    #[tokio::test]
    async fn api_key_failures_propagate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "apiKey": null })))
            .mount(&server)
            .await;

        let err = backend(&server.uri(), None).api_key().await.unwrap_err();
        assert!(matches!(err, FetchError::MissingField { field: "apiKey", .. }));

        let err = unreachable_backend().api_key().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn api_key_rejects_error_status_and_bad_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/key"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let err = backend(&server.uri(), None).api_key().await.unwrap_err();
        assert_eq!(err.status().map(|s| s.as_u16()), Some(500));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        let err = backend(&server.uri(), None).api_key().await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[tokio::test]
    async fn current_user_sends_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("cookie", "session=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "a@hw3.com" })))
            .expect(1)
            .mount(&server)
            .await;

        let user = backend(&server.uri(), Some("session=abc")).current_user().await;
        assert_eq!(user.as_deref(), Some("a@hw3.com"));
    }

    #[tokio::test]
    async fn current_user_is_none_without_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "email": null })))
            .mount(&server)
            .await;

        assert_eq!(backend(&server.uri(), None).current_user().await, None);
        assert_eq!(unreachable_backend().current_user().await, None);
    }

    #[tokio::test]
    async fn current_user_is_none_for_null_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": null })))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(backend(&server.uri(), Some("session=abc")).current_user().await, None);
    }

    #[tokio::test]
    async fn current_user_is_none_for_bad_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(backend(&server.uri(), Some("session=abc")).current_user().await, None);
    }

    #[tokio::test]
    async fn list_comments_encodes_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/comments/Test%20Article"))
            .and(header("cookie", "session=abc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "user": "a", "content": "x" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let comments = backend(&server.uri(), Some("session=abc"))
            .list_comments("Test Article")
            .await;
        assert_eq!(
            comments,
            vec![Comment {
                id: None,
                user: "a".to_string(),
                content: "x".to_string(),
                parent_id: None,
            }]
        );
    }

    #[tokio::test]
    async fn list_comments_encodes_reserved_characters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/comments/A%2FB%3F%20%231"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "user": "a", "content": "x" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let comments = backend(&server.uri(), None).list_comments("A/B? #1").await;
        assert_eq!(comments.len(), 1);
    }

    #[tokio::test]
    async fn list_comments_is_empty_for_bad_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/comments/Test%20Article"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "error": "not a list" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        assert!(backend(&server.uri(), None)
            .list_comments("Test Article")
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn list_comments_swallows_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(backend(&server.uri(), None).list_comments("Any").await.is_empty());
        assert!(unreachable_backend().list_comments("Any").await.is_empty());
    }

    #[tokio::test]
    async fn create_comment_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/comments"))
            .and(header("cookie", "session=abc"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "articleTitle": "Test Article",
                "content": "hello",
                "parentId": null,
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "message": "Comment added" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let created = backend(&server.uri(), Some("session=abc"))
            .create_comment("Test Article", "hello", None)
            .await;
        assert!(created);
    }

    #[tokio::test]
    async fn create_comment_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/comments"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": "Unauthorized" })),
            )
            .mount(&server)
            .await;

        assert!(
            !backend(&server.uri(), None)
                .create_comment("Test Article", "hello", Some("parent"))
                .await
        );
        assert!(
            !unreachable_backend()
                .create_comment("Test Article", "hello", None)
                .await
        );
    }

    #[tokio::test]
    async fn delete_comment_targets_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/comments/123"))
            .and(header("cookie", "session=abc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "Comment deleted" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        assert!(backend(&server.uri(), Some("session=abc")).delete_comment("123").await);
    }

    #[tokio::test]
    async fn delete_comment_reports_failure() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/comments/123"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": "Forbidden" })))
            .mount(&server)
            .await;

        assert!(!backend(&server.uri(), None).delete_comment("123").await);
        assert!(!unreachable_backend().delete_comment("123").await);
    }

    #[tokio::test]
    async fn redact_comment_patches_title_and_user() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/comments/Test%20Article/a%40hw3.com"))
            .and(header("cookie", "session=mod"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "Comment redacted" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        assert!(
            backend(&server.uri(), Some("session=mod"))
                .redact_comment("Test Article", "a@hw3.com")
                .await
        );
    }

    #[tokio::test]
    async fn redact_comment_is_false_when_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/comments/Test%20Article/a%40hw3.com"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": "Forbidden" })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(
            !backend(&server.uri(), Some("session=abc"))
                .redact_comment("Test Article", "a@hw3.com")
                .await
        );
        assert!(
            !unreachable_backend()
                .redact_comment("Test Article", "a@hw3.com")
                .await
        );
    }

    #[tokio::test]
    async fn remove_comment_deletes_by_title_and_user() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/comments/Test%20Article/a%40hw3.com"))
            .and(header("cookie", "session=mod"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "Comment deleted" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        assert!(
            backend(&server.uri(), Some("session=mod"))
                .remove_comment("Test Article", "a@hw3.com")
                .await
        );
    }

    #[tokio::test]
    async fn remove_comment_is_false_when_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": "Forbidden" })))
            .mount(&server)
            .await;

        assert!(
            !backend(&server.uri(), None)
                .remove_comment("Test Article", "a@hw3.com")
                .await
        );
    }

    #[tokio::test]
    async fn visit_sends_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/logout"))
            .and(header("cookie", "session=abc"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        backend(&server.uri(), Some("session=abc")).visit("/logout").await;
    }
}
