//! HTTP client for the remote blog collection.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::application::api::{BlogApi, Operation, RequestFailure};
use crate::domain::articles::{Article, ArticleDraft, ArticleId};

use super::error::InfraError;

const COLLECTION: &str = "blogs";

/// Source of the submission timestamp stamped onto created articles.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// Body of `POST /blogs`: the draft plus the client-side `date` stamp.
#[derive(Debug, Serialize)]
struct NewArticleRequest<'a> {
    #[serde(flatten)]
    draft: &'a ArticleDraft,
    #[serde(with = "time::serde::rfc3339")]
    date: OffsetDateTime,
}

#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    base: Url,
    clock: Clock,
}

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl RemoteClient {
    pub fn new(base: Url) -> Result<Self, InfraError> {
        if base.cannot_be_a_base() {
            return Err(InfraError::configuration(format!(
                "api base URL `{base}` cannot carry a path"
            )));
        }
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self {
            client,
            base,
            clock: Arc::new(OffsetDateTime::now_utc),
        })
    }

    /// Replace the submission clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn user_agent() -> &'static str {
        concat!("blogspace/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `{base}/blogs[/{id}]`, with the id percent-encoded as one segment.
    pub fn collection_url(&self, id: Option<&ArticleId>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(COLLECTION);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }

    async fn request<T, B>(
        &self,
        operation: Operation,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, RequestFailure>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(operation = operation.as_str(), %method, %url, "sending request");

        let mut req = self.client.request(method, url);
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(|err| {
            warn!(operation = operation.as_str(), error = %err, "request did not complete");
            RequestFailure::transport(operation, err.to_string())
        })?;
        Self::handle(operation, resp).await
    }

    async fn handle<T: DeserializeOwned>(
        operation: Operation,
        resp: Response,
    ) -> Result<T, RequestFailure> {
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| RequestFailure::transport(operation, err.to_string()))?;
        if !status.is_success() {
            warn!(
                operation = operation.as_str(),
                status = status.as_u16(),
                "remote returned non-success status"
            );
            return Err(RequestFailure::status(operation, status.as_u16()));
        }
        serde_json::from_slice(&bytes).map_err(|err| {
            warn!(operation = operation.as_str(), error = %err, "failed to parse body");
            RequestFailure::decode(operation, err.to_string())
        })
    }
}

#[async_trait]
impl BlogApi for RemoteClient {
    async fn list_articles(&self) -> Result<Vec<Article>, RequestFailure> {
        self.request::<_, ()>(Operation::List, Method::GET, self.collection_url(None), None)
            .await
    }

    async fn get_article(&self, id: &ArticleId) -> Result<Article, RequestFailure> {
        self.request::<_, ()>(
            Operation::Get,
            Method::GET,
            self.collection_url(Some(id)),
            None,
        )
        .await
    }

    async fn create_article(&self, draft: &ArticleDraft) -> Result<Article, RequestFailure> {
        let body = NewArticleRequest {
            draft,
            date: (self.clock)(),
        };
        self.request(
            Operation::Create,
            Method::POST,
            self.collection_url(None),
            Some(&body),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;
    use time::macros::datetime;

    use crate::application::api::FailureReason;
    use crate::domain::articles::{COVER_PLACEHOLDER_URL, Category};

    use super::*;

    const ARTICLE_JSON: &str = r#"{"id":"a1","title":"Tax season","description":"Prep early","content":"One.\n\nTwo.","coverImage":"https://example.com/c.jpg","category":["FINANCE"],"date":"2024-03-01T08:00:00Z"}"#;

    fn client(server: &MockServer) -> RemoteClient {
        let base = Url::parse(&server.base_url()).expect("mock base url");
        RemoteClient::new(base).expect("client")
    }

    #[test]
    fn collection_url_keeps_base_path_and_encodes_id() {
        let base = Url::parse("http://localhost:3001/api/").expect("url");
        let client = RemoteClient::new(base).expect("client");
        assert_eq!(
            client.collection_url(None).as_str(),
            "http://localhost:3001/api/blogs"
        );
        assert_eq!(
            client.collection_url(Some(&ArticleId::new("a b"))).as_str(),
            "http://localhost:3001/api/blogs/a%20b"
        );
    }

    #[test]
    fn rejects_cannot_be_a_base_urls() {
        let base = Url::parse("mailto:someone@example.com").expect("url");
        let err = RemoteClient::new(base).expect_err("mailto is not a base");
        assert!(matches!(err, InfraError::Configuration { .. }));
    }

    #[tokio::test]
    async fn list_returns_articles_in_server_order() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method("GET").path("/blogs");
            then.status(200)
                .header("content-type", "application/json")
                .body(format!(
                    "[{ARTICLE_JSON},{}]",
                    ARTICLE_JSON.replace("\"a1\"", "\"a0\"")
                ));
        }).await;

        let articles = client(&server).list_articles().await.expect("list");
        mock.assert_async().await;
        let ids: Vec<&str> = articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a0"]);
    }

    #[tokio::test]
    async fn get_maps_not_found_to_request_failure() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method("GET").path("/blogs/missing");
            then.status(404).body("{}");
        }).await;

        let err = client(&server)
            .get_article(&ArticleId::new("missing"))
            .await
            .expect_err("404 should fail");
        mock.assert_async().await;
        assert_eq!(err.operation, Operation::Get);
        assert_eq!(err.reason, FailureReason::Status(404));
        assert_eq!(err.to_string(), "Failed to fetch blog");
    }

    #[tokio::test]
    async fn get_reports_malformed_body_as_failure() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method("GET").path("/blogs/a1");
            then.status(200).body("not json");
        }).await;

        let err = client(&server)
            .get_article(&ArticleId::new("a1"))
            .await
            .expect_err("bad body should fail");
        assert!(matches!(err.reason, FailureReason::Decode(_)));
    }

    #[tokio::test]
    async fn create_stamps_date_and_posts_draft() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method("POST")
                .path("/blogs")
                .header("content-type", "application/json")
                .json_body_includes(format!(
                    r#"{{"title":"T","description":"D","content":"C","coverImage":"{COVER_PLACEHOLDER_URL}","category":["TECH","SKILLS"],"date":"2026-01-15T09:30:00Z"}}"#
                ));
            then.status(201)
                .header("content-type", "application/json")
                .body(ARTICLE_JSON);
        }).await;

        let draft = ArticleDraft::new("T", "D", "C", None, vec![Category::Tech, Category::Skills])
            .expect("valid draft");
        let created = client(&server)
            .with_clock(Arc::new(|| datetime!(2026-01-15 09:30:00 UTC)))
            .create_article(&draft)
            .await
            .expect("create");
        mock.assert_async().await;
        assert_eq!(created.id.as_str(), "a1");
    }

    #[tokio::test]
    async fn create_failure_is_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method("POST").path("/blogs");
            then.status(500);
        }).await;

        let draft =
            ArticleDraft::new("T", "D", "C", None, vec![Category::Tech]).expect("valid draft");
        let err = client(&server)
            .create_article(&draft)
            .await
            .expect_err("500 should fail");
        mock.assert_async().await;
        assert_eq!(err.to_string(), "Failed to create blog");
    }
}
