//! Typed query client over the blog collection.
//!
//! Owns one store for `all-articles` and one for `article-detail(id)` and
//! is constructed explicitly by the composition root; views receive it by
//! reference.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::application::api::{BlogApi, RequestFailure};
use crate::domain::articles::{Article, ArticleDraft, ArticleId};

use super::config::CacheConfig;
use super::keys::QueryKey;
use super::phase::QuerySnapshot;
use super::store::{Fetcher, QueryStore};

#[derive(Clone)]
pub struct QueryClient {
    api: Arc<dyn BlogApi>,
    articles: Arc<QueryStore<Vec<Article>>>,
    details: Arc<QueryStore<Article>>,
    changes: Arc<watch::Sender<u64>>,
}

impl QueryClient {
    pub fn new(api: Arc<dyn BlogApi>, config: CacheConfig) -> Self {
        let (changes, _) = watch::channel(0);
        let changes = Arc::new(changes);

        let list_api = Arc::clone(&api);
        let list_fetcher: Fetcher<Vec<Article>> = Arc::new(move |_key| {
            let api = Arc::clone(&list_api);
            async move { api.list_articles().await }.boxed()
        });

        let detail_api = Arc::clone(&api);
        let detail_fetcher: Fetcher<Article> = Arc::new(move |key| {
            let api = Arc::clone(&detail_api);
            async move {
                match key {
                    QueryKey::ArticleDetail(id) => api.get_article(&id).await,
                    other => Err(RequestFailure::transport(
                        other.operation(),
                        format!("detail store cannot serve `{other}`"),
                    )),
                }
            }
            .boxed()
        });

        Self {
            api,
            articles: Arc::new(QueryStore::new(
                config.clone(),
                list_fetcher,
                Arc::clone(&changes),
            )),
            details: Arc::new(QueryStore::new(
                config,
                detail_fetcher,
                Arc::clone(&changes),
            )),
            changes,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        self.articles.config()
    }

    /// Receiver whose value changes whenever any query entry changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    // ------------------------------------------------------------------
    // all-articles
    // ------------------------------------------------------------------

    /// Observe `all-articles` for as long as the returned guard lives.
    pub fn observe_articles(&self) -> QueryObserver<Vec<Article>> {
        QueryObserver::attach(Arc::clone(&self.articles), QueryKey::AllArticles)
    }

    /// Read `all-articles`, starting a fetch when idle or stale.
    pub fn articles_snapshot(&self) -> QuerySnapshot<Vec<Article>> {
        self.articles.touch(&QueryKey::AllArticles);
        self.articles.snapshot(&QueryKey::AllArticles)
    }

    /// Read `all-articles` once any pending fetch has settled.
    pub async fn articles(&self) -> QuerySnapshot<Vec<Article>> {
        settle(&self.articles, &QueryKey::AllArticles, false).await
    }

    /// Retry action for the list.
    pub fn refetch_articles(&self) {
        self.articles.ensure(&QueryKey::AllArticles, true);
    }

    pub fn invalidate_articles(&self) {
        self.articles.invalidate(&QueryKey::AllArticles);
    }

    // ------------------------------------------------------------------
    // article-detail(id)
    // ------------------------------------------------------------------

    /// Observe `article-detail(id)`; a missing id observes nothing.
    pub fn observe_article(&self, id: Option<&ArticleId>) -> Option<QueryObserver<Article>> {
        id.map(|id| {
            QueryObserver::attach(
                Arc::clone(&self.details),
                QueryKey::ArticleDetail(id.clone()),
            )
        })
    }

    /// Read `article-detail(id)`; a missing id yields the idle state.
    pub fn article_snapshot(&self, id: Option<&ArticleId>) -> QuerySnapshot<Article> {
        let Some(id) = id else {
            return QuerySnapshot::idle();
        };
        let key = QueryKey::ArticleDetail(id.clone());
        self.details.touch(&key);
        self.details.snapshot(&key)
    }

    pub async fn article(&self, id: Option<&ArticleId>) -> QuerySnapshot<Article> {
        let Some(id) = id else {
            return QuerySnapshot::idle();
        };
        settle(&self.details, &QueryKey::ArticleDetail(id.clone()), false).await
    }

    /// Retry action for the detail pane.
    pub fn refetch_article(&self, id: &ArticleId) {
        self.details
            .ensure(&QueryKey::ArticleDetail(id.clone()), true);
    }

    // ------------------------------------------------------------------
    // mutations
    // ------------------------------------------------------------------

    /// Create an article. Not retried; invalidates `all-articles` on success.
    pub async fn create_article(&self, draft: &ArticleDraft) -> Result<Article, RequestFailure> {
        match self.api.create_article(draft).await {
            Ok(article) => {
                info!(article_id = %article.id, title = %article.title, "article created");
                self.invalidate_articles();
                Ok(article)
            }
            Err(failure) => {
                warn!(reason = %failure.reason, "article creation failed");
                Err(failure)
            }
        }
    }
}

async fn settle<V>(store: &Arc<QueryStore<V>>, key: &QueryKey, force: bool) -> QuerySnapshot<V>
where
    V: Send + Sync + 'static,
{
    if let Some(in_flight) = store.ensure(key, force) {
        // Outcome is read back from the store.
        let _ = in_flight.await;
    }
    store.snapshot(key)
}

/// Keeps a query key observed until dropped.
pub struct QueryObserver<V>
where
    V: Send + Sync + 'static,
{
    store: Arc<QueryStore<V>>,
    key: QueryKey,
}

impl<V> QueryObserver<V>
where
    V: Send + Sync + 'static,
{
    fn attach(store: Arc<QueryStore<V>>, key: QueryKey) -> Self {
        store.attach(&key);
        Self { store, key }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Current state; starts a fetch if the data went stale.
    pub fn snapshot(&self) -> QuerySnapshot<V> {
        self.store.touch(&self.key);
        self.store.snapshot(&self.key)
    }

    /// Current state once the pending fetch, if any, has settled.
    pub async fn settled(&self) -> QuerySnapshot<V> {
        if let Some(in_flight) = self.store.in_flight(&self.key) {
            let _ = in_flight.await;
        }
        self.store.snapshot(&self.key)
    }

    /// Retry action: refetch regardless of state.
    pub fn refetch(&self) {
        self.store.ensure(&self.key, true);
    }
}

impl<V> Drop for QueryObserver<V>
where
    V: Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.store.detach(&self.key);
    }
}
