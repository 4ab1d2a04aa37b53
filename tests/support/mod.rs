#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use blogspace::application::api::{BlogApi, Operation, RequestFailure};
use blogspace::domain::articles::{Article, ArticleDraft, ArticleId, Category};
use time::macros::datetime;

/// In-memory collection that counts every call.
#[derive(Default)]
pub struct FakeApi {
    articles: Mutex<Vec<Article>>,
    fail_list: AtomicBool,
    list_calls: AtomicUsize,
    get_calls: Mutex<HashMap<String, usize>>,
    create_calls: AtomicUsize,
}

impl FakeApi {
    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            articles: Mutex::new(articles),
            ..Default::default()
        }
    }

    pub fn failing_list() -> Self {
        Self {
            fail_list: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn set_list_failing(&self, failing: bool) {
        self.fail_list.store(failing, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self, id: &str) -> usize {
        self.get_calls
            .lock()
            .expect("get_calls lock")
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_get_calls(&self) -> usize {
        self.get_calls.lock().expect("get_calls lock").values().sum()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlogApi for FakeApi {
    async fn list_articles(&self) -> Result<Vec<Article>, RequestFailure> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RequestFailure::status(Operation::List, 503));
        }
        Ok(self.articles.lock().expect("articles lock").clone())
    }

    async fn get_article(&self, id: &ArticleId) -> Result<Article, RequestFailure> {
        *self
            .get_calls
            .lock()
            .expect("get_calls lock")
            .entry(id.as_str().to_string())
            .or_default() += 1;
        self.articles
            .lock()
            .expect("articles lock")
            .iter()
            .find(|article| &article.id == id)
            .cloned()
            .ok_or_else(|| RequestFailure::status(Operation::Get, 404))
    }

    async fn create_article(&self, draft: &ArticleDraft) -> Result<Article, RequestFailure> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let article = Article {
            id: ArticleId::new(format!("created-{n}")),
            title: draft.title.clone(),
            description: draft.description.clone(),
            content: draft.content.clone(),
            cover_image: draft.cover_image.clone(),
            category: draft.category.clone(),
            date: datetime!(2026-01-15 09:30:00 UTC),
        };
        self.articles
            .lock()
            .expect("articles lock")
            .insert(0, article.clone());
        Ok(article)
    }
}

pub fn article(id: &str, title: &str) -> Article {
    Article {
        id: ArticleId::new(id),
        title: title.to_string(),
        description: format!("About {title}"),
        content: format!("{title} opens here.\n\nAnd closes here."),
        cover_image: "https://example.com/cover.jpg".to_string(),
        category: vec![Category::Finance],
        date: datetime!(2026-01-10 09:00:00 UTC),
    }
}
