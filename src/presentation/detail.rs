//! Detail View: `{NoSelection, Loading, Error, Loaded}` over `article-detail(id)`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use crate::cache::QuerySnapshot;
use crate::domain::articles::{Article, ArticleId};
use crate::presentation::format::{long_date, rule, wrap};
use crate::presentation::list::{Badge, badge_line};
use crate::presentation::views::{DetailTemplate, TemplateRenderError, render_template};

pub const SELECT_PROMPT: &str = "Select an article";
pub const SELECT_HINT: &str = "Choose a blog from the list to read its full content";
pub const ERROR_HEADING: &str = "Failed to load blog";

/// Skeleton rows: badges, title, meta, description and three body lines.
const SKELETON_WIDTHS: [usize; 7] = [20, 100, 40, 90, 100, 100, 70];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDetail {
    pub id: ArticleId,
    pub cover_image: String,
    pub badges: Vec<Badge>,
    pub read_time: String,
    pub title_lines: Vec<String>,
    pub date: String,
    pub share_url: String,
    pub description_lines: Vec<String>,
    pub paragraphs: Vec<Vec<String>>,
    pub tags: Vec<String>,
}

impl ArticleDetail {
    pub fn build(article: &Article, share_base: &Url, width: usize) -> Self {
        Self {
            id: article.id.clone(),
            cover_image: article.cover_image.clone(),
            badges: article.category.iter().map(Badge::from_category).collect(),
            read_time: format!("{} min read", article.read_time_minutes()),
            title_lines: wrap(&article.title, width),
            date: long_date(article.date),
            share_url: share_url(share_base, &article.id),
            description_lines: wrap(&article.description, width),
            paragraphs: article
                .paragraphs()
                .into_iter()
                .map(|paragraph| wrap(paragraph, width))
                .filter(|lines| !lines.is_empty())
                .collect(),
            tags: article.category.iter().map(|c| c.hashtag()).collect(),
        }
    }

    pub fn badge_line(&self) -> String {
        badge_line(&self.badges)
    }

    pub fn tag_line(&self) -> String {
        self.tags.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    NoSelection,
    Loading,
    Error { message: String },
    Loaded(Box<ArticleDetail>),
}

impl DetailState {
    pub fn from_snapshot(
        selected: Option<&ArticleId>,
        snapshot: &QuerySnapshot<Article>,
        share_base: &Url,
        width: usize,
    ) -> Self {
        if selected.is_none() {
            return DetailState::NoSelection;
        }
        if snapshot.is_error() {
            let message = snapshot
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            return DetailState::Error { message };
        }
        match snapshot.data.as_deref() {
            Some(article) => {
                DetailState::Loaded(Box::new(ArticleDetail::build(article, share_base, width)))
            }
            None if snapshot.is_loading() || snapshot.is_fetching => DetailState::Loading,
            None => DetailState::NoSelection,
        }
    }

    pub fn article(&self) -> Option<&ArticleDetail> {
        match self {
            DetailState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn render(&self, width: usize) -> Result<String, TemplateRenderError> {
        let placeholders = match self {
            DetailState::Loading => SKELETON_WIDTHS
                .iter()
                .map(|percent| "░".repeat((width * percent / 100).max(1)))
                .collect(),
            _ => Vec::new(),
        };
        let error = match self {
            DetailState::Error { message } => Some(message.as_str()),
            _ => None,
        };

        render_template(&DetailTemplate {
            placeholders,
            prompt: matches!(self, DetailState::NoSelection),
            error,
            article: self.article(),
            rule: rule(width),
        })
    }
}

/// `{share_base}/blogs/{id}`, the address the share action copies.
pub fn share_url(base: &Url, id: &ArticleId) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("blogs").push(id.as_str());
    }
    url.to_string()
}

/// OSC 52 escape that asks the terminal to put `text` on the clipboard.
pub fn clipboard_escape(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}
