//! List View: `{Loading, Error, Empty, Populated}` over `all-articles`.

use time::OffsetDateTime;

use crate::cache::QuerySnapshot;
use crate::domain::articles::{Article, ArticleId, BadgeVariant, Category};
use crate::presentation::format::{clamp_lines, relative_time, rule};
use crate::presentation::views::{ListTemplate, TemplateRenderError, render_template};

pub const PLACEHOLDER_ROWS: usize = 5;
pub const CLAMP_LINES: usize = 2;
pub const HEADING: &str = "Latest Articles";
pub const ERROR_HEADING: &str = "Failed to load blogs";
pub const EMPTY_HEADING: &str = "No blogs yet";
pub const EMPTY_HINT: &str = "Create your first blog to get started";

const ROW_INDENT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub variant: BadgeVariant,
}

impl Badge {
    pub fn from_category(category: &Category) -> Self {
        Self {
            label: category.as_str().to_string(),
            variant: category.badge(),
        }
    }
}

/// Badges joined for a single line, e.g. `[FINANCE] [TECH]`.
pub fn badge_line(badges: &[Badge]) -> String {
    badges
        .iter()
        .map(|badge| format!("[{}]", badge.label))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    /// One-based position; the browse loop selects rows by it.
    pub index: usize,
    pub id: ArticleId,
    pub badges: Vec<Badge>,
    pub relative_time: String,
    pub title_lines: Vec<String>,
    pub description_lines: Vec<String>,
    pub selected: bool,
}

impl ListRow {
    pub fn marker(&self) -> &'static str {
        if self.selected { ">" } else { " " }
    }

    pub fn badge_line(&self) -> String {
        badge_line(&self.badges)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading { placeholders: usize },
    Error { message: String },
    Empty,
    Populated(Vec<ListRow>),
}

impl ListState {
    /// Map an `all-articles` snapshot to a view state. Rows keep the
    /// server's order.
    pub fn from_snapshot(
        snapshot: &QuerySnapshot<Vec<Article>>,
        selected: Option<&ArticleId>,
        now: OffsetDateTime,
        width: usize,
    ) -> Self {
        if snapshot.is_error() {
            let message = snapshot
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            return ListState::Error { message };
        }

        match snapshot.data.as_deref() {
            Some(articles) if articles.is_empty() => ListState::Empty,
            Some(articles) => ListState::Populated(
                articles
                    .iter()
                    .enumerate()
                    .map(|(position, article)| {
                        build_row(position + 1, article, selected, now, width)
                    })
                    .collect(),
            ),
            None => ListState::Loading {
                placeholders: PLACEHOLDER_ROWS,
            },
        }
    }

    pub fn rows(&self) -> &[ListRow] {
        match self {
            ListState::Populated(rows) => rows,
            _ => &[],
        }
    }

    /// Identifier of the row at a one-based `index`.
    pub fn id_at(&self, index: usize) -> Option<&ArticleId> {
        self.rows()
            .iter()
            .find(|row| row.index == index)
            .map(|row| &row.id)
    }

    pub fn render(&self, width: usize) -> Result<String, TemplateRenderError> {
        let placeholders = match self {
            ListState::Loading { placeholders } => (0..*placeholders)
                .map(|_| placeholder_line(width))
                .collect(),
            _ => Vec::new(),
        };
        let error = match self {
            ListState::Error { message } => Some(message.as_str()),
            _ => None,
        };

        render_template(&ListTemplate {
            heading: HEADING,
            rule: rule(width),
            placeholders,
            error,
            empty: matches!(self, ListState::Empty),
            rows: self.rows(),
        })
    }
}

fn build_row(
    index: usize,
    article: &Article,
    selected: Option<&ArticleId>,
    now: OffsetDateTime,
    width: usize,
) -> ListRow {
    let text_width = width.saturating_sub(ROW_INDENT).max(1);
    ListRow {
        index,
        id: article.id.clone(),
        badges: article.category.iter().map(Badge::from_category).collect(),
        relative_time: relative_time(article.date, now),
        title_lines: clamp_lines(&article.title, text_width, CLAMP_LINES),
        description_lines: clamp_lines(&article.description, text_width, CLAMP_LINES),
        selected: selected == Some(&article.id),
    }
}

fn placeholder_line(width: usize) -> String {
    "░".repeat(width.saturating_sub(ROW_INDENT).max(1))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::datetime;

    use crate::application::api::{Operation, RequestFailure};
    use crate::cache::QueryStatus;

    use super::*;

    const NOW: OffsetDateTime = datetime!(2026-01-15 12:00:00 UTC);

    fn article(id: &str, title: &str) -> Article {
        Article {
            id: ArticleId::new(id),
            title: title.to_string(),
            description: "A short description".to_string(),
            content: "Body".to_string(),
            cover_image: "https://example.com/c.jpg".to_string(),
            category: vec![Category::Finance, Category::Other("CRYPTO".to_string())],
            date: datetime!(2026-01-15 09:00:00 UTC),
        }
    }

    fn snapshot(
        status: QueryStatus,
        data: Option<Vec<Article>>,
        error: Option<RequestFailure>,
    ) -> QuerySnapshot<Vec<Article>> {
        QuerySnapshot {
            status,
            data: data.map(Arc::new),
            error,
            is_fetching: status == QueryStatus::Loading,
            failure_count: 0,
        }
    }

    #[test]
    fn loading_renders_five_placeholders() {
        let state = ListState::from_snapshot(
            &snapshot(QueryStatus::Loading, None, None),
            None,
            NOW,
            60,
        );
        assert_eq!(
            state,
            ListState::Loading {
                placeholders: PLACEHOLDER_ROWS
            }
        );
        let text = state.render(60).expect("render");
        assert_eq!(text.matches('░').count() / 56, PLACEHOLDER_ROWS);
    }

    #[test]
    fn empty_collection_is_not_an_error() {
        let state = ListState::from_snapshot(
            &snapshot(QueryStatus::Success, Some(Vec::new()), None),
            None,
            NOW,
            60,
        );
        assert_eq!(state, ListState::Empty);
        let text = state.render(60).expect("render");
        assert!(text.contains(EMPTY_HEADING));
        assert!(text.contains(EMPTY_HINT));
    }

    #[test]
    fn error_offers_retry() {
        let failure = RequestFailure::status(Operation::List, 500);
        let state = ListState::from_snapshot(
            &snapshot(QueryStatus::Error, None, Some(failure)),
            None,
            NOW,
            60,
        );
        let text = state.render(60).expect("render");
        assert!(text.contains(ERROR_HEADING));
        assert!(text.contains("Failed to fetch blogs"));
        assert!(text.contains("Try again"));
    }

    #[test]
    fn rows_keep_server_order_and_mark_selection() {
        let articles = vec![article("b", "Second"), article("a", "First")];
        let selected = ArticleId::new("a");
        let state = ListState::from_snapshot(
            &snapshot(QueryStatus::Success, Some(articles), None),
            Some(&selected),
            NOW,
            60,
        );

        let rows = state.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.as_str(), "b");
        assert!(!rows[0].selected);
        assert!(rows[1].selected);
        assert_eq!(rows[0].relative_time, "3 hours ago");
        assert_eq!(rows[0].badge_line(), "[FINANCE] [CRYPTO]");
        assert_eq!(rows[0].badges[1].variant, BadgeVariant::Secondary);
        assert_eq!(state.id_at(2).map(ArticleId::as_str), Some("a"));
        assert!(state.id_at(3).is_none());

        let text = state.render(60).expect("render");
        assert!(text.contains(HEADING));
        assert!(text.find("Second") < text.find("First"));
    }

    #[test]
    fn long_titles_are_clamped_to_two_lines() {
        let long = "word ".repeat(60);
        let state = ListState::from_snapshot(
            &snapshot(QueryStatus::Success, Some(vec![article("x", &long)]), None),
            None,
            NOW,
            40,
        );
        let row = &state.rows()[0];
        assert_eq!(row.title_lines.len(), CLAMP_LINES);
        assert!(row.title_lines[1].ends_with('…'));
    }
}
