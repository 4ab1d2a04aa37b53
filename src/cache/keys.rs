//! Query key definitions.

use std::fmt;

use crate::application::api::Operation;
use crate::domain::articles::ArticleId;

/// Logical identity of a cacheable read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The whole collection, in server order.
    AllArticles,
    /// A single article by identifier.
    ArticleDetail(ArticleId),
}

impl QueryKey {
    /// Short label used as a metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryKey::AllArticles => "all_articles",
            QueryKey::ArticleDetail(_) => "article_detail",
        }
    }

    /// Remote operation that serves this key.
    pub fn operation(&self) -> Operation {
        match self {
            QueryKey::AllArticles => Operation::List,
            QueryKey::ArticleDetail(_) => Operation::Get,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::AllArticles => f.write_str("all-articles"),
            QueryKey::ArticleDetail(id) => write!(f, "article-detail({id})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_keys_compare_by_id() {
        let a = QueryKey::ArticleDetail(ArticleId::new("1"));
        let b = QueryKey::ArticleDetail(ArticleId::new("1"));
        assert_eq!(a, b);
        assert_ne!(a, QueryKey::ArticleDetail(ArticleId::new("2")));
        assert_ne!(a, QueryKey::AllArticles);
    }

    #[test]
    fn display_matches_logical_names() {
        assert_eq!(QueryKey::AllArticles.to_string(), "all-articles");
        assert_eq!(
            QueryKey::ArticleDetail(ArticleId::new("x9")).to_string(),
            "article-detail(x9)"
        );
    }
}
