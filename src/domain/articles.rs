//! Article entity as served by the remote blog collection.
//!
//! Articles are immutable once created: the client only lists, reads and
//! creates them. Identifiers are assigned by the collaborator and treated as
//! opaque strings.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::domain::error::DomainError;

/// Cover image used when a draft leaves the field blank.
pub const COVER_PLACEHOLDER_URL: &str =
    "https://images.pexels.com/photos/3184465/pexels-photo-3184465.jpeg";

/// Words per minute used by [`estimate_read_time`].
pub const READING_SPEED_WPM: usize = 200;

/// Delimiter separating paragraphs in article content.
pub const PARAGRAPH_DELIMITER: &str = "\n\n";

/// Opaque article identifier assigned by the remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ArticleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for ArticleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // json-server style collections emit either strings or integers.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(text) => Self(text),
            WireId::Signed(number) => Self(number.to_string()),
            WireId::Unsigned(number) => Self(number.to_string()),
        })
    }
}

/// Category tag attached to an article.
///
/// Unknown tags survive round trips through [`Category::Other`] and render
/// with the secondary badge style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Finance,
    Tech,
    Career,
    Education,
    Regulations,
    Lifestyle,
    Skills,
    Other(String),
}

/// Badge style selected for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    Finance,
    Tech,
    Career,
    Education,
    Regulations,
    Lifestyle,
    Skills,
    Secondary,
}

impl BadgeVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeVariant::Finance => "finance",
            BadgeVariant::Tech => "tech",
            BadgeVariant::Career => "career",
            BadgeVariant::Education => "education",
            BadgeVariant::Regulations => "regulations",
            BadgeVariant::Lifestyle => "lifestyle",
            BadgeVariant::Skills => "skills",
            BadgeVariant::Secondary => "secondary",
        }
    }
}

impl Category {
    /// The fixed enumeration offered by the creation form, in display order.
    pub const KNOWN: [Category; 7] = [
        Category::Finance,
        Category::Tech,
        Category::Career,
        Category::Education,
        Category::Regulations,
        Category::Lifestyle,
        Category::Skills,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Finance => "FINANCE",
            Category::Tech => "TECH",
            Category::Career => "CAREER",
            Category::Education => "EDUCATION",
            Category::Regulations => "REGULATIONS",
            Category::Lifestyle => "LIFESTYLE",
            Category::Skills => "SKILLS",
            Category::Other(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }

    pub fn badge(&self) -> BadgeVariant {
        match self {
            Category::Finance => BadgeVariant::Finance,
            Category::Tech => BadgeVariant::Tech,
            Category::Career => BadgeVariant::Career,
            Category::Education => BadgeVariant::Education,
            Category::Regulations => BadgeVariant::Regulations,
            Category::Lifestyle => BadgeVariant::Lifestyle,
            Category::Skills => BadgeVariant::Skills,
            Category::Other(_) => BadgeVariant::Secondary,
        }
    }

    /// Lower-cased hashtag shown at the foot of an article.
    pub fn hashtag(&self) -> String {
        format!("#{}", self.as_str().to_lowercase())
    }

    /// Resolve user input against the fixed enumeration, ignoring case.
    pub fn parse_known(input: &str) -> Option<Category> {
        let trimmed = input.trim();
        Category::KNOWN
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "FINANCE" => Category::Finance,
            "TECH" => Category::Tech,
            "CAREER" => Category::Career,
            "EDUCATION" => Category::Education,
            "REGULATIONS" => Category::Regulations,
            "LIFESTYLE" => Category::Lifestyle,
            "SKILLS" => Category::Skills,
            _ => Category::Other(value),
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub description: String,
    pub content: String,
    pub cover_image: String,
    pub category: Vec<Category>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl Article {
    pub fn paragraphs(&self) -> Vec<&str> {
        split_paragraphs(&self.content)
    }

    pub fn read_time_minutes(&self) -> usize {
        estimate_read_time(&self.content)
    }
}

/// Article contents awaiting creation. Carries neither `id` nor `date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDraft {
    pub title: String,
    pub description: String,
    pub content: String,
    pub cover_image: String,
    pub category: Vec<Category>,
}

impl ArticleDraft {
    /// Build a draft, defaulting a blank cover image to the placeholder.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
        cover_image: Option<&str>,
        category: Vec<Category>,
    ) -> Result<Self, DomainError> {
        let draft = Self {
            title: title.into(),
            description: description.into(),
            content: content.into(),
            cover_image: cover_image_or_placeholder(cover_image),
            category,
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        if self.category.is_empty() {
            return Err(DomainError::invariant(
                "an article needs at least one category",
            ));
        }
        Ok(())
    }
}

/// Return the trimmed cover URL, or the placeholder when blank.
pub fn cover_image_or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => COVER_PLACEHOLDER_URL.to_string(),
    }
}

/// Estimated reading time in whole minutes, never below one.
pub fn estimate_read_time(content: &str) -> usize {
    let words = content.split_whitespace().count();
    words.div_ceil(READING_SPEED_WPM).max(1)
}

/// Split content into paragraph blocks on the blank-line delimiter.
pub fn split_paragraphs(content: &str) -> Vec<&str> {
    content.split(PARAGRAPH_DELIMITER).collect()
}
