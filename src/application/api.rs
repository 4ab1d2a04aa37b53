//! Port to the remote blog collection.
//!
//! Every failure, whatever its cause, surfaces as a single
//! [`RequestFailure`]; the reason is kept for logs only.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::articles::{Article, ArticleDraft, ArticleId};

/// Operation that produced a [`RequestFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Operation::List => "Failed to fetch blogs",
            Operation::Get => "Failed to fetch blog",
            Operation::Create => "Failed to create blog",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Status(u16),
    Transport(String),
    Decode(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Status(code) => write!(f, "status {code}"),
            FailureReason::Transport(message) => write!(f, "transport: {message}"),
            FailureReason::Decode(message) => write!(f, "decode: {message}"),
        }
    }
}

/// Any non-success response or network-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .operation.failure_message())]
pub struct RequestFailure {
    pub operation: Operation,
    pub reason: FailureReason,
}

impl RequestFailure {
    pub fn status(operation: Operation, code: u16) -> Self {
        Self {
            operation,
            reason: FailureReason::Status(code),
        }
    }

    pub fn transport(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            reason: FailureReason::Transport(message.into()),
        }
    }

    pub fn decode(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            reason: FailureReason::Decode(message.into()),
        }
    }
}

/// List / get / create over the blog collection.
#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn list_articles(&self) -> Result<Vec<Article>, RequestFailure>;

    async fn get_article(&self, id: &ArticleId) -> Result<Article, RequestFailure>;

    /// Create an article; implementations stamp `date` at call time.
    async fn create_article(&self, draft: &ArticleDraft) -> Result<Article, RequestFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_hides_reason() {
        let failure = RequestFailure::status(Operation::Get, 404);
        assert_eq!(failure.to_string(), "Failed to fetch blog");
        assert_eq!(failure.reason.to_string(), "status 404");
    }
}
