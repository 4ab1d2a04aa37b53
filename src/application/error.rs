use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::{api::RequestFailure, form::FormError},
    config::LoadError,
    domain::error::DomainError,
    infra::error::InfraError,
    presentation::views::TemplateRenderError,
};

/// Error chain flattened into printable lines, outermost first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Request(#[from] RequestFailure),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Render(#[from] TemplateRenderError),
    #[error("validation failed: {0}")]
    Validation(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short message for the terminal; details go to the log.
    pub fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Config(_) => "Configuration could not be loaded",
            AppError::Domain(_) | AppError::Validation(_) | AppError::Form(_) => {
                "Input could not be processed"
            }
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(_) => "Client could not start",
            AppError::Request(_) => "Remote request failed",
            AppError::Render(_) => "Template rendering failed",
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}
