//! Creation form state.
//!
//! Purely local: values live here until a submission succeeds. The form
//! never touches the cache directly; `QueryClient::create_article`
//! invalidates `all-articles` on success.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::api::RequestFailure;
use crate::cache::QueryClient;
use crate::domain::articles::{Article, ArticleDraft, Category};
use crate::domain::error::DomainError;

/// Description length the form nudges authors towards.
pub const RECOMMENDED_DESCRIPTION_CHARS: usize = 200;

type SuccessCallback = Box<dyn FnMut(&Article) + Send>;

/// A reason the current values cannot be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormIssue {
    TitleRequired,
    DescriptionRequired,
    ContentRequired,
    CategoryRequired,
}

impl FormIssue {
    pub fn message(self) -> &'static str {
        match self {
            FormIssue::TitleRequired => "Title is required",
            FormIssue::DescriptionRequired => "Description is required",
            FormIssue::ContentRequired => "Content is required",
            FormIssue::CategoryRequired => "Select at least one category",
        }
    }
}

impl fmt::Display for FormIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Submitting,
    Failed(String),
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("form has {} unresolved issue(s)", .0.len())]
    Invalid(Vec<FormIssue>),
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Request(#[from] RequestFailure),
}

/// Field values; categories are kept in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub title: String,
    pub description: String,
    pub content: String,
    pub cover_image: String,
    pub categories: Vec<Category>,
}

impl FormValues {
    pub fn issues(&self) -> Vec<FormIssue> {
        let mut issues = Vec::new();
        if self.title.trim().is_empty() {
            issues.push(FormIssue::TitleRequired);
        }
        if self.description.trim().is_empty() {
            issues.push(FormIssue::DescriptionRequired);
        }
        if self.content.trim().is_empty() {
            issues.push(FormIssue::ContentRequired);
        }
        if self.categories.is_empty() {
            issues.push(FormIssue::CategoryRequired);
        }
        issues
    }

    fn to_draft(&self) -> Result<ArticleDraft, DomainError> {
        ArticleDraft::new(
            self.title.as_str(),
            self.description.as_str(),
            self.content.as_str(),
            Some(self.cover_image.as_str()),
            self.categories.clone(),
        )
    }
}

pub struct CreationForm {
    open: bool,
    values: FormValues,
    status: FormStatus,
    on_success: Option<SuccessCallback>,
}

impl fmt::Debug for CreationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreationForm")
            .field("open", &self.open)
            .field("values", &self.values)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Default for CreationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CreationForm {
    pub fn new() -> Self {
        Self {
            open: false,
            values: FormValues::default(),
            status: FormStatus::Editing,
            on_success: None,
        }
    }

    /// Register a callback invoked with each created article.
    pub fn with_on_success(mut self, callback: impl FnMut(&Article) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Cancel: hide the form, keeping whatever was typed.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        self.values.title = value.into();
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.values.description = value.into();
    }

    pub fn set_content(&mut self, value: impl Into<String>) {
        self.values.content = value.into();
    }

    pub fn set_cover_image(&mut self, value: impl Into<String>) {
        self.values.cover_image = value.into();
    }

    /// Select the category, or deselect it when already selected.
    pub fn toggle_category(&mut self, category: Category) {
        if let Some(index) = self.values.categories.iter().position(|c| *c == category) {
            self.values.categories.remove(index);
        } else {
            self.values.categories.push(category);
        }
    }

    pub fn is_selected(&self, category: &Category) -> bool {
        self.values.categories.contains(category)
    }

    pub fn description_chars(&self) -> usize {
        self.values.description.chars().count()
    }

    pub fn validate(&self) -> Vec<FormIssue> {
        self.values.issues()
    }

    pub fn is_submitting(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    /// Whether the submit action is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && self.validate().is_empty()
    }

    /// Enter `Submitting` and hand out the draft to send.
    pub fn begin_submit(&mut self) -> Result<ArticleDraft, FormError> {
        if self.is_submitting() {
            return Err(FormError::AlreadySubmitting);
        }
        let issues = self.validate();
        if !issues.is_empty() {
            debug!(issues = issues.len(), "submission blocked by validation");
            return Err(FormError::Invalid(issues));
        }
        let draft = self.values.to_draft()?;
        self.status = FormStatus::Submitting;
        Ok(draft)
    }

    /// Apply the outcome of a create call started by [`Self::begin_submit`].
    pub fn finish_submit(
        &mut self,
        outcome: Result<Article, RequestFailure>,
    ) -> Result<Article, FormError> {
        match outcome {
            Ok(article) => {
                info!(article_id = %article.id, "creation form submitted");
                self.values = FormValues::default();
                self.status = FormStatus::Editing;
                self.open = false;
                if let Some(callback) = self.on_success.as_mut() {
                    callback(&article);
                }
                Ok(article)
            }
            Err(failure) => {
                self.status = FormStatus::Failed(failure.to_string());
                Err(failure.into())
            }
        }
    }

    /// Validate, send exactly one create request and apply its outcome.
    pub async fn submit(&mut self, client: &QueryClient) -> Result<Article, FormError> {
        let draft = self.begin_submit()?;
        let outcome = client.create_article(&draft).await;
        self.finish_submit(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use time::macros::datetime;

    use crate::application::api::{BlogApi, Operation};
    use crate::cache::CacheConfig;
    use crate::domain::articles::{ArticleId, COVER_PLACEHOLDER_URL};

    use super::*;

    #[derive(Default)]
    struct RecordingApi {
        fail_create: bool,
        creates: AtomicUsize,
        drafts: Mutex<Vec<ArticleDraft>>,
    }

    #[async_trait]
    impl BlogApi for RecordingApi {
        async fn list_articles(&self) -> Result<Vec<Article>, RequestFailure> {
            Ok(Vec::new())
        }

        async fn get_article(&self, _id: &ArticleId) -> Result<Article, RequestFailure> {
            Err(RequestFailure::status(Operation::Get, 404))
        }

        async fn create_article(&self, draft: &ArticleDraft) -> Result<Article, RequestFailure> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            self.drafts.lock().expect("drafts lock").push(draft.clone());
            if self.fail_create {
                return Err(RequestFailure::status(Operation::Create, 500));
            }
            Ok(Article {
                id: ArticleId::new("new-1"),
                title: draft.title.clone(),
                description: draft.description.clone(),
                content: draft.content.clone(),
                cover_image: draft.cover_image.clone(),
                category: draft.category.clone(),
                date: datetime!(2026-01-15 09:30:00 UTC),
            })
        }
    }

    fn client(api: Arc<RecordingApi>) -> QueryClient {
        QueryClient::new(api, CacheConfig::without_retry_delay())
    }

    fn filled_form() -> CreationForm {
        let mut form = CreationForm::new();
        form.open();
        form.set_title("Negotiating your salary");
        form.set_description("A practical checklist");
        form.set_content("Know your number.\n\nPractice the pitch.");
        form.toggle_category(Category::Career);
        form
    }

    #[test]
    fn empty_form_reports_every_issue() {
        let form = CreationForm::new();
        assert_eq!(
            form.validate(),
            vec![
                FormIssue::TitleRequired,
                FormIssue::DescriptionRequired,
                FormIssue::ContentRequired,
                FormIssue::CategoryRequired,
            ]
        );
        assert!(!form.can_submit());
    }

    #[test]
    fn whitespace_only_title_is_empty() {
        let mut form = filled_form();
        form.set_title("   ");
        assert_eq!(form.validate(), vec![FormIssue::TitleRequired]);
    }

    #[test]
    fn toggling_a_category_twice_deselects_it() {
        let mut form = CreationForm::new();
        form.toggle_category(Category::Tech);
        form.toggle_category(Category::Finance);
        form.toggle_category(Category::Tech);
        assert_eq!(form.values().categories, vec![Category::Finance]);
        assert!(!form.is_selected(&Category::Tech));
    }

    #[test]
    fn cancel_keeps_values() {
        let mut form = filled_form();
        form.close();
        assert!(!form.is_open());
        form.open();
        assert_eq!(form.values().title, "Negotiating your salary");
    }

    #[test]
    fn description_chars_counts_characters() {
        let mut form = CreationForm::new();
        form.set_description("café");
        assert_eq!(form.description_chars(), 4);
    }

    #[tokio::test]
    async fn no_categories_blocks_submission_without_network_call() {
        let api = Arc::new(RecordingApi::default());
        let client = client(Arc::clone(&api));
        let mut form = filled_form();
        form.toggle_category(Category::Career);

        let err = form.submit(&client).await.expect_err("blocked");
        assert!(matches!(err, FormError::Invalid(ref issues) if issues == &[FormIssue::CategoryRequired]));
        assert_eq!(api.creates.load(Ordering::SeqCst), 0);
        assert_eq!(form.status(), &FormStatus::Editing);
    }

    #[tokio::test]
    async fn valid_submission_sends_values_as_typed_and_resets() {
        let api = Arc::new(RecordingApi::default());
        let client = client(Arc::clone(&api));
        let created = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&created);
        let mut form = CreationForm::new().with_on_success(move |article: &Article| {
            sink.lock().expect("sink lock").push(article.id.clone());
        });
        form.open();
        form.set_title("  Index funds  ");
        form.set_description("Low fees");
        form.set_content("    let fees = 0.03;\n\nBuy the market.\n");
        form.set_cover_image("   ");
        form.toggle_category(Category::Finance);

        let article = form.submit(&client).await.expect("created");

        assert_eq!(api.creates.load(Ordering::SeqCst), 1);
        let drafts = api.drafts.lock().expect("drafts lock");
        assert_eq!(drafts[0].title, "  Index funds  ");
        assert_eq!(drafts[0].content, "    let fees = 0.03;\n\nBuy the market.\n");
        assert_eq!(drafts[0].cover_image, COVER_PLACEHOLDER_URL);
        assert_eq!(article.id.as_str(), "new-1");
        assert!(!form.is_open());
        assert_eq!(form.values(), &FormValues::default());
        assert_eq!(
            created.lock().expect("sink lock").as_slice(),
            &[ArticleId::new("new-1")]
        );
    }

    #[tokio::test]
    async fn failed_submission_keeps_values_and_stays_open() {
        let api = Arc::new(RecordingApi {
            fail_create: true,
            ..Default::default()
        });
        let client = client(Arc::clone(&api));
        let mut form = filled_form();

        let err = form.submit(&client).await.expect_err("create fails");
        assert!(matches!(err, FormError::Request(_)));
        assert!(form.is_open());
        assert_eq!(form.values().title, "Negotiating your salary");
        assert_eq!(
            form.status(),
            &FormStatus::Failed("Failed to create blog".to_string())
        );

        // Resubmitting is the retry path.
        let _ = form.submit(&client).await;
        assert_eq!(api.creates.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut form = filled_form();
        form.begin_submit().expect("first submit");
        assert!(matches!(
            form.begin_submit(),
            Err(FormError::AlreadySubmitting)
        ));
        assert!(!form.can_submit());
    }
}
