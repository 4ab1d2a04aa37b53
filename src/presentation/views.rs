use askama::{Error as AskamaError, Template};
use thiserror::Error;

use crate::presentation::detail::ArticleDetail;
use crate::presentation::form::FormView;
use crate::presentation::list::ListRow;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

pub fn render_template<T: Template>(template: &T) -> Result<String, TemplateRenderError> {
    template.render().map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
    })
}

#[derive(Template)]
#[template(path = "list.txt")]
pub struct ListTemplate<'a> {
    pub heading: &'a str,
    pub rule: String,
    pub placeholders: Vec<String>,
    pub error: Option<&'a str>,
    pub empty: bool,
    pub rows: &'a [ListRow],
}

#[derive(Template)]
#[template(path = "detail.txt")]
pub struct DetailTemplate<'a> {
    pub placeholders: Vec<String>,
    pub prompt: bool,
    pub error: Option<&'a str>,
    pub article: Option<&'a ArticleDetail>,
    pub rule: String,
}

#[derive(Template)]
#[template(path = "form.txt")]
pub struct FormTemplate<'a> {
    pub form: &'a FormView,
    pub rule: String,
}

#[derive(Template)]
#[template(path = "shell.txt")]
pub struct ShellTemplate<'a> {
    pub brand: &'a str,
    pub tagline: &'a str,
    pub new_article: &'a str,
    pub hero: &'a [String],
    pub back_hint: bool,
    pub body: &'a str,
    pub footer: &'a str,
    pub rule: String,
}
