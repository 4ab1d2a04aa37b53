use crate::application::form::{CreationForm, FormStatus, RECOMMENDED_DESCRIPTION_CHARS};
use crate::domain::articles::Category;
use crate::presentation::format::{rule, wrap};
use crate::presentation::views::{FormTemplate, TemplateRenderError, render_template};

pub const HEADING: &str = "Create New Article";
pub const CONTENT_HINT: &str = "Separate paragraphs with blank lines.";
pub const SUBMIT_LABEL: &str = "Publish Article";
pub const SUBMITTING_LABEL: &str = "Publishing...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryToggle {
    /// One-based position in the fixed enumeration.
    pub index: usize,
    pub label: String,
    pub selected: bool,
}

impl CategoryToggle {
    pub fn marker(&self) -> &'static str {
        if self.selected { "[x]" } else { "[ ]" }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub heading: &'static str,
    pub title: String,
    pub toggles: Vec<CategoryToggle>,
    pub cover_image: String,
    pub description_lines: Vec<String>,
    pub description_hint: String,
    pub content_lines: Vec<String>,
    pub content_hint: &'static str,
    pub issues: Vec<String>,
    pub error: Option<String>,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
}

impl FormView {
    pub fn from_form(form: &CreationForm, width: usize) -> Self {
        let values = form.values();
        let error = match form.status() {
            FormStatus::Failed(message) => Some(message.clone()),
            _ => None,
        };
        let submit_label = if form.is_submitting() {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        };

        Self {
            heading: HEADING,
            title: values.title.clone(),
            toggles: category_toggles(form),
            cover_image: values.cover_image.clone(),
            description_lines: wrap(&values.description, width),
            description_hint: format!(
                "{}/{RECOMMENDED_DESCRIPTION_CHARS} characters recommended",
                form.description_chars()
            ),
            content_lines: values
                .content
                .lines()
                .flat_map(|line| {
                    let wrapped = wrap(line, width);
                    if wrapped.is_empty() {
                        vec![String::new()]
                    } else {
                        wrapped
                    }
                })
                .collect(),
            content_hint: CONTENT_HINT,
            issues: form
                .validate()
                .into_iter()
                .map(|issue| issue.message().to_string())
                .collect(),
            error,
            submit_label,
            submit_enabled: form.can_submit(),
        }
    }

    pub fn render(&self, width: usize) -> Result<String, TemplateRenderError> {
        render_template(&FormTemplate {
            form: self,
            rule: rule(width),
        })
    }
}

/// Toggles follow the fixed enumeration, not selection order.
pub fn category_toggles(form: &CreationForm) -> Vec<CategoryToggle> {
    Category::KNOWN
        .iter()
        .enumerate()
        .map(|(position, category)| CategoryToggle {
            index: position + 1,
            label: category.as_str().to_string(),
            selected: form.is_selected(category),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_follow_enumeration_order() {
        let mut form = CreationForm::new();
        form.toggle_category(Category::Skills);
        form.toggle_category(Category::Finance);

        let toggles = category_toggles(&form);
        let labels: Vec<&str> = toggles.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "FINANCE",
                "TECH",
                "CAREER",
                "EDUCATION",
                "REGULATIONS",
                "LIFESTYLE",
                "SKILLS"
            ]
        );
        assert!(toggles[0].selected);
        assert!(toggles[6].selected);
        assert!(!toggles[1].selected);
    }

    #[test]
    fn description_counter_and_disabled_submit() {
        let mut form = CreationForm::new();
        form.set_description("Twelve chars");
        let view = FormView::from_form(&form, 60);

        assert_eq!(view.description_hint, "12/200 characters recommended");
        assert!(!view.submit_enabled);
        assert_eq!(view.submit_label, SUBMIT_LABEL);
        assert!(view.issues.contains(&"Title is required".to_string()));
    }

    #[test]
    fn submitting_form_shows_progress_label() {
        let mut form = CreationForm::new();
        form.set_title("T");
        form.set_description("D");
        form.set_content("C");
        form.toggle_category(Category::Tech);
        form.begin_submit().expect("valid form");

        let view = FormView::from_form(&form, 60);
        assert_eq!(view.submit_label, SUBMITTING_LABEL);
        assert!(!view.submit_enabled);

        let text = view.render(60).expect("render");
        assert!(text.contains(SUBMITTING_LABEL));
        assert!(text.contains("[x] 2. TECH"));
    }
}
