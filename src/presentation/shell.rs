//! Shell chrome: header, hero, the visible panes and the footer.

use crate::application::shell::{Layout, Shell};
use crate::presentation::detail::DetailState;
use crate::presentation::form::FormView;
use crate::presentation::format::{columns, rule, wrap};
use crate::presentation::list::ListState;
use crate::presentation::views::{ShellTemplate, TemplateRenderError, render_template};

pub const BRAND: &str = "BlogSpace";
pub const TAGLINE: &str = "Finance & Career Insights";
pub const NEW_ARTICLE: &str = "[n] New Article";
pub const HERO: &str =
    "Stay updated with the latest trends in finance, accounting, and career growth";
pub const BACK_HINT: &str = "[b] Back to articles";
pub const FOOTER: &str = "© 2026 BlogSpace. All rights reserved.";

const COLUMN_GAP: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneWidths {
    pub list: usize,
    pub detail: usize,
}

/// Column budget for each pane. Narrow panes take the full width.
pub fn pane_widths(layout: Layout, width: usize) -> PaneWidths {
    match layout {
        Layout::Narrow => PaneWidths {
            list: width,
            detail: width,
        },
        Layout::Wide => {
            let list = width * 2 / 5;
            PaneWidths {
                list,
                detail: width.saturating_sub(list + COLUMN_GAP).max(1),
            }
        }
    }
}

/// Render one full frame. An open form replaces the panes.
pub fn render_screen(
    shell: &Shell,
    list: &ListState,
    detail: &DetailState,
    form: Option<&FormView>,
    width: usize,
) -> Result<String, TemplateRenderError> {
    let body = match form {
        Some(form) => form.render(width)?,
        None => render_panes(shell, list, detail, width)?,
    };

    let mut hero = vec![BRAND.to_string()];
    hero.extend(wrap(HERO, width));

    render_template(&ShellTemplate {
        brand: BRAND,
        tagline: TAGLINE,
        new_article: NEW_ARTICLE,
        hero: &hero,
        back_hint: form.is_none() && shell.shows_back(),
        body: &body,
        footer: FOOTER,
        rule: rule(width),
    })
}

fn render_panes(
    shell: &Shell,
    list: &ListState,
    detail: &DetailState,
    width: usize,
) -> Result<String, TemplateRenderError> {
    let widths = pane_widths(shell.layout(), width);
    let visible = shell.visible_panes();

    match (visible.list, visible.detail) {
        (true, true) => Ok(columns(
            &list.render(widths.list)?,
            &detail.render(widths.detail)?,
            widths.list,
            COLUMN_GAP,
        )),
        (false, true) => detail.render(widths.detail),
        _ => list.render(widths.list),
    }
}
