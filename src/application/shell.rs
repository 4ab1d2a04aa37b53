//! Shell selection state and pane visibility.

use tracing::debug;

use crate::domain::articles::ArticleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// List and detail panes are mutually exclusive.
    Narrow,
    Wide,
}

impl Layout {
    pub fn from_narrow(narrow: bool) -> Self {
        if narrow { Layout::Narrow } else { Layout::Wide }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisiblePanes {
    pub list: bool,
    pub detail: bool,
}

#[derive(Debug, Clone)]
pub struct Shell {
    layout: Layout,
    selected: Option<ArticleId>,
    showing_detail: bool,
}

impl Shell {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            selected: None,
            showing_detail: false,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    pub fn selected(&self) -> Option<&ArticleId> {
        self.selected.as_ref()
    }

    pub fn is_showing_detail(&self) -> bool {
        self.showing_detail
    }

    /// Row selection: remember the id and bring the detail pane forward.
    pub fn select(&mut self, id: ArticleId) {
        debug!(article_id = %id, "article selected");
        self.selected = Some(id);
        self.showing_detail = true;
    }

    /// Back action. Returns to the list but keeps the selection.
    pub fn back(&mut self) {
        self.showing_detail = false;
    }

    /// Bring the detail pane forward for the current selection, if any.
    pub fn reopen(&mut self) -> bool {
        self.showing_detail = self.selected.is_some();
        self.showing_detail
    }

    pub fn visible_panes(&self) -> VisiblePanes {
        match self.layout {
            Layout::Wide => VisiblePanes {
                list: true,
                detail: true,
            },
            Layout::Narrow => VisiblePanes {
                list: !self.showing_detail,
                detail: self.showing_detail,
            },
        }
    }

    /// The back affordance only exists in narrow mode with the detail pane up.
    pub fn shows_back(&self) -> bool {
        self.layout == Layout::Narrow && self.showing_detail
    }
}
