//! Interactive browse loop.
//!
//! Reads one command per line from stdin and redraws the whole frame after
//! every command and every cache change.

use blogspace::{
    application::{
        error::AppError,
        form::{CreationForm, FormError},
        shell::{Layout, Shell},
    },
    cache::{QueryClient, QueryObserver, QuerySnapshot},
    config::Settings,
    domain::articles::{Article, Category},
    infra::error::InfraError,
    presentation::{
        detail::{DetailState, clipboard_escape},
        form::FormView,
        list::ListState,
        shell::{pane_widths, render_screen},
    },
};
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{debug, info};

const CLEAR: &str = "\x1b[2J\x1b[H";

const BROWSE_HELP: &str =
    "<n> open row · o reopen · b back · r retry · s share · new · l layout · q quit";
const FORM_HELP: &str = "title|desc|cover|content <text> · + <paragraph> · 1-7 category · p publish · c cancel";

enum Flow {
    Continue,
    Quit,
}

struct Browser<'a> {
    client: &'a QueryClient,
    settings: &'a Settings,
    shell: Shell,
    form: CreationForm,
    articles: QueryObserver<Vec<Article>>,
    detail: Option<QueryObserver<Article>>,
    notice: Option<String>,
    clipboard: Option<String>,
}

pub async fn run(client: &QueryClient, settings: &Settings) -> Result<(), AppError> {
    let mut changes = client.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    let mut browser = Browser {
        client,
        settings,
        shell: Shell::new(Layout::from_narrow(settings.layout.narrow)),
        form: CreationForm::new(),
        articles: client.observe_articles(),
        detail: None,
        notice: None,
        clipboard: None,
    };
    info!(layout = ?browser.shell.layout(), "browse session started");

    browser.draw(&mut stdout).await?;
    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.map_err(InfraError::from)? else {
                    break;
                };
                if let Flow::Quit = browser.handle(line.trim(), &mut stdout).await? {
                    break;
                }
            }
        }
        browser.draw(&mut stdout).await?;
    }

    info!("browse session finished");
    Ok(())
}

impl Browser<'_> {
    fn width(&self) -> usize {
        self.settings.layout.width
    }

    fn list_state(&self) -> ListState {
        let widths = pane_widths(self.shell.layout(), self.width());
        ListState::from_snapshot(
            &self.articles.snapshot(),
            self.shell.selected(),
            OffsetDateTime::now_utc(),
            widths.list,
        )
    }

    fn detail_snapshot(&self) -> QuerySnapshot<Article> {
        self.detail
            .as_ref()
            .map(QueryObserver::snapshot)
            .unwrap_or_else(QuerySnapshot::idle)
    }

    fn detail_state(&self) -> DetailState {
        let widths = pane_widths(self.shell.layout(), self.width());
        DetailState::from_snapshot(
            self.shell.selected(),
            &self.detail_snapshot(),
            &self.settings.api.share_base_url,
            widths.detail,
        )
    }

    fn frame(&self) -> Result<String, AppError> {
        let form = self
            .form
            .is_open()
            .then(|| FormView::from_form(&self.form, self.width()));
        let mut frame = render_screen(
            &self.shell,
            &self.list_state(),
            &self.detail_state(),
            form.as_ref(),
            self.width(),
        )?;

        if let Some(notice) = self.notice.as_ref() {
            frame.push_str(notice);
            frame.push('\n');
        }
        frame.push_str(if self.form.is_open() {
            FORM_HELP
        } else {
            BROWSE_HELP
        });
        frame.push_str("\n> ");
        Ok(frame)
    }

    async fn draw(&mut self, stdout: &mut Stdout) -> Result<(), AppError> {
        let mut out = String::from(CLEAR);
        out.push_str(&self.frame()?);
        if let Some(escape) = self.clipboard.take() {
            out.push_str(&escape);
        }
        write_out(stdout, &out).await
    }

    async fn handle(&mut self, line: &str, stdout: &mut Stdout) -> Result<Flow, AppError> {
        self.notice = None;
        if self.form.is_open() {
            self.handle_form(line, stdout).await?;
            return Ok(Flow::Continue);
        }

        debug!(command = line, "browse command");
        match line {
            "q" | "quit" => return Ok(Flow::Quit),
            "" => {}
            "o" | "open" => {
                if !self.shell.reopen() {
                    self.notice = Some("No article selected".to_string());
                }
            }
            "b" | "back" => self.shell.back(),
            "r" | "retry" => self.retry(),
            "s" | "share" => self.share(),
            "n" | "new" => self.form.open(),
            "l" | "layout" => {
                let next = match self.shell.layout() {
                    Layout::Narrow => Layout::Wide,
                    Layout::Wide => Layout::Narrow,
                };
                self.shell.set_layout(next);
            }
            other => match other.parse::<usize>() {
                Ok(index) => self.select(index),
                Err(_) => self.notice = Some(format!("Unknown command `{other}`")),
            },
        }
        Ok(Flow::Continue)
    }

    fn select(&mut self, index: usize) {
        let list = self.list_state();
        let Some(id) = list.id_at(index).cloned() else {
            self.notice = Some(format!("No article at row {index}"));
            return;
        };
        self.detail = self.client.observe_article(Some(&id));
        self.shell.select(id);
    }

    /// Retry whichever visible pane is in its error state.
    fn retry(&mut self) {
        let visible = self.shell.visible_panes();
        if visible.detail {
            if let Some(detail) = self.detail.as_ref() {
                if detail.snapshot().is_error() {
                    detail.refetch();
                    return;
                }
            }
        }
        if visible.list {
            self.articles.refetch();
        }
    }

    fn share(&mut self) {
        match self.detail_state() {
            DetailState::Loaded(detail) if self.shell.visible_panes().detail => {
                self.clipboard = Some(clipboard_escape(&detail.share_url));
                self.notice = Some(format!("Link copied: {}", detail.share_url));
            }
            _ => self.notice = Some("Open an article to share it".to_string()),
        }
    }

    async fn handle_form(&mut self, line: &str, stdout: &mut Stdout) -> Result<(), AppError> {
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        match command {
            "c" | "cancel" => self.form.close(),
            "p" | "publish" => self.publish(stdout).await?,
            "title" => self.form.set_title(rest),
            "desc" | "description" => self.form.set_description(rest),
            "cover" => self.form.set_cover_image(rest),
            "content" => self.form.set_content(rest.replace("\\n", "\n")),
            "+" => {
                let mut content = self.form.values().content.clone();
                if !content.is_empty() {
                    content.push_str("\n\n");
                }
                content.push_str(rest);
                self.form.set_content(content);
            }
            other => match other.parse::<usize>() {
                Ok(index) if (1..=Category::KNOWN.len()).contains(&index) => {
                    self.form.toggle_category(Category::KNOWN[index - 1].clone());
                }
                _ => self.notice = Some(format!("Unknown form command `{other}`")),
            },
        }
        Ok(())
    }

    async fn publish(&mut self, stdout: &mut Stdout) -> Result<(), AppError> {
        let draft = match self.form.begin_submit() {
            Ok(draft) => draft,
            Err(FormError::Invalid(issues)) => {
                self.notice = Some(
                    issues
                        .iter()
                        .map(|issue| issue.message())
                        .collect::<Vec<_>>()
                        .join("; "),
                );
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        // Show "Publishing..." while the request is out.
        self.draw(stdout).await?;
        let outcome = self.client.create_article(&draft).await;
        match self.form.finish_submit(outcome) {
            Ok(article) => {
                self.notice = Some(format!("Published \"{}\"", article.title));
            }
            Err(FormError::Request(_)) => {}
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }
}

async fn write_out(stdout: &mut Stdout, text: &str) -> Result<(), AppError> {
    stdout
        .write_all(text.as_bytes())
        .await
        .map_err(InfraError::from)?;
    stdout
        .flush()
        .await
        .map_err(InfraError::from)?;
    Ok(())
}
