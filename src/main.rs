use std::{process, sync::Arc};

use blogspace::{
    application::{
        api::BlogApi,
        error::AppError,
        form::{CreationForm, FormError},
    },
    cache::{CacheConfig, QueryClient, QueryStatus},
    config::{self, CreateArgs, Settings},
    domain::articles::ArticleId,
    infra::{remote::RemoteClient, telemetry},
    presentation::{detail::DetailState, list::ListState},
};
use time::OffsetDateTime;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

mod browse;
mod io;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(error = %error, chain = ?report.messages, "application error");
    } else {
        let subscriber = tracing_fmt()
            .with_writer(std::io::stderr)
            .with_max_level(Level::ERROR)
            .finish();
        let dispatch = Dispatch::new(subscriber);
        dispatcher::with_default(&dispatch, || {
            error!(error = %error, chain = ?report.messages, "application error");
        });
    }
    eprintln!("{}: {error}", error.presentation_message());
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args.command.unwrap_or(config::Command::Browse);

    telemetry::init(&settings.logging)?;
    let client = build_query_client(&settings)?;

    match command {
        config::Command::Browse => browse::run(&client, &settings).await,
        config::Command::List => run_list(&client, &settings).await,
        config::Command::Show(args) => run_show(&client, &settings, ArticleId::new(args.id)).await,
        config::Command::Create(args) => run_create(&client, args).await,
    }
}

fn build_query_client(settings: &Settings) -> Result<QueryClient, AppError> {
    let remote = RemoteClient::new(settings.api.base_url.clone())?;
    info!(base_url = %remote.base(), "remote blog collection configured");
    let api: Arc<dyn BlogApi> = Arc::new(remote);
    Ok(QueryClient::new(api, CacheConfig::from(&settings.cache)))
}

async fn run_list(client: &QueryClient, settings: &Settings) -> Result<(), AppError> {
    let snapshot = client.articles().await;
    if let (QueryStatus::Error, Some(failure)) = (snapshot.status, snapshot.error.clone()) {
        return Err(failure.into());
    }

    let state = ListState::from_snapshot(
        &snapshot,
        None,
        OffsetDateTime::now_utc(),
        settings.layout.width,
    );
    print!("{}", state.render(settings.layout.width)?);
    Ok(())
}

async fn run_show(
    client: &QueryClient,
    settings: &Settings,
    id: ArticleId,
) -> Result<(), AppError> {
    let snapshot = client.article(Some(&id)).await;
    if let (QueryStatus::Error, Some(failure)) = (snapshot.status, snapshot.error.clone()) {
        return Err(failure.into());
    }

    let state = DetailState::from_snapshot(
        Some(&id),
        &snapshot,
        &settings.api.share_base_url,
        settings.layout.width,
    );
    print!("{}", state.render(settings.layout.width)?);
    Ok(())
}

async fn run_create(client: &QueryClient, args: CreateArgs) -> Result<(), AppError> {
    let content = io::read_value(args.content, args.content_file)?;
    let categories = io::parse_categories(&args.categories)?;

    let mut form = CreationForm::new();
    form.open();
    form.set_title(args.title);
    form.set_description(args.description);
    form.set_content(content);
    if let Some(cover) = args.cover_image {
        form.set_cover_image(cover);
    }
    for category in categories {
        if !form.is_selected(&category) {
            form.toggle_category(category);
        }
    }

    match form.submit(client).await {
        Ok(article) => {
            println!("Published \"{}\" ({})", article.title, article.id);
            Ok(())
        }
        Err(FormError::Invalid(issues)) => {
            for issue in &issues {
                eprintln!("* {issue}");
            }
            Err(FormError::Invalid(issues).into())
        }
        Err(err) => Err(err.into()),
    }
}
