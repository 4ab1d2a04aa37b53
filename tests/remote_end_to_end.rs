use std::sync::Arc;

use blogspace::application::api::BlogApi;
use blogspace::application::form::CreationForm;
use blogspace::cache::{CacheConfig, QueryClient, QueryStatus};
use blogspace::domain::articles::{COVER_PLACEHOLDER_URL, Category};
use blogspace::infra::remote::RemoteClient;
use httpmock::MockServer;
use time::macros::datetime;
use url::Url;

const CREATED_JSON: &str = r#"{"id":2,"title":"Side hustles","description":"Taxes included","content":"Track income.\n\nFile quarterly.","coverImage":"https://images.pexels.com/photos/3184465/pexels-photo-3184465.jpeg","category":["FINANCE","CAREER"],"date":"2026-01-15T09:30:00Z"}"#;

fn client_for(server: &MockServer) -> QueryClient {
    let base = Url::parse(&server.base_url()).expect("mock base url");
    let remote = RemoteClient::new(base)
        .expect("remote client")
        .with_clock(Arc::new(|| datetime!(2026-01-15 09:30:00 UTC)));
    let api: Arc<dyn BlogApi> = Arc::new(remote);
    QueryClient::new(api, CacheConfig::without_retry_delay())
}

#[tokio::test]
async fn form_submission_posts_once_with_date_and_placeholder_cover() {
    let server = MockServer::start_async().await;
    let post = server.mock_async(|when, then| {
        when.method("POST").path("/blogs").json_body_includes(format!(
            r#"{{"title":"Side hustles","coverImage":"{COVER_PLACEHOLDER_URL}","category":["FINANCE","CAREER"],"date":"2026-01-15T09:30:00Z"}}"#
        ));
        then.status(201)
            .header("content-type", "application/json")
            .body(CREATED_JSON);
    }).await;

    let client = client_for(&server);
    let mut form = CreationForm::new();
    form.open();
    form.set_title("Side hustles");
    form.set_description("Taxes included");
    form.set_content("Track income.\n\nFile quarterly.");
    form.toggle_category(Category::Finance);
    form.toggle_category(Category::Career);

    let article = form.submit(&client).await.expect("published");

    post.assert_async().await;
    assert_eq!(article.id.as_str(), "2");
    assert_eq!(article.paragraphs().len(), 2);
    assert!(!form.is_open());
}

#[tokio::test]
async fn server_errors_surface_after_retries() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method("GET").path("/blogs");
        then.status(500);
    }).await;

    let client = client_for(&server);
    let snapshot = client.articles().await;

    assert_eq!(snapshot.failure_count, 3);
    assert_eq!(snapshot.status, QueryStatus::Error);
    assert_eq!(
        snapshot.error.map(|failure| failure.to_string()),
        Some("Failed to fetch blogs".to_string())
    );
}
