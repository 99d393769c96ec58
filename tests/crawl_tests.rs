//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the crawled site and drive the
//! full crawl cycle end-to-end: queue, fetch, parse, index, history.

use loupe::config::{Config, CrawlSettings};
use loupe::crawler::Crawler;
use loupe::state::{CancelToken, QueueState, SiteStatus};
use loupe::storage::{RunStatus, SqliteStorage, Store};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test configuration pointed at the given database with no politeness delay
fn test_config(db_path: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.database.path = db_path.display().to_string();
    config.crawler.crawl_delay_ms = 0;
    config.crawler.request_timeout_secs = 5;
    config
}

fn fast_settings(max_depth: u32, respect_robots: bool) -> CrawlSettings {
    CrawlSettings {
        max_depth,
        crawl_delay: Duration::from_millis(0),
        respect_robots,
    }
}

/// Registers a project scoped to the mock server's host and one site under it
fn register_site(
    storage: &Arc<Mutex<SqliteStorage>>,
    base_url: &str,
    settings: &CrawlSettings,
) -> i64 {
    let host = url::Url::parse(base_url)
        .expect("parse base url")
        .host_str()
        .expect("base url has a host")
        .to_string();

    let mut storage = storage.lock().unwrap();
    let project_id = storage
        .create_project("intranet", &[host.clone()], settings)
        .expect("create project");
    storage
        .create_site(project_id, &host, base_url)
        .expect("create site")
}

fn html_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}

async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        // set_body_raw: wiremock's body setters override a content-type set
        // via insert_header, so the mime must ride along with the body
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_indexes_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html_page(
            "Accueil",
            &format!(
                r#"<p>Bienvenue sur l'intranet</p>
                <a href="{base}/guide">Guide</a>
                <a href="{base}/contact">Contact</a>"#
            ),
        ),
    )
    .await;
    mount_page(
        &server,
        "/guide",
        html_page("Guide réseau", "<p>Configuration du réseau local</p>"),
    )
    .await;
    mount_page(&server, "/contact", html_page("Contact", "<p>Nous écrire</p>")).await;

    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("loupe.db");
    let storage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).expect("open db")));
    let site_id = register_site(&storage, &base, &fast_settings(2, false));

    let crawler = Crawler::new(
        Arc::new(test_config(&db_path)),
        Arc::clone(&storage),
        CancelToken::new(),
    )
    .expect("build crawler");
    let report = crawler.crawl_site(site_id, None).await.expect("crawl failed");

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.counters.urls_crawled, 3);
    assert_eq!(report.counters.urls_successful, 3);
    assert_eq!(report.counters.urls_failed, 0);
    assert_eq!(report.counters.urls_discovered, 2);
    assert!(report.errors.is_empty());

    let storage = storage.lock().unwrap();
    assert_eq!(
        storage
            .count_documents_for_site(site_id)
            .expect("count documents"),
        3
    );

    let site = storage
        .get_site(site_id)
        .expect("get site")
        .expect("site exists");
    assert_eq!(site.status, SiteStatus::Active);
    assert!(site.last_crawled.is_some());

    let history = storage.list_history(None, 10).expect("list history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RunStatus::Completed);
    assert_eq!(history[0].urls_successful, 3);
    assert!(history[0].completed_at.is_some());

    let documents = storage
        .list_documents_for_site(site_id)
        .expect("list documents");
    let guide = documents
        .iter()
        .find(|d| d.url.ends_with("/guide"))
        .expect("guide page indexed");
    assert_eq!(guide.title.as_deref(), Some("Guide réseau"));
    assert!(guide.content.contains("réseau local"));
}

#[tokio::test]
async fn test_depth_limit_stops_discovery() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Chain: / -> level1 -> level2 -> level3, with max_depth = 2
    mount_page(
        &server,
        "/",
        html_page("Racine", &format!(r#"<a href="{base}/level1">N1</a>"#)),
    )
    .await;
    mount_page(
        &server,
        "/level1",
        html_page("Niveau 1", &format!(r#"<a href="{base}/level2">N2</a>"#)),
    )
    .await;
    mount_page(
        &server,
        "/level2",
        html_page("Niveau 2", &format!(r#"<a href="{base}/level3">N3</a>"#)),
    )
    .await;

    // level3 sits at depth 3 and must never be fetched
    Mock::given(method("GET"))
        .and(path("/level3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Niveau 3", "<p>Trop profond</p>"))
                .insert_header("content-type", "text/html"),
        )
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("loupe.db");
    let storage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).expect("open db")));
    let site_id = register_site(&storage, &base, &fast_settings(2, false));

    let crawler = Crawler::new(
        Arc::new(test_config(&db_path)),
        Arc::clone(&storage),
        CancelToken::new(),
    )
    .expect("build crawler");
    let report = crawler.crawl_site(site_id, None).await.expect("crawl failed");

    assert_eq!(report.counters.urls_crawled, 3);
    assert_eq!(report.counters.urls_successful, 3);
    // level2 is at the depth limit, so its links are not enqueued
    assert_eq!(report.counters.urls_discovered, 2);

    let storage = storage.lock().unwrap();
    assert_eq!(
        storage
            .count_documents_for_site(site_id)
            .expect("count documents"),
        3
    );
}

#[tokio::test]
async fn test_page_budget_caps_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (1..=5)
        .map(|i| format!(r#"<a href="{base}/page{i}">Page {i}</a>"#))
        .collect();
    mount_page(&server, "/", html_page("Accueil", &links)).await;
    for i in 1..=5 {
        mount_page(
            &server,
            &format!("/page{}", i),
            html_page(&format!("Page {}", i), "<p>Contenu</p>"),
        )
        .await;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("loupe.db");
    let storage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).expect("open db")));
    let site_id = register_site(&storage, &base, &fast_settings(2, false));

    let crawler = Crawler::new(
        Arc::new(test_config(&db_path)),
        Arc::clone(&storage),
        CancelToken::new(),
    )
    .expect("build crawler");
    let report = crawler
        .crawl_site(site_id, Some(2))
        .await
        .expect("crawl failed");

    // The budget counts dequeued URLs, so only the seed and one link ran
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.counters.urls_crawled, 2);
    assert_eq!(report.counters.urls_successful, 2);
    assert_eq!(report.counters.urls_discovered, 5);

    let storage = storage.lock().unwrap();
    assert_eq!(
        storage
            .count_documents_for_site(site_id)
            .expect("count documents"),
        2
    );
    assert_eq!(
        storage
            .count_queue_entries(site_id, QueueState::Pending)
            .expect("count pending"),
        4
    );
}

#[tokio::test]
async fn test_failed_fetch_does_not_abort_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html_page(
            "Accueil",
            &format!(
                r#"<a href="{base}/ok">Valide</a>
                <a href="{base}/broken">Cassé</a>"#
            ),
        ),
    )
    .await;
    mount_page(&server, "/ok", html_page("Valide", "<p>Tout va bien</p>")).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("loupe.db");
    let storage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).expect("open db")));
    let site_id = register_site(&storage, &base, &fast_settings(2, false));

    let crawler = Crawler::new(
        Arc::new(test_config(&db_path)),
        Arc::clone(&storage),
        CancelToken::new(),
    )
    .expect("build crawler");
    let report = crawler.crawl_site(site_id, None).await.expect("crawl failed");

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.counters.urls_crawled, 3);
    assert_eq!(report.counters.urls_successful, 2);
    assert_eq!(report.counters.urls_failed, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("/broken"));
    assert!(report.errors[0].contains("HTTP 500"));

    let storage = storage.lock().unwrap();
    assert_eq!(
        storage
            .count_documents_for_site(site_id)
            .expect("count documents"),
        2
    );
    assert_eq!(
        storage
            .count_queue_entries(site_id, QueueState::Failed)
            .expect("count failed"),
        1
    );

    let history = storage.list_history(None, 10).expect("list history");
    assert_eq!(history[0].urls_failed, 1);
}

#[tokio::test]
async fn test_robots_rules_block_disallowed_paths() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"),
        )
        .mount(&server)
        .await;

    mount_page(
        &server,
        "/",
        html_page(
            "Accueil",
            &format!(
                r#"<a href="{base}/public">Public</a>
                <a href="{base}/admin">Admin</a>"#
            ),
        ),
    )
    .await;
    mount_page(&server, "/public", html_page("Public", "<p>Page publique</p>")).await;

    // The disallowed page must never be fetched
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Admin", "<p>Privé</p>"))
                .insert_header("content-type", "text/html"),
        )
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("loupe.db");
    let storage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).expect("open db")));
    let site_id = register_site(&storage, &base, &fast_settings(2, true));

    let crawler = Crawler::new(
        Arc::new(test_config(&db_path)),
        Arc::clone(&storage),
        CancelToken::new(),
    )
    .expect("build crawler");
    let report = crawler.crawl_site(site_id, None).await.expect("crawl failed");

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.counters.urls_crawled, 3);
    assert_eq!(report.counters.urls_successful, 2);
    assert_eq!(report.counters.urls_failed, 1);

    let storage = storage.lock().unwrap();
    assert_eq!(
        storage
            .count_documents_for_site(site_id)
            .expect("count documents"),
        2
    );
    assert_eq!(
        storage
            .count_queue_entries(site_id, QueueState::Failed)
            .expect("count failed"),
        1
    );
}

#[tokio::test]
async fn test_recrawl_skips_indexed_urls() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html_page(
            "Accueil",
            &format!(
                r#"<a href="{base}/guide">Guide</a>
                <a href="{base}/contact">Contact</a>"#
            ),
        ),
    )
    .await;
    mount_page(&server, "/guide", html_page("Guide", "<p>Guide</p>")).await;
    mount_page(&server, "/contact", html_page("Contact", "<p>Contact</p>")).await;

    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("loupe.db");
    let storage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).expect("open db")));
    let site_id = register_site(&storage, &base, &fast_settings(2, false));

    let crawler = Crawler::new(
        Arc::new(test_config(&db_path)),
        Arc::clone(&storage),
        CancelToken::new(),
    )
    .expect("build crawler");

    let first = crawler.crawl_site(site_id, None).await.expect("first crawl");
    assert_eq!(first.counters.urls_successful, 3);

    let second = crawler
        .crawl_site(site_id, None)
        .await
        .expect("second crawl");
    assert_eq!(second.status, RunStatus::Completed);
    assert_eq!(second.counters.urls_crawled, 3);
    assert_eq!(second.counters.urls_skipped, 3);
    assert_eq!(second.counters.urls_successful, 0);
    assert_eq!(second.counters.urls_discovered, 0);

    let storage = storage.lock().unwrap();
    // No duplicate documents from the second pass
    assert_eq!(
        storage
            .count_documents_for_site(site_id)
            .expect("count documents"),
        3
    );

    let history = storage.list_history(None, 10).expect("list history");
    assert_eq!(history.len(), 2);
    // Newest first: the skip-only run leads
    assert_eq!(history[0].urls_skipped, 3);
    assert_eq!(history[1].urls_successful, 3);
}

#[tokio::test]
async fn test_external_links_stay_out_of_scope() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html_page(
            "Accueil",
            &format!(
                r#"<a href="{base}/interne">Interne</a>
                <a href="http://exterieur.example/page">Externe</a>"#
            ),
        ),
    )
    .await;
    mount_page(&server, "/interne", html_page("Interne", "<p>Chez nous</p>")).await;

    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("loupe.db");
    let storage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).expect("open db")));
    let site_id = register_site(&storage, &base, &fast_settings(2, false));

    let crawler = Crawler::new(
        Arc::new(test_config(&db_path)),
        Arc::clone(&storage),
        CancelToken::new(),
    )
    .expect("build crawler");
    let report = crawler.crawl_site(site_id, None).await.expect("crawl failed");

    assert_eq!(report.counters.urls_discovered, 1);
    assert_eq!(report.counters.urls_successful, 2);

    let storage = storage.lock().unwrap();
    let rows = storage.queue_snapshot(None, 100).expect("queue snapshot");
    assert!(
        rows.iter().all(|row| !row.url.contains("exterieur")),
        "external URL must not be enqueued"
    );
}

#[tokio::test]
async fn test_cancelled_before_start_records_cancelled_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    // A pre-cancelled run must not touch the site at all
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Accueil", "<p>Jamais lu</p>"))
                .insert_header("content-type", "text/html"),
        )
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("loupe.db");
    let storage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).expect("open db")));
    let site_id = register_site(&storage, &base, &fast_settings(2, false));

    let cancel = CancelToken::new();
    cancel.cancel();

    let crawler = Crawler::new(
        Arc::new(test_config(&db_path)),
        Arc::clone(&storage),
        cancel,
    )
    .expect("build crawler");
    let report = crawler.crawl_site(site_id, None).await.expect("crawl failed");

    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(report.counters.urls_crawled, 0);

    let storage = storage.lock().unwrap();
    let site = storage
        .get_site(site_id)
        .expect("get site")
        .expect("site exists");
    // The claim is released even when nothing ran
    assert_eq!(site.status, SiteStatus::Active);

    let history = storage.list_history(None, 10).expect("list history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RunStatus::Cancelled);
}

#[tokio::test]
async fn test_media_links_indexed_as_documents() {
    let server = MockServer::start().await;
    let base = server.uri();

    // logo.png is indexed as an image; /export serves an unsupported type;
    // rapport.pdf is filtered out at discovery by its extension
    mount_page(
        &server,
        "/",
        html_page(
            "Galerie",
            &format!(
                r#"<a href="{base}/images/logo.png">Logo</a>
                <a href="{base}/export">Export</a>
                <a href="{base}/rapport.pdf">Rapport</a>"#
            ),
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/images/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, 0x50, 0x4E, 0x47])
                .insert_header("content-type", "image/png"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/export"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x25, 0x50, 0x44, 0x46])
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rapport.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("loupe.db");
    let storage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).expect("open db")));
    let site_id = register_site(&storage, &base, &fast_settings(2, false));

    let crawler = Crawler::new(
        Arc::new(test_config(&db_path)),
        Arc::clone(&storage),
        CancelToken::new(),
    )
    .expect("build crawler");
    let report = crawler.crawl_site(site_id, None).await.expect("crawl failed");

    assert_eq!(report.counters.urls_discovered, 2);
    assert_eq!(report.counters.urls_crawled, 3);
    assert_eq!(report.counters.urls_successful, 2);
    assert_eq!(report.counters.urls_failed, 1);
    assert!(report.errors[0].contains("Unsupported content type"));

    let storage = storage.lock().unwrap();
    let documents = storage
        .list_documents_for_site(site_id)
        .expect("list documents");
    assert_eq!(documents.len(), 2);

    let logo = documents
        .iter()
        .find(|d| d.url.ends_with("logo.png"))
        .expect("image indexed");
    assert_eq!(logo.content_type, "image");
    assert_eq!(logo.title.as_deref(), Some("logo"));
    assert!(logo.content.is_empty());
}
