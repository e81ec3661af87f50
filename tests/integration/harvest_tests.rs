//! Integration tests for the harvester
//!
//! These tests use wiremock to serve listing and detail pages and run full
//! harvest passes into a temporary SQLite database.

use job_harvest::config::{load_config, Config};
use job_harvest::crawler::{run_harvest, Harvester};
use job_harvest::storage::{open_storage, JobStore};
use job_harvest::trigger::{handle_harvest, handle_purge};
use rusqlite::{params, Connection};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LANCERS_ITEM_SELECTORS: &str = r#"
list-selector = ".p-search-job-media"
title-selector = "a.p-search-job-media__title"
link-selector = "a.p-search-job-media__title"
"#;

/// Writes a config file with fast harvester settings and the given sites
fn write_config(dir: &TempDir, harvester_extra: &str, sites: &str) -> (Config, PathBuf) {
    let database_path = dir.path().join("jobs.db");
    let content = format!(
        r#"
[harvester]
page-delay-ms = 0
backoff-base-ms = 0
fetch-retries = 0
list-timeout-ms = 2000
detail-timeout-ms = 2000
{harvester_extra}

[output]
database-path = "{db}"

{sites}
"#,
        db = database_path.display()
    );

    let config_path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&config_path).expect("Failed to create config");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");

    let config = load_config(&config_path).expect("Config should load");
    (config, database_path)
}

fn lancers_site(base_url: &str, pages: &str) -> String {
    format!(
        r#"
[[site]]
id = "lancers"
base-url = "{base_url}"
pages = {pages}
max-items-per-page = 10
{selectors}
"#,
        selectors = LANCERS_ITEM_SELECTORS
    )
}

fn listing_item(href: &str, title: &str) -> String {
    format!(
        r#"<div class="p-search-job-media"><a class="p-search-job-media__title" href="{href}">{title}</a></div>"#
    )
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn stored_rows(database_path: &Path) -> Vec<(String, String, String, String)> {
    let conn = Connection::open(database_path).expect("Failed to open database");
    let mut stmt = conn
        .prepare("SELECT url, title, source_host, price FROM jobs ORDER BY id")
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
        .unwrap();
    rows.map(|row| row.unwrap()).collect()
}

#[tokio::test]
async fn test_duplicate_postings_keep_the_last_title() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html_page(&format!(
            "{}{}",
            listing_item("/work/detail/1?ref=top", "A"),
            listing_item("/work/detail/1/", "B"),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/work/detail/1"))
        .respond_with(html_page(
            r#"<dl class="c-definition-list"><dt>提示した予算</dt><dd>5万円</dd></dl>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/work/detail/1/"))
        .respond_with(html_page(
            r#"<dl class="c-definition-list"><dt>提示した予算</dt><dd>8万円</dd></dl>"#,
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (config, database_path) =
        write_config(&dir, "", &lancers_site(&format!("{}/search", base), "[1]"));

    let summary = run_harvest(&config, None).await.expect("Harvest should succeed");

    assert_eq!(summary.collected, 2);
    assert_eq!(summary.inserted, 1);

    let rows = stored_rows(&database_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, format!("{}/work/detail/1", base));
    assert_eq!(rows[0].1, "B");
    assert_eq!(rows[0].2, "127.0.0.1");
    assert_eq!(rows[0].3, "提示した予算\n8万円");
}

#[tokio::test]
async fn test_empty_site_stops_its_pages_and_others_continue() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/fs"))
        .and(query_param("page", "2"))
        .respond_with(html_page("never requested"))
        .with_priority(1)
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fs"))
        .respond_with(html_page("<p>no postings today</p>"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/lc"))
        .respond_with(html_page(&listing_item("/work/detail/9", "Rust API")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/work/detail/9"))
        .respond_with(html_page(
            r#"<div class="c-article__body">Build an API</div>"#,
        ))
        .mount(&server)
        .await;

    let sites = format!(
        r#"
[[site]]
id = "freelance-start"
base-url = "{base}/fs"
list-selector = ".card"
title-selector = "h3"
link-attr = "data-url"
pages = [1, 2]
max-items-per-page = 10
{lancers}
"#,
        lancers = lancers_site(&format!("{}/lc", base), "[1]")
    );

    let dir = TempDir::new().unwrap();
    let (config, database_path) = write_config(&dir, "", &sites);

    let summary = run_harvest(&config, None).await.expect("Harvest should succeed");

    assert_eq!(summary.collected, 1);
    assert_eq!(summary.inserted, 1);

    let rows = stored_rows(&database_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1, "Rust API");
}

#[tokio::test]
async fn test_global_cap_limits_collected_items() {
    let server = MockServer::start().await;
    let base = server.uri();

    let listing: String = (1..=5)
        .map(|n| listing_item(&format!("/work/detail/{}", n), &format!("Job {}", n)))
        .collect();
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html_page(&listing))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(html_page(&listing))
        .with_priority(1)
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/work/detail/\d+$"))
        .respond_with(html_page(r#"<div class="p-article__body">details</div>"#))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (config, database_path) = write_config(
        &dir,
        "max-total-items = 2\ndetail-concurrency = 2",
        &lancers_site(&format!("{}/search", base), "[1, 2]"),
    );

    let summary = run_harvest(&config, None).await.expect("Harvest should succeed");

    assert_eq!(summary.collected, 2);
    assert_eq!(summary.inserted, 2);
    let titles: Vec<String> = stored_rows(&database_path)
        .into_iter()
        .map(|row| row.1)
        .collect();
    assert_eq!(titles, vec!["Job 1", "Job 2"]);
}

#[tokio::test]
async fn test_crowdworks_embedded_listing_end_to_end() {
    let server = MockServer::start().await;
    let base = server.uri();

    let payload = r#"{"searchResult":{"job_offers":[{"job_offer":{"id":42,"title":"Vue 改修"}}]}}"#;
    Mock::given(method("GET"))
        .and(path("/public/jobs/group/development"))
        .respond_with(html_page(&format!(
            r#"<div id="vue-container" data='{}'></div>"#,
            payload
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public/jobs/42"))
        .respond_with(html_page(
            r#"<table class="job_offer_detail_table"><tr><td>管理画面の改修</td></tr></table>
               <div class="job_offer_summary"><table class="summary">
                 <tr><th>固定報酬制</th><td>50,000円</td></tr>
               </table></div>"#,
        ))
        .mount(&server)
        .await;

    let sites = format!(
        r#"
[[site]]
id = "crowdworks"
base-url = "{base}/public/jobs/group/development"
list-selector = "li.job"
title-selector = "h3 a"
link-selector = "h3 a"
pages = [1]
max-items-per-page = 15
"#
    );

    let dir = TempDir::new().unwrap();
    let (config, database_path) = write_config(&dir, "", &sites);

    let response = handle_harvest(&config, Some(r#"{"site":"crowdworks"}"#)).await;
    assert!(response.is_success());
    assert_eq!(response.body.collected, Some(1));
    assert_eq!(response.body.inserted, Some(1));

    let rows = stored_rows(&database_path);
    assert_eq!(rows[0].0, format!("{}/public/jobs/42", base));
    assert_eq!(rows[0].1, "Vue 改修");
    assert_eq!(rows[0].3, "固定報酬制\n50,000円");
}

#[tokio::test]
async fn test_unknown_site_harvests_all_sites() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/lc"))
        .respond_with(html_page(&listing_item("/work/detail/3", "Job 3")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/work/detail/3"))
        .respond_with(html_page(""))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (config, _database_path) =
        write_config(&dir, "", &lancers_site(&format!("{}/lc", base), "[1]"));

    let response = handle_harvest(&config, Some(r#"{"site":"indeed"}"#)).await;
    assert!(response.is_success());
    assert_eq!(response.body.collected, Some(1));
}

#[tokio::test]
async fn test_rerun_updates_rows_and_purge_keeps_fresh_ones() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/lc"))
        .respond_with(html_page(&listing_item("/work/detail/7", "Go backend")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/work/detail/7"))
        .respond_with(html_page(
            r#"<dl class="c-definition-list"><dt>希望納期</dt><dd>3ヶ月</dd></dl>"#,
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (config, database_path) =
        write_config(&dir, "", &lancers_site(&format!("{}/lc", base), "[1]"));

    let harvester = Harvester::new(&config).expect("Harvester should build");
    let mut store = open_storage(&database_path).expect("Store should open");

    let first = harvester.run(&mut store, None).await;
    let second = harvester.run(&mut store, None).await;
    assert_eq!(first.inserted, 1);
    assert_eq!(second.inserted, 1);
    assert_eq!(store.count_jobs().unwrap(), 1);

    // Age the row past the retention window.
    let conn = Connection::open(&database_path).unwrap();
    conn.execute(
        "UPDATE jobs SET created_at = ?1",
        params!["2000-01-01T00:00:00Z"],
    )
    .unwrap();

    let purge = handle_purge(&config);
    assert!(purge.is_success());
    let report = purge.body.report.expect("Purge should report counts");
    assert_eq!(report.deleted, 1);
    assert_eq!(report.remaining, 0);
}
