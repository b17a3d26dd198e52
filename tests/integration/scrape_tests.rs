//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the forum and drive a full
//! harvest end-to-end with a frozen clock.

use chrono::{DateTime, NaiveDate, Utc};
use forocoches_feed::config::{Config, ListingFormat};
use forocoches_feed::crawler::Fetcher;
use forocoches_feed::{FixedClock, Harvester, Item, ScrapeError};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 09:30 UTC is 10:30 on the forum's +01:00 clock
fn clock() -> Arc<FixedClock> {
    let now = DateTime::parse_from_rfc3339("2024-05-01T09:30:00Z")
        .unwrap()
        .with_timezone(&Utc);
    Arc::new(FixedClock::new(now, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.scraper.max_oldness_seconds = 1000;
    config.scraper.maximum_items_to_collect = 25;
    config.http.min_delay_ms = 0;
    config.http.max_delay_ms = 0;
    config.http.timeout_secs = 5;
    config.site.base_url = format!("{}/", server.uri());
    config.site.sampled_forums = 0;
    config.site.timezone = "+01:00".to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn homepage(forum_ids: &[u32]) -> String {
    forum_ids
        .iter()
        .map(|id| format!(r#"<a href="/foro/forumdisplay.php?f={id}">Foro {id}</a>"#))
        .collect()
}

fn forum_listing(post_ids: &[u32]) -> String {
    let rows: String = post_ids
        .iter()
        .map(|id| {
            format!(
                r#"<tr><td><a href="showthread.php?t={id}">Tema {id}</a>
                   <a href="showthread.php?p={id}#post{id}">Ir al último mensaje</a></td></tr>"#
            )
        })
        .collect();
    format!(r#"<table id="threadbits_forum">{}</table>"#, rows)
}

fn post(id: u32, date: &str, body: &str) -> String {
    format!(
        r##"<div class="postbit_wrapper">
            <span class="postdate old">{date}</span>
            <a href="#" onclick='copyToClipboard("https://"+window.location.hostname+"/foro/showthread.php?p={id}#post{id}");return false;'>#{id}</a>
            <div id="post_message_{id}">{body}</div>
        </div>"##
    )
}

fn thread(title: &str, posts: &[String]) -> String {
    format!("<h1>{}</h1>{}", title, posts.concat())
}

async fn mount_homepage(server: &MockServer, forum_ids: &[u32]) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&homepage(forum_ids)))
        .mount(server)
        .await;
}

async fn mount_forum(server: &MockServer, forum_id: u32, post_ids: &[u32]) {
    Mock::given(method("GET"))
        .and(path("/foro/forumdisplay.php"))
        .and(query_param("f", forum_id.to_string()))
        .respond_with(html(&forum_listing(post_ids)))
        .mount(server)
        .await;
}

async fn mount_thread(server: &MockServer, post_id: u32, page: String) {
    Mock::given(method("GET"))
        .and(path("/foro/showthread.php"))
        .and(query_param("p", post_id.to_string()))
        .respond_with(html(&page))
        .mount(server)
        .await;
}

async fn harvest(config: Config) -> Result<Vec<Item>, ScrapeError> {
    harvest_with_clock(config, clock()).await
}

async fn harvest_with_clock(
    config: Config,
    clock: Arc<FixedClock>,
) -> Result<Vec<Item>, ScrapeError> {
    let harvester = Harvester::with_clock(config, clock)?;
    let stream = harvester.run().await?;
    Ok(stream.collect().await)
}

#[tokio::test]
async fn test_harvest_general_forum_end_to_end() {
    let server = MockServer::start().await;
    mount_homepage(&server, &[2, 5]).await;
    mount_forum(&server, 2, &[101, 202]).await;
    mount_thread(
        &server,
        101,
        thread(
            "Primer hilo",
            &[
                post(99, "Ayer 23:50", "Este mensaje es de ayer"),
                post(100, "Hoy 10:15", "Primera respuesta de hoy"),
                post(101, "Hoy 10:20", "Segunda respuesta de hoy"),
            ],
        ),
    )
    .await;
    mount_thread(
        &server,
        202,
        thread(
            "Segundo hilo",
            &[post(202, "Hoy 10:25", "Respuesta en el segundo hilo")],
        ),
    )
    .await;

    let items = harvest(create_test_config(&server)).await.unwrap();

    let summary: Vec<(&str, &str, &str)> = items
        .iter()
        .map(|i| (i.title.as_str(), i.content.as_str(), i.created_at.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Primer hilo", "Segunda respuesta de hoy", "2024-05-01T09:20:00.00Z"),
            ("Primer hilo", "Primera respuesta de hoy", "2024-05-01T09:15:00.00Z"),
            ("Segundo hilo", "Respuesta en el segundo hilo", "2024-05-01T09:25:00.00Z"),
        ]
    );
    assert_eq!(
        items[0].url,
        format!("{}/foro/showthread.php?p=101#post101", server.uri())
    );
    assert!(items.iter().all(|i| i.domain == "forocoches.com"));
    assert!(items.iter().all(|i| i.author.is_none()));
}

#[tokio::test]
async fn test_harvest_respects_item_cap() {
    let server = MockServer::start().await;
    mount_homepage(&server, &[2]).await;
    mount_forum(&server, 2, &[101, 202]).await;
    mount_thread(
        &server,
        101,
        thread(
            "Primer hilo",
            &[
                post(100, "Hoy 10:15", "Primera respuesta de hoy"),
                post(101, "Hoy 10:20", "Segunda respuesta de hoy"),
            ],
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/foro/showthread.php"))
        .and(query_param("p", "202"))
        .respond_with(html(&thread("Segundo hilo", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.scraper.maximum_items_to_collect = 1;

    let items = harvest(config).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].content, "Segunda respuesta de hoy");
}

#[tokio::test]
async fn test_zero_item_cap_fetches_no_threads() {
    let server = MockServer::start().await;
    mount_homepage(&server, &[2]).await;

    Mock::given(method("GET"))
        .and(path("/foro/forumdisplay.php"))
        .respond_with(html(&forum_listing(&[101])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.scraper.maximum_items_to_collect = 0;

    assert!(harvest(config).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failing_thread_is_skipped() {
    let server = MockServer::start().await;
    mount_homepage(&server, &[2]).await;
    mount_forum(&server, 2, &[101, 202]).await;

    Mock::given(method("GET"))
        .and(path("/foro/showthread.php"))
        .and(query_param("p", "101"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_thread(
        &server,
        202,
        thread(
            "Segundo hilo",
            &[post(202, "Hoy 10:25", "Respuesta en el segundo hilo")],
        ),
    )
    .await;

    let items = harvest(create_test_config(&server)).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Segundo hilo");
}

#[tokio::test]
async fn test_sampled_forums_are_all_visited() {
    let server = MockServer::start().await;
    mount_homepage(&server, &[2, 5, 7]).await;
    mount_forum(&server, 2, &[]).await;

    for (forum_id, post_id) in [(5u32, 505u32), (7, 707)] {
        Mock::given(method("GET"))
            .and(path("/foro/forumdisplay.php"))
            .and(query_param("f", forum_id.to_string()))
            .respond_with(html(&forum_listing(&[post_id])))
            .expect(1)
            .mount(&server)
            .await;
        mount_thread(
            &server,
            post_id,
            thread(
                &format!("Hilo del foro {}", forum_id),
                &[post(post_id, "Hoy 10:20", "Mensaje reciente del subforo")],
            ),
        )
        .await;
    }

    let mut config = create_test_config(&server);
    config.site.sampled_forums = 2;

    let items = harvest(config).await.unwrap();
    assert_eq!(items.len(), 2);
    let mut titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["Hilo del foro 5", "Hilo del foro 7"]);
}

#[tokio::test]
async fn test_insufficient_forums_fails_setup() {
    let server = MockServer::start().await;
    mount_homepage(&server, &[2, 5]).await;

    let mut config = create_test_config(&server);
    config.site.sampled_forums = 3;

    let result = harvest(config).await;
    assert!(matches!(
        result,
        Err(ScrapeError::InsufficientForums {
            found: 1,
            required: 3
        })
    ));
}

#[tokio::test]
async fn test_homepage_error_fails_setup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = harvest(create_test_config(&server)).await;
    assert!(matches!(
        result,
        Err(ScrapeError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_legacy_homepage_table() {
    let server = MockServer::start().await;

    let row = |time: &str, id: u32| {
        format!(
            r#"<tr><td>·</td><td>{time}</td><td><a href="/foro/forumdisplay.php?f=2">General</a><a href="/foro/showthread.php?p={id}">Tema {id}</a></td></tr>"#
        )
    };
    let table = format!(
        "<table>{}{}{}</table>",
        row("10:25", 301),
        row("10:00", 302),
        row("10:28", 303)
    );
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&table))
        .mount(&server)
        .await;
    mount_thread(
        &server,
        301,
        thread(
            "Encabezado de la pagina",
            &[post(301, "Hoy 10:24", "Respuesta en el hilo del listado")],
        ),
    )
    .await;

    let mut config = create_test_config(&server);
    config.site.listing = ListingFormat::Legacy;

    let items = harvest(config).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Tema 301");
    assert_eq!(items[0].created_at, "2024-05-01T09:24:00.00Z");
}

#[tokio::test]
async fn test_fetcher_reports_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html("hola"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let fetcher = Fetcher::new(&config.http).unwrap();
    let base = Url::parse(&config.site.base_url).unwrap();

    let body = fetcher.fetch(&base.join("ok").unwrap()).await.unwrap();
    assert!(body.contains("hola"));

    let err = fetcher.fetch(&base.join("missing").unwrap()).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_fetcher_classifies_slow_response_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("tarde").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.http.timeout_secs = 1;
    let fetcher = Fetcher::new(&config.http).unwrap();
    let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(
        matches!(err, ScrapeError::Timeout { ref url } if url.ends_with("/slow")),
        "got {:?}",
        err
    );
}

#[tokio::test]
async fn test_post_from_before_local_midnight_is_dated_on_new_day() {
    let server = MockServer::start().await;
    mount_homepage(&server, &[2]).await;
    mount_forum(&server, 2, &[101]).await;
    mount_thread(
        &server,
        101,
        thread(
            "Hilo nocturno",
            &[post(101, "Hoy 23:55", "Mensaje escrito antes de medianoche")],
        ),
    )
    .await;

    // 00:05 on May 2nd at +01:00, with the host date already advanced
    let now = DateTime::parse_from_rfc3339("2024-05-01T23:05:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let clock = Arc::new(FixedClock::new(
        now,
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
    ));

    let items = harvest_with_clock(create_test_config(&server), clock)
        .await
        .unwrap();
    let stamps: Vec<&str> = items.iter().map(|i| i.created_at.as_str()).collect();
    assert_eq!(stamps, vec!["2024-05-02T22:55:00.00Z"]);
}
