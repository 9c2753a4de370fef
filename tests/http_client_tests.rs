//! HTTP client and end-to-end crawl tests against a local mock server
use area_code_spider::infrastructure::config::{AppConfig, CrawlProfile};
use area_code_spider::infrastructure::HttpClientConfig;
use area_code_spider::{AreaCrawler, CrawlError, FetchError, HttpClient, PageFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(max_retries: u32) -> HttpClientConfig {
    HttpClientConfig {
        max_requests_per_second: 100,
        max_retries,
        retry_base_delay_ms: 10,
        retry_jitter_ms: 0,
        timeout_seconds: 5,
        ..HttpClientConfig::default()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

#[tokio::test]
async fn fetches_page_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2023/index.html"))
        .respond_with(html("<html><body>省级</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::with_config(fast_config(2)).unwrap();
    let body = client
        .fetch_text(&format!("{}/2023/index.html", server.uri()))
        .await
        .unwrap();

    assert!(body.contains("省级"));
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2023/99.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::with_config(fast_config(3)).unwrap();
    let err = client
        .fetch_text(&format!("{}/2023/99.html", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2023/42.html"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2023/42.html"))
        .respond_with(html("<table><tr class=\"citytr\"></tr></table>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::with_config(fast_config(3)).unwrap();
    let body = client
        .fetch_text(&format!("{}/2023/42.html", server.uri()))
        .await
        .unwrap();

    assert!(body.contains("citytr"));
}

#[tokio::test]
async fn empty_body_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2023/11.html"))
        .respond_with(html(""))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2023/11.html"))
        .respond_with(html("<p>北京市</p>"))
        .mount(&server)
        .await;

    let client = HttpClient::with_config(fast_config(1)).unwrap();
    let body = client
        .fetch_text(&format!("{}/2023/11.html", server.uri()))
        .await
        .unwrap();

    assert!(body.contains("北京市"));
}

#[tokio::test]
async fn exhausted_retries_return_last_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2023/index.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = HttpClient::with_config(fast_config(2)).unwrap();
    let err = client
        .fetch_text(&format!("{}/2023/index.html", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 500, .. }));
    assert!(err.is_retryable());
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/2023/{page}")))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn development_crawl_over_http() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "index.html",
        r#"<table class="provincetable"><tr class="provincetr">
             <td><a href="11.html">北京市<br></a></td>
             <td><a href="42.html">湖北省<br></a></td>
           </tr></table>"#,
    )
    .await;
    mount_page(
        &server,
        "42.html",
        r#"<table class="citytable">
             <tr class="citytr"><td><a href="42/4201.html">420100000000</a></td><td><a href="42/4201.html">武汉市</a></td></tr>
             <tr class="citytr"><td><a href="42/4211.html">421100000000</a></td><td><a href="42/4211.html">黄冈市</a></td></tr>
           </table>"#,
    )
    .await;
    mount_page(
        &server,
        "42/4211.html",
        r#"<table class="countytable">
             <tr class="countytr"><td>421101000000</td><td>市辖区</td></tr>
             <tr class="countytr"><td><a href="11/421102.html">421102000000</a></td><td><a href="11/421102.html">黄州区</a></td></tr>
           </table>"#,
    )
    .await;

    let mut config = AppConfig::default();
    config.site.base_url = format!("{}/2023/", server.uri());
    config.crawl.profile = CrawlProfile::Development;
    config.http = fast_config(0);

    let client = HttpClient::with_config(config.http.clone()).unwrap();
    let report = AreaCrawler::from_config(client, &config).unwrap().run().await.unwrap();

    assert_eq!(report.dataset.provinces.len(), 2);
    assert_eq!(report.dataset.cities.len(), 2);
    let counties: Vec<_> = report
        .dataset
        .counties
        .iter()
        .map(|c| (c.code(), c.name(), c.parent_code()))
        .collect();
    assert_eq!(
        counties,
        vec![
            ("421101000000", "市辖区", Some("421100000000")),
            ("421102000000", "黄州区", Some("421100000000")),
        ]
    );
    assert!(report.dataset.dangling_records().is_empty());
    assert_eq!(report.stats.pages_fetched, 3);

    let json = serde_json::to_value(&report.dataset).unwrap();
    assert_eq!(json["cities"][1]["parentCode"], "42");
    assert_eq!(json["counties"][0]["page"], serde_json::Value::Null);
}

#[tokio::test]
async fn missing_city_page_fails_the_crawl() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "index.html",
        r#"<table><tr class="provincetr"><td><a href="42.html">湖北省</a></td></tr></table>"#,
    )
    .await;

    let mut config = AppConfig::default();
    config.site.base_url = format!("{}/2023", server.uri());
    config.http = fast_config(0);

    let client = HttpClient::with_config(config.http.clone()).unwrap();
    let err = AreaCrawler::from_config(client, &config).unwrap().run().await.unwrap_err();

    assert_eq!(err.page(), Some("42.html"));
    assert!(matches!(
        err,
        CrawlError::Fetch { source: FetchError::Status { status: 404, .. }, .. }
    ));
}
