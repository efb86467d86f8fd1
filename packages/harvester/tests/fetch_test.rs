//! Fetcher tests against a mock contents API.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use holiday_harvester::config::FetcherConfig;
use holiday_harvester::error::HarvesterError;
use holiday_harvester::fetch::{SourceFetcher, SourceProvider};
use holiday_harvester::harvester::{
    harvest_country, list_available_countries, HarvestOptions,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/repos/vacanza/holidays/contents/holidays/countries";
const SPAIN_PATH: &str = "/repos/vacanza/holidays/contents/holidays/countries/spain.py";

const SPAIN: &str = r#"class Spain(HolidayBase):
    subdivisions = ("AN", "CT")

    def _populate(self, year):
        self._add_holiday("New Year's Day", date(year, JAN, 1))
        self._add_easter_based_holiday("Good Friday", -2)
"#;

fn test_config(server: &MockServer) -> FetcherConfig {
    FetcherConfig::builder()
        .api_base_url(server.uri())
        .request_interval(Duration::from_millis(1))
        .build()
}

/// Base64 wrapped at 60 columns, the way the contents API returns it.
fn wrapped_base64(text: &str) -> String {
    let encoded = STANDARD.encode(text);
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

fn content_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "spain.py",
        "path": "holidays/countries/spain.py",
        "type": "file",
        "content": wrapped_base64(text),
        "encoding": "base64"
    })
}

#[tokio::test]
async fn test_directory_listing() {
    let mock_server = MockServer::start().await;

    let listing = serde_json::json!([
        {"name": "__init__.py", "path": "holidays/countries/__init__.py", "type": "file"},
        {"name": "spain.py", "path": "holidays/countries/spain.py", "type": "file"},
        {"name": "netherlands.py", "path": "holidays/countries/netherlands.py", "type": "file"},
        {"name": "atlantis.py", "path": "holidays/countries/atlantis.py", "type": "file"},
        {"name": "data", "path": "holidays/countries/data", "type": "dir"}
    ]);

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("ref", "main"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&listing))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server);
    let fetcher = SourceFetcher::new(config.clone()).expect("fetcher creation");

    let entries = fetcher
        .fetch_directory_listing(&config.source_path, &CancellationToken::new())
        .await
        .expect("listing");
    assert_eq!(entries.len(), 5);

    let countries = list_available_countries(&fetcher, &config, &CancellationToken::new())
        .await
        .expect("countries");
    let codes: Vec<&str> = countries.iter().map(|c| c.code).collect();
    assert_eq!(codes, vec!["ES", "NL"]);
}

#[tokio::test]
async fn test_harvest_country_decodes_wrapped_base64() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SPAIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(content_response(SPAIN)))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server);
    let fetcher = SourceFetcher::new(config.clone()).expect("fetcher creation");

    let parsed = harvest_country(
        &fetcher,
        &config,
        "ES",
        &CancellationToken::new(),
        HarvestOptions::default(),
    )
    .await
    .expect("harvest");

    assert_eq!(parsed.data.country_code, "ES");
    assert_eq!(parsed.data.holidays.len(), 2);
    assert_eq!(parsed.data.holidays["good_friday"].easter_offset, Some(-2));
    assert_eq!(parsed.data.subdivisions.len(), 2);
}

#[tokio::test]
async fn test_remote_error_carries_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SPAIN_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server);
    let fetcher = SourceFetcher::new(config).expect("fetcher creation");

    let err = fetcher
        .fetch_file_content("holidays/countries/spain.py", &CancellationToken::new())
        .await
        .expect_err("should be an error");

    match err {
        HarvesterError::RemoteApi { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("Not Found"), "body: {body}");
        }
        other => panic!("expected RemoteApi, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_base64_encoding_is_rejected() {
    let mock_server = MockServer::start().await;

    let response = serde_json::json!({
        "content": "",
        "encoding": "none"
    });
    Mock::given(method("GET"))
        .and(path(SPAIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server);
    let fetcher = SourceFetcher::new(config.clone()).expect("fetcher creation");

    let result = harvest_country(
        &fetcher,
        &config,
        "ES",
        &CancellationToken::new(),
        HarvestOptions::default(),
    )
    .await;
    assert!(matches!(result, Err(HarvesterError::UnsupportedEncoding(_))));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SPAIN_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(content_response(SPAIN)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = FetcherConfig::builder()
        .api_base_url(mock_server.uri())
        .token("test-token")
        .request_interval(Duration::from_millis(1))
        .build();
    let fetcher = SourceFetcher::new(config).expect("fetcher creation");

    let result = fetcher
        .fetch_file_content("holidays/countries/spain.py", &CancellationToken::new())
        .await;
    assert!(result.is_ok(), "fetch should succeed: {:?}", result.err());
}

#[tokio::test]
async fn test_cancelled_fetch_sends_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(content_response(SPAIN)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let fetcher = SourceFetcher::new(test_config(&mock_server)).expect("fetcher creation");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = fetcher
        .fetch_file_content("holidays/countries/spain.py", &cancel)
        .await
        .expect_err("should be cancelled");
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_requests_are_spaced_by_interval() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SPAIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(content_response(SPAIN)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let interval = Duration::from_millis(150);
    let config = FetcherConfig::builder()
        .api_base_url(mock_server.uri())
        .request_interval(interval)
        .build();
    let fetcher = SourceFetcher::new(config).expect("fetcher creation");
    let cancel = CancellationToken::new();

    let start = Instant::now();
    for _ in 0..3 {
        fetcher
            .fetch_file_content("holidays/countries/spain.py", &cancel)
            .await
            .expect("fetch");
    }
    assert!(start.elapsed() >= interval * 2, "elapsed: {:?}", start.elapsed());
}
