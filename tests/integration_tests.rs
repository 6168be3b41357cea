//! Integration tests using wiremock to simulate the Iconfinder API.

use chrono::{NaiveDate, NaiveDateTime};
use iconfinder::schema::Model;
use iconfinder::{
    Category, Client, Cursor, Entity, Error, IconSet, IfModifiedSince, License, LicenseScope,
    ListableByCursor, Owner, Retrievable, SchemaError, Style,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LAST_MODIFIED: &str = "Sun, 01 Jan 2012 15:32:23 GMT";

fn last_modified() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2012, 1, 1)
        .unwrap()
        .and_hms_opt(15, 32, 23)
        .unwrap()
}

fn client(server: &MockServer) -> Client {
    Client::builder()
        .base_url(format!("{}/v2", server.uri()))
        .unwrap()
        .build()
        .unwrap()
}

async fn sent_condition(server: &MockServer, index: usize) -> Option<String> {
    let requests = server.received_requests().await.unwrap();
    requests[index]
        .headers
        .get("if-modified-since")
        .map(|value| value.to_str().unwrap().to_string())
}

fn license_body() -> serde_json::Value {
    json!({"license_id": 5, "name": "Test license", "scope": "attribution"})
}

#[tokio::test]
async fn test_get_stamps_last_modified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Last-Modified", LAST_MODIFIED)
                .set_body_json(license_body()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let license = License::get(&client(&mock_server), &5, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(license.license_id(), 5);
    assert_eq!(license.scope(), LicenseScope::FreeWithAttribution);
    assert_eq!(license.last_modified(), Some(last_modified()));

    assert_eq!(sent_condition(&mock_server, 0).await, None);
}

#[tokio::test]
async fn test_get_without_last_modified_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(license_body()))
        .mount(&mock_server)
        .await;

    let license = License::get(&client(&mock_server), &5, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(license.last_modified(), None);
}

#[tokio::test]
async fn test_conditional_get_not_modified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .and(header_exists("If-Modified-Since"))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = License::get(
        &client(&mock_server),
        &5,
        Some(IfModifiedSince::Timestamp(last_modified())),
    )
    .await
    .unwrap();

    assert!(result.is_none());
    assert_eq!(
        sent_condition(&mock_server, 0).await.as_deref(),
        Some(LAST_MODIFIED)
    );
}

#[tokio::test]
async fn test_conditional_get_modified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .and(header_exists("If-Modified-Since"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Last-Modified", LAST_MODIFIED)
                .set_body_json(license_body()),
        )
        .mount(&mock_server)
        .await;

    let since = NaiveDate::from_ymd_opt(2011, 12, 31)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let license = License::get(&client(&mock_server), &5, Some(since.into()))
        .await
        .unwrap();

    assert_eq!(license.unwrap().last_modified(), Some(last_modified()));
    assert_eq!(
        sent_condition(&mock_server, 0).await.as_deref(),
        Some("Sat, 31 Dec 2011 00:00:00 GMT")
    );
}

#[tokio::test]
async fn test_refresh_uses_last_modified() {
    let mock_server = MockServer::start().await;

    // Registered first, so it answers conditional requests.
    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .and(header_exists("If-Modified-Since"))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Last-Modified", LAST_MODIFIED)
                .set_body_json(license_body()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let license = License::get(&client, &5, None).await.unwrap().unwrap();

    assert!(license.refresh(&client).await.unwrap().is_none());
    assert_eq!(sent_condition(&mock_server, 0).await, None);
    assert_eq!(
        sent_condition(&mock_server, 1).await.as_deref(),
        Some(LAST_MODIFIED)
    );
}

#[tokio::test]
async fn test_not_modified_without_condition_is_unexpected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .respond_with(ResponseTemplate::new(304))
        .mount(&mock_server)
        .await;

    let result = License::get(&client(&mock_server), &5, None).await;
    match result {
        Err(Error::UnexpectedResponse { status }) => assert_eq!(status.as_u16(), 304),
        other => panic!("Expected UnexpectedResponse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_other_success_statuses_are_unexpected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/6"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "https://example.com/elsewhere"),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);

    let err = License::get(&client, &5, None).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(204));

    // Redirects are not followed.
    let err = License::get(&client, &6, None).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedResponse { status } if status.as_u16() == 302));
}

#[tokio::test]
async fn test_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "not_found",
            "message": "License not found"
        })))
        .mount(&mock_server)
        .await;

    let result = License::get(&client(&mock_server), &999, None).await;

    match result {
        Err(Error::NotFound { message }) => assert_eq!(message, "License not found"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_statuses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/categories"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "invalid_count",
            "message": "count must be between 1 and 100"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/styles"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/iconsets"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);

    match Category::list(&client, 1000, None, None).await {
        Err(Error::InvalidParameter { parameter, message }) => {
            assert_eq!(parameter, "count");
            assert_eq!(message, "count must be between 1 and 100");
        }
        other => panic!("Expected InvalidParameter, got {:?}", other),
    }

    match Style::list(&client, 10, None, None).await {
        Err(Error::BadCredentials { message }) => assert_eq!(message, "bad credentials"),
        other => panic!("Expected BadCredentials, got {:?}", other),
    }

    let err = IconSet::list(&client, 10, None, None).await.unwrap_err();
    assert!(matches!(err, Error::InternalServer { ref message } if message == "internal server error"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/styles/flat"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "30")
                .insert_header("X-RateLimit-Remaining", "0"),
        )
        .mount(&mock_server)
        .await;

    let err = Style::get(&client(&mock_server), "flat", None)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    let info = err.rate_limit_info().unwrap();
    assert_eq!(info.retry_after, Some(Duration::from_secs(30)));
    assert_eq!(info.remaining, Some(0));
}

#[tokio::test]
async fn test_list_with_cursor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/categories"))
        .and(query_param("count", "3"))
        .and(query_param("after", "arrows"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Last-Modified", LAST_MODIFIED)
                .set_body_json(json!({
                    "total_count": 42,
                    "categories": [
                        {"identifier": "business", "name": "Business"},
                        {"identifier": "flags", "name": "Flags"},
                        {"identifier": "food", "name": "Food"},
                    ]
                })),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);

    let page = Category::list(&client, 3, Some(Cursor::key("arrows")), None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(page.len(), 3);
    assert_eq!(page.total_count(), 42);
    assert_eq!(page.last_modified(), Some(last_modified()));
    assert!(page.iter().all(|c| c.last_modified() == Some(last_modified())));
    let identifiers: Vec<_> = page.iter().map(Category::identifier).collect();
    assert_eq!(identifiers, ["business", "flags", "food"]);
    assert_eq!(page.next_cursor().unwrap().token(), "food");

    // An entity works as a cursor too.
    let arrows = Category::deserialize(&json!({
        "identifier": "arrows",
        "name": "Arrows"
    }))
    .unwrap();
    let again = client
        .bind::<Category>()
        .list(3, Some(Cursor::from(&arrows)), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again, page);
}

#[tokio::test]
async fn test_conditional_list_not_modified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/styles"))
        .and(query_param("count", "10"))
        .and(header_exists("If-Modified-Since"))
        .respond_with(ResponseTemplate::new(304))
        .mount(&mock_server)
        .await;

    let result = Style::list(
        &client(&mock_server),
        iconfinder::DEFAULT_PAGE_SIZE,
        None,
        Some(IfModifiedSince::Timestamp(last_modified())),
    )
    .await
    .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_first_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/styles"))
        .and(query_param("count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "styles": [{"identifier": "flat", "name": "Flat"}]
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let page = client.bind::<Style>().first_page().await.unwrap();

    assert_eq!(page.total_count(), 1);
    assert_eq!(page[0].name(), "Flat");
    assert_eq!(page.last_modified(), None);
}

#[tokio::test]
async fn test_zero_count_is_rejected_before_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = Category::list(&client(&mock_server), 0, None, None).await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[tokio::test]
async fn test_pre_epoch_condition_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let since = NaiveDate::from_ymd_opt(1960, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let result = License::get(&client(&mock_server), &5, Some(since.into())).await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[tokio::test]
async fn test_credentials_are_sent_as_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/styles/flat"))
        .and(query_param("client_id", "my-id"))
        .and(query_param("client_secret", "my-secret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"identifier": "flat", "name": "Flat"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(format!("{}/v2/", mock_server.uri()))
        .unwrap()
        .credentials("my-id", "my-secret")
        .build()
        .unwrap();

    let style = Style::get(&client, "flat", None).await.unwrap().unwrap();
    assert_eq!(style.identifier(), "flat");
}

#[tokio::test]
async fn test_user_agent_and_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/styles/flat"))
        .and(header("User-Agent", "my-app/1.0"))
        .and(header("Accept-Language", "da"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"identifier": "flat", "name": "Flat"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(format!("{}/v2", mock_server.uri()))
        .unwrap()
        .user_agent("my-app/1.0")
        .unwrap()
        .default_header("Accept-Language", "da")
        .unwrap()
        .build()
        .unwrap();

    assert!(Style::get(&client, "flat", None).await.unwrap().is_some());
}

#[tokio::test]
async fn test_payload_schema_mismatch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "license_id": "5",
            "name": "Test license",
            "scope": "free"
        })))
        .mount(&mock_server)
        .await;

    let result = License::get(&client(&mock_server), &5, None).await;

    match result {
        Err(Error::Schema(SchemaError::TypeMismatch {
            field,
            expected,
            actual,
        })) => {
            assert_eq!(field, "license_id");
            assert_eq!(expected, "integer");
            assert_eq!(actual, "string");
        }
        other => panic!("Expected a schema error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let result = License::get(&client(&mock_server), &5, None).await;

    match result {
        Err(Error::DeserializationFailed { raw_response, .. }) => {
            assert_eq!(raw_response, "not json");
        }
        other => panic!("Expected DeserializationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_last_modified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Last-Modified", "last tuesday")
                .set_body_json(license_body()),
        )
        .mount(&mock_server)
        .await;

    let result = License::get(&client(&mock_server), &5, None).await;
    assert!(matches!(
        result,
        Err(Error::MalformedHeader { name: "Last-Modified", .. })
    ));
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/licenses/5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(license_body())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(format!("{}/v2", mock_server.uri()))
        .unwrap()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let result = License::get(&client, &5, None).await;
    assert!(matches!(result, Err(Error::Timeout)));
}

#[tokio::test]
async fn test_iconset_with_nested_entities() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/iconsets/1761"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "iconset_id": 1761,
            "identifier": "flat-ui",
            "name": "Flat UI",
            "type": "raster",
            "is_premium": false,
            "published_at": "2013-05-07T10:20:30Z",
            "icons_count": 24,
            "license": {"license_id": 2, "name": "Free", "scope": "free"},
            "styles": [{"identifier": "flat", "name": "Flat"}],
            "author": {
                "author_id": 7,
                "name": "Icon Studio",
                "website_url": "https://iconstudio.example",
                "iconsets_count": 12
            }
        })))
        .mount(&mock_server)
        .await;

    let iconset = client(&mock_server)
        .bind::<IconSet>()
        .get(&1761, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(*iconset.primary_key(), 1761);
    assert_eq!(iconset.license().unwrap().scope(), LicenseScope::Free);
    assert_eq!(iconset.styles().unwrap().len(), 1);
    assert!(iconset.categories().is_none());
    assert!(matches!(iconset.author(), Some(Owner::Author(author)) if author.author_id() == 7));
}
