//! End-to-end tests for the single-request path against a local mock
//! server. The fetch API is blocking and owns its own reactor, so the mock
//! server runs on a separate multi-thread runtime kept alive for the test.

use std::time::Duration;

use horizon_fetch::{FetchBuilder, HttpMethod};
use tokio::runtime::Runtime;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("test reactor")
}

#[test]
fn get_captures_body_and_metadata() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/solo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("Hello")
                    .insert_header("content-type", "text/plain"),
            )
            .mount(&server),
    );

    let outcome = FetchBuilder::url(format!("{}/solo", server.uri()))
        .get()
        .expect("execution should succeed");
    let result = outcome.as_single().expect("single outcome");
    assert!(!result.is_failure());
    assert_eq!(result.text().as_deref(), Some("Hello"));
    assert_eq!(result.info.status, 200);
    assert!(result.info.url.ends_with("/solo"));
    assert_eq!(result.info.content_type.as_deref(), Some("text/plain"));
    assert!(result.info.total_time > Duration::ZERO);
    assert!(result.info.error.is_none());
}

#[test]
fn get_data_reaches_the_server_as_query() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/echo"))
            .and(query_param("q", "1"))
            .and(query_param("r", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("matched"))
            .mount(&server),
    );

    let outcome = FetchBuilder::url(format!("{}/echo?q=1", server.uri()))
        .data("r=2")
        .get()
        .expect("execution should succeed");
    let result = outcome.as_single().expect("single outcome");
    assert_eq!(result.info.status, 200);
    assert_eq!(result.text().as_deref(), Some("matched"));
}

#[test]
fn post_delivers_data_as_form_payload() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("r=2"))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .mount(&server),
    );

    let outcome = FetchBuilder::url(format!("{}/submit", server.uri()))
        .data("r=2")
        .post()
        .expect("execution should succeed");
    let result = outcome.as_single().expect("single outcome");
    assert_eq!(result.info.status, 201);
    assert_eq!(result.text().as_deref(), Some("created"));
}

#[test]
fn put_and_delete_use_their_methods() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("PUT"))
            .and(path("/item"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server),
    );
    rt.block_on(
        Mock::given(method("DELETE"))
            .and(path("/item"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server),
    );

    let put = FetchBuilder::url(format!("{}/item", server.uri()))
        .put()
        .expect("execution should succeed");
    assert_eq!(put.as_single().expect("single outcome").info.status, 200);

    let delete = FetchBuilder::url(format!("{}/item", server.uri()))
        .delete()
        .expect("execution should succeed");
    let result = delete.as_single().expect("single outcome");
    // 204 has no payload, but the transfer succeeded: the body stays Some.
    assert!(!result.is_failure());
    assert_eq!(result.info.status, 204);
    assert_eq!(result.body.as_ref().map(|b| b.len()), Some(0));
}

#[test]
fn request_options_are_sent_as_headers() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/opts"))
            .and(header("cookie", "session=1"))
            .and(header("referer", "http://ref.example"))
            .and(header("user-agent", "probe/1.0"))
            .and(header("x-custom", "42"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server),
    );

    let outcome = FetchBuilder::url(format!("{}/opts", server.uri()))
        .cookie("session=1")
        .referer("http://ref.example")
        .user_agent("probe/1.0")
        .header_lines(["X-Custom: 42"])
        .get()
        .expect("execution should succeed");
    assert_eq!(outcome.as_single().expect("single outcome").info.status, 200);
}

#[test]
fn http_error_status_is_an_ordinary_result() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server),
    );

    let outcome = FetchBuilder::url(format!("{}/broken", server.uri()))
        .get()
        .expect("execution should succeed");
    let result = outcome.as_single().expect("single outcome");
    assert!(!result.is_failure());
    assert_eq!(result.info.status, 500);
    assert_eq!(result.text().as_deref(), Some("oops"));
}

#[test]
fn timeout_yields_the_empty_body_sentinel() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server),
    );

    let outcome = FetchBuilder::url(format!("{}/slow", server.uri()))
        .timeout_ms(100)
        .get()
        .expect("execution itself should not error");
    let result = outcome.as_single().expect("single outcome");
    assert!(result.is_failure());
    assert_eq!(result.info.status, 0);
    assert!(result.info.error.is_some());
    assert!(result.info.total_time >= Duration::from_millis(50));
}

#[test]
fn unresolvable_url_yields_the_empty_body_sentinel() {
    let outcome = FetchBuilder::url("not a url")
        .get()
        .expect("execution itself should not error");
    let result = outcome.as_single().expect("single outcome");
    assert!(result.is_failure());
    assert_eq!(result.info.status, 0);
}

#[test]
fn include_headers_prepends_the_raw_block() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/headed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("payload")
                    .insert_header("x-probe", "1"),
            )
            .mount(&server),
    );

    let outcome = FetchBuilder::url(format!("{}/headed", server.uri()))
        .include_headers(true)
        .get()
        .expect("execution should succeed");
    let result = outcome.as_single().expect("single outcome");
    let text = result.text().expect("body present");
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.ends_with("payload"));

    let block = result.header_block().expect("block parses");
    assert!(block.status_line().starts_with("HTTP/1.1 200"));
    assert_eq!(block.get("X-Probe"), Some("1"));
}

#[test]
fn header_probe_issues_head_and_returns_the_block() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("HEAD"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-id", "7"))
            .mount(&server),
    );

    let raw = FetchBuilder::url(format!("{}/probe", server.uri()))
        .response_headers_raw()
        .expect("probe should succeed");
    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(raw.contains("x-id: 7"));

    let block = FetchBuilder::url(format!("{}/probe", server.uri()))
        .response_header_block()
        .expect("probe should succeed");
    assert_eq!(block.get("x-id"), Some("7"));
}

#[test]
fn redirect_target_is_extracted_without_following() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("HEAD"))
            .and(path("/moved"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", "http://example.com/next"),
            )
            .mount(&server),
    );
    rt.block_on(
        Mock::given(method("HEAD"))
            .and(path("/here"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server),
    );

    let target = FetchBuilder::url(format!("{}/moved", server.uri()))
        .redirect_target()
        .expect("probe should succeed");
    assert_eq!(target, "http://example.com/next");

    let none = FetchBuilder::url(format!("{}/here", server.uri()))
        .redirect_target()
        .expect("probe should succeed");
    assert_eq!(none, "");
}

#[test]
fn lazy_fetch_executes_once_on_first_read() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/lazy"))
            .respond_with(ResponseTemplate::new(200).set_body_string("deferred"))
            .expect(1)
            .mount(&server),
    );

    let mut fetch = FetchBuilder::url(format!("{}/lazy", server.uri()))
        .lazy()
        .expect("plan should build");
    assert!(!fetch.is_executed());

    let text = fetch
        .response()
        .expect("execution should succeed")
        .as_single()
        .expect("single outcome")
        .text();
    assert_eq!(text.as_deref(), Some("deferred"));
    assert!(fetch.is_executed());

    // Second read must hit the cache; the mock's expect(1) verifies it.
    let second = fetch.response().expect("cached outcome");
    assert!(second.as_single().is_some());
}

#[test]
fn json_decodes_on_demand() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"name":"probe","value":42}"#),
            )
            .mount(&server),
    );

    let outcome = FetchBuilder::url(format!("{}/json", server.uri()))
        .get()
        .expect("execution should succeed");
    let value: serde_json::Value = outcome
        .as_single()
        .expect("single outcome")
        .json()
        .expect("body decodes");
    assert_eq!(value["name"], "probe");
    assert_eq!(value["value"], 42);
}

#[test]
fn method_enum_maps_to_wire_methods() {
    assert_eq!(HttpMethod::Get.to_string(), "GET");
    assert_eq!(HttpMethod::Post.to_string(), "POST");
    assert_eq!(HttpMethod::Put.to_string(), "PUT");
    assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
}
