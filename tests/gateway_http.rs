//! Authenticated transport and order registration against a mock gateway.
//!
//! The blocking client is built, used and dropped inside `spawn_blocking`
//! so it never runs on the async runtime threads.

use sberpay::{
    Amount, AuthenticatedTransport, Credentials, Endpoints, LogConfig, OrderRegistrar,
    OrderRequest, Params, SberpayConfig, SberpayError,
};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REGISTER_PATH: &str = "/payment/rest/register.do";

fn test_config(server: &MockServer) -> SberpayConfig {
    SberpayConfig::new(Credentials::new("shop-api", "secret")).with_endpoints(
        Endpoints::empty()
            .with("register", format!("{}{}", server.uri(), REGISTER_PATH))
            .with("getOrderStatusExtended", format!("{}/payment/rest/getOrderStatusExtended.do", server.uri())),
    )
}

fn paid_order() -> OrderRequest {
    OrderRequest::new(
        "10747",
        Amount::from_major(10.5).unwrap(),
        "https://shop.test/ok",
        "https://shop.test/fail",
    )
}

#[tokio::test]
async fn register_posts_authenticated_form() {
    let server = MockServer::start().await;
    let response_body = json!({
        "orderId": "70906e55-7114-41d6-8332-4609dc6590f4",
        "formUrl": "https://3dsec.sberbank.ru/payment/merchants/test/payment_ru.html?mdOrder=70906e55"
    });

    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .and(body_string_contains("userName=shop-api"))
        .and(body_string_contains("password=secret"))
        .and(body_string_contains("orderNumber=10747"))
        .and(body_string_contains("amount=1050"))
        .and(body_string_contains("language=ru"))
        .and(body_string_contains("returnUrl=https%3A%2F%2Fshop.test%2Fok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let body = tokio::task::spawn_blocking(move || {
        let registrar = OrderRegistrar::new(config).unwrap();
        registrar.register(&paid_order())
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(body, response_body);
}

#[tokio::test]
async fn register_logs_success_and_error_outcomes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .and(body_string_contains("orderNumber=10747"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orderId": "abc", "formUrl": "https://pay.test"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .and(body_string_contains("orderNumber=10748"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "1",
            "errorMessage": "Order number is duplicated"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("sber.log");
    let config = test_config(&server).with_log(LogConfig::new(&log_path));

    let (ok, failed) = tokio::task::spawn_blocking(move || {
        let registrar = OrderRegistrar::new(config).unwrap();
        let ok = registrar.register(&paid_order()).unwrap();
        let failed = registrar
            .register_order("10748", 3.0, "https://shop.test/ok", "https://shop.test/fail")
            .unwrap();
        (ok, failed)
    })
    .await
    .unwrap();

    // Failures are returned unmodified, not turned into errors
    assert_eq!(ok["orderId"], "abc");
    assert_eq!(failed["errorCode"], "1");

    let contents = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);

    assert!(lines[0].starts_with("INFO:sberpay:"));
    assert!(lines[0].ends_with(": Order #10747 registration for amount 10.5"));

    assert!(lines[1].starts_with("ERROR:sberpay:"));
    assert!(lines[1].ends_with(
        ": Order #10748 registration for amount 3 | ERROR: Order number is duplicated"
    ));
}

#[tokio::test]
async fn get_sends_credentials_as_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payment/rest/getOrderStatusExtended.do"))
        .and(query_param("userName", "shop-api"))
        .and(query_param("password", "secret"))
        .and(query_param("orderId", "70906e55"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errorCode": "0", "orderStatus": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let response = tokio::task::spawn_blocking(move || {
        let transport = AuthenticatedTransport::new(&config).unwrap();
        let mut params = Params::new();
        params.insert("orderId".to_string(), "70906e55".to_string());
        transport.get_operation("getOrderStatusExtended", params)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap()["orderStatus"], 2);
    assert!(!response.url.contains("secret"));
    assert!(response.url.ends_with("/payment/rest/getOrderStatusExtended.do"));
}

#[tokio::test]
async fn extra_headers_are_sent_with_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payment/rest/getOrderStatusExtended.do"))
        .and(header("X-Request-Id", "req-42"))
        .and(query_param("userName", "shop-api"))
        .and(query_param("password", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errorCode": "0"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .and(header("X-Request-Id", "req-42"))
        .and(body_string_contains("userName=shop-api"))
        .and(body_string_contains("password=secret"))
        .and(body_string_contains("orderNumber=10747"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orderId": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let status_url = format!("{}/payment/rest/getOrderStatusExtended.do", server.uri());
    let register_url = format!("{}{}", server.uri(), REGISTER_PATH);
    let (get, post) = tokio::task::spawn_blocking(move || {
        let transport = AuthenticatedTransport::new(&config).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("X-Request-Id", HeaderValue::from_static("req-42"));

        let get = transport
            .send(Method::GET, &status_url, headers.clone(), Params::new())
            .unwrap();

        let mut data = Params::new();
        data.insert("orderNumber".to_string(), "10747".to_string());
        let post = transport.send(Method::POST, &register_url, headers, data).unwrap();

        (get, post)
    })
    .await
    .unwrap();

    assert_eq!(get.status, 200);
    assert_eq!(post.status, 200);
}

#[tokio::test]
async fn non_success_status_is_returned_not_raised() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/maintenance"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down for maintenance"))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let url = format!("{}/maintenance", server.uri());
    let response = tokio::task::spawn_blocking(move || {
        let transport = AuthenticatedTransport::new(&config).unwrap();
        transport.post(&url, Params::new())
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(response.status, 503);
    assert!(!response.is_success());
    assert_eq!(response.body_str().unwrap(), "down for maintenance");
}

#[tokio::test]
async fn credential_conflict_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let url = format!("{}{}", server.uri(), REGISTER_PATH);
    let result = tokio::task::spawn_blocking(move || {
        let transport = AuthenticatedTransport::new(&config).unwrap();
        let mut data = Params::new();
        data.insert("password".to_string(), "override".to_string());
        transport.post(&url, data)
    })
    .await
    .unwrap();

    assert!(matches!(
        result,
        Err(SberpayError::CredentialConflict { field }) if field == "password"
    ));
}

#[test]
fn network_failure_surfaces_as_transport_error() {
    let config = SberpayConfig::new(Credentials::new("shop-api", "secret"))
        .with_endpoints(Endpoints::empty().with("register", "http://127.0.0.1:1/register.do"));
    let registrar = OrderRegistrar::new(config).unwrap();

    let result = registrar.register(&paid_order());
    assert!(matches!(result, Err(SberpayError::Transport(_))));
}
