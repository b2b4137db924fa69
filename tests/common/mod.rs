//! Common test utilities and helpers
//!
//! A `wiremock` server stands in for the modem's web interface.

#![allow(dead_code)]

use hilink_client::{ModemClient, Settings};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A realistic identity: 64 characters, including characters a cookie jar
/// would quote or reject
pub const SESSION_ID: &str =
    "Kx9\\vQ2mR7tYp0sLw3NcE8hJ5uZa1oBf6gDi4kXe/T+Hn0rVy2qMb7cWs9lPj3dA";

pub const PRIMARY_TOKEN: &str = "pY7tQkR2wXv9LmN3bC5zH8jD1sF4gA6e";
pub const SECONDARY_TOKEN: &str = "Zt4uWq8eRn2yBx6vMc9kLp3jHs5dGf7a";

/// Settings pointing at the mock device, with fast bootstrap retries
pub fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::for_base_url(server.uri());
    settings.session.bootstrap_retry_interval_ms = 10;
    settings.network.connect_timeout = 5;
    settings.network.request_timeout = 10;
    settings
}

/// Root page handing out `session_id`
pub fn bootstrap_response(session_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header(
            "Set-Cookie",
            format!("SessionID={}; path=/; HttpOnly", session_id).as_str(),
        )
        .set_body_string("<html><body>HiLink</body></html>")
}

/// Serve a valid session identity on `/`
pub async fn mount_bootstrap(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(bootstrap_response(SESSION_ID))
        .mount(server)
        .await;
}

/// HTML page carrying `tokens` as csrf meta tags
pub fn token_page(tokens: &[&str]) -> String {
    let metas: String = tokens
        .iter()
        .map(|token| format!(r#"<meta name="csrf_token" content="{}">"#, token))
        .collect();
    format!(
        r#"<!DOCTYPE html><html><head><meta http-equiv="Content-Type" content="text/html; charset=utf-8">{}<title>HiLink</title></head><body></body></html>"#,
        metas
    )
}

/// Serve the two token-bearing pages
pub async fn mount_token_pages(server: &MockServer) {
    for page in ["/html/smsinbox.html", "/html/ussd.html"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(token_page(&[PRIMARY_TOKEN, SECONDARY_TOKEN])),
            )
            .mount(server)
            .await;
    }
}

/// `<response>` wrapping `inner`
pub fn xml_response(inner: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "text/html")
        .set_body_string(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n<response>{}</response>",
            inner
        ))
}

/// `<error>` envelope with `code`
pub fn xml_error(code: i64) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "text/html")
        .set_body_string(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n<error><code>{}</code><message></message></error>",
            code
        ))
}

/// Mock device with bootstrap and token pages mounted, plus a started client
pub async fn started_client() -> (MockServer, ModemClient) {
    let server = MockServer::start().await;
    mount_bootstrap(&server).await;
    mount_token_pages(&server).await;

    let mut modem = ModemClient::new(settings_for(&server)).unwrap();
    modem.start().await.unwrap();
    (server, modem)
}

/// Number of requests the mock device saw for `request_path`
pub async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}
