//! USSD request and poll engine integration tests

mod common;

use common::*;
use hilink_client::session::VERIFICATION_TOKEN_HEADER;
use hilink_client::{Error, UssdResult};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::Mock;

const USSD_SEND: &str = "/api/ussd/send";
const USSD_GET: &str = "/api/ussd/get";

#[tokio::test]
async fn test_busy_busy_then_reply() {
    let (server, modem) = started_client().await;

    Mock::given(method("POST"))
        .and(path(USSD_SEND))
        .and(header(VERIFICATION_TOKEN_HEADER, PRIMARY_TOKEN))
        .and(body_string(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><request>\
             <content>*100#</content><codeType>CodeType</codeType><timeout></timeout></request>",
        ))
        .respond_with(xml_response("OK"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USSD_GET))
        .respond_with(xml_error(111019))
        .with_priority(1)
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USSD_GET))
        .respond_with(xml_response("<content>Balance: 152.40 RUB</content>"))
        .mount(&server)
        .await;

    let started = Instant::now();
    let reply = modem
        .ussd_request("*100#", Duration::from_secs(30))
        .await
        .unwrap();

    assert_eq!(
        reply,
        Some(UssdResult {
            content: "Balance: 152.40 RUB".to_string()
        })
    );
    assert_eq!(request_count(&server, USSD_GET).await, 3);
    assert_eq!(request_count(&server, "/html/ussd.html").await, 1);
    // Two backoffs of 500 ms
    assert!(started.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test]
async fn test_always_busy_returns_none_after_timeout() {
    let (server, modem) = started_client().await;

    Mock::given(method("POST"))
        .and(path(USSD_SEND))
        .respond_with(xml_response("OK"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USSD_GET))
        .respond_with(xml_error(111019))
        .expect(8..)
        .mount(&server)
        .await;

    let started = Instant::now();
    let reply = modem
        .ussd_request("*100#", Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(reply, None);
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_poll_failure_is_raised() {
    let (server, modem) = started_client().await;

    Mock::given(method("POST"))
        .and(path(USSD_SEND))
        .respond_with(xml_response("OK"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USSD_GET))
        .respond_with(xml_error(111019))
        .with_priority(1)
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USSD_GET))
        .respond_with(xml_error(111020))
        .mount(&server)
        .await;

    let error = modem
        .ussd_request("*100#", Duration::from_secs(30))
        .await
        .unwrap_err();

    assert_eq!(error.device_code(), Some(111020));
    assert_eq!(request_count(&server, USSD_GET).await, 2);
}

#[tokio::test]
async fn test_session_invalid_during_poll_is_raised() {
    let (server, modem) = started_client().await;

    Mock::given(method("POST"))
        .and(path(USSD_SEND))
        .respond_with(xml_response("OK"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USSD_GET))
        .respond_with(xml_error(125002))
        .expect(1)
        .mount(&server)
        .await;

    let result = modem.ussd_request("*102#", Duration::from_secs(30)).await;
    assert!(matches!(result, Err(Error::SessionInvalid)));
}

#[tokio::test]
async fn test_submit_rejection_skips_polling() {
    let (server, modem) = started_client().await;

    Mock::given(method("POST"))
        .and(path(USSD_SEND))
        .respond_with(xml_error(111001))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USSD_GET))
        .respond_with(xml_response("<content>unused</content>"))
        .expect(0)
        .mount(&server)
        .await;

    let error = modem
        .ussd_request("*100#", Duration::from_secs(30))
        .await
        .unwrap_err();
    assert_eq!(error.device_code(), Some(111001));
}

#[tokio::test]
async fn test_cancellation_ends_poll_early() {
    let (server, modem) = started_client().await;

    Mock::given(method("POST"))
        .and(path(USSD_SEND))
        .respond_with(xml_response("OK"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USSD_GET))
        .respond_with(xml_error(111019))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1200)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let result = modem
        .ussd_request_cancellable("*100#", Duration::from_secs(30), &cancel)
        .await;

    assert!(matches!(result, Err(Error::Cancelled { .. })));
    assert!(started.elapsed() < Duration::from_secs(5));
}
