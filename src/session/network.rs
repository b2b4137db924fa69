//! HTTP client construction and proxy support
//!
//! Builds the two `reqwest` clients the session manager needs: a bare one for
//! the bootstrap request and a session-bound one that carries the identity
//! header on every call.

use crate::{Result, config::Settings};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Name of the session identity cookie issued by the device
pub const SESSION_COOKIE_NAME: &str = "SessionID";

/// Network options shared by all clients of one session manager
#[derive(Debug, Clone)]
pub struct NetworkOptions {
    /// Upstream proxy URL
    pub proxy_url: Option<String>,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl NetworkOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            proxy_url: settings.modem.proxy.clone(),
            connect_timeout: Duration::from_secs(settings.network.connect_timeout),
            request_timeout: Duration::from_secs(settings.network.request_timeout),
            user_agent: settings.network.user_agent.clone(),
        }
    }

    /// Set proxy URL
    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Client without session identity, used for bootstrap requests
    pub fn bootstrap_client(&self) -> Result<Client> {
        self.build(HeaderMap::new())
    }

    /// Client that sends `Cookie: SessionID=<id>` on every request.
    ///
    /// The header value is built from the raw identity bytes and never passes
    /// through a cookie jar, which would re-quote values containing `\`.
    pub fn session_client(&self, session_id: &str) -> Result<Client> {
        let cookie = format!("{}={}", SESSION_COOKIE_NAME, session_id);
        let value = HeaderValue::from_bytes(cookie.as_bytes()).map_err(|e| {
            crate::Error::internal(format!("Session identity is not a valid header value: {}", e))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value);
        self.build(headers)
    }

    fn build(&self, headers: HeaderMap) -> Result<Client> {
        let mut client_builder = Client::builder()
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout);

        if let Some(proxy_url) = &self.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                crate::Error::config("proxy", &format!("Invalid proxy URL '{}': {}", proxy_url, e))
            })?;
            client_builder = client_builder.proxy(proxy);
        } else {
            // The device lives on the local network; system proxies do not apply.
            client_builder = client_builder.no_proxy();
        }

        Ok(client_builder.build()?)
    }
}

/// Extract the session identity from `Set-Cookie` headers.
///
/// Returns the value of the first `SessionID=` pair found, verbatim.
pub fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.to_string())
}
