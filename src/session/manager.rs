//! # Session Manager
//!
//! Acquires and holds the session identity the device hands out on its root
//! page, and executes requests through a client bound to that identity.
//!
//! ## Bootstrap
//!
//! The device intermittently answers the very first request with a
//! placeholder or empty `SessionID`. [`SessionManager::start`] therefore
//! repeats the bootstrap GET until the identity reaches
//! `session.min_id_length`, giving up after `session.max_bootstrap_attempts`.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use hilink_client::config::Settings;
//! use hilink_client::session::SessionManager;
//!
//! # tokio_test::block_on(async {
//! let mut manager = SessionManager::new(&Settings::default())?;
//! manager.start().await?;
//! let body = manager.execute_get("/api/monitoring/check-notifications").await?;
//! println!("{}", body);
//! manager.finish();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

use crate::session::network::{NetworkOptions, extract_session_id};
use crate::session::transport::{ModemTransport, VERIFICATION_TOKEN_HEADER};
use crate::{Error, Result, config::Settings};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const POST_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// An established session with the device
#[derive(Debug)]
pub struct Session {
    session_id: String,
    client: Client,
}

impl Session {
    /// Opaque identity echoed on every request
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Owner of the device session
#[derive(Debug)]
pub struct SessionManager {
    /// Device base address
    base_url: Url,
    /// HTTP client options
    network: NetworkOptions,
    /// Shortest acceptable identity
    min_id_length: usize,
    /// Bootstrap safety ceiling
    max_bootstrap_attempts: u32,
    /// Pause between bootstrap requests
    bootstrap_retry_interval: Duration,
    /// Current session, if started
    session: Option<Session>,
}

impl SessionManager {
    /// Creates a session manager for the device configured in `settings`.
    ///
    /// No network traffic happens until [`start`](Self::start).
    pub fn new(settings: &Settings) -> Result<Self> {
        let base_url = Url::parse(&settings.modem.base_url)?;

        Ok(Self {
            base_url,
            network: NetworkOptions::from_settings(settings),
            min_id_length: settings.session.min_id_length,
            max_bootstrap_attempts: settings.session.max_bootstrap_attempts.max(1),
            bootstrap_retry_interval: Duration::from_millis(
                settings.session.bootstrap_retry_interval_ms,
            ),
            session: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_started(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Obtain a fresh session identity and bind a client to it.
    ///
    /// Replaces any existing session.
    pub async fn start(&mut self) -> Result<()> {
        let session_id = self.bootstrap_session_id().await?;
        let client = self.network.session_client(&session_id)?;

        info!(
            "Session established with {} (identity length {})",
            self.base_url,
            session_id.len()
        );
        self.session = Some(Session { session_id, client });
        Ok(())
    }

    /// Drop the session and its connection pool. Safe to call repeatedly.
    pub fn finish(&mut self) {
        if self.session.take().is_some() {
            info!("Session with {} closed", self.base_url);
        }
    }

    /// Issue an authenticated GET and return the body text
    pub async fn execute_get(&self, path: &str) -> Result<String> {
        let session = self.session.as_ref().ok_or(Error::NotStarted)?;
        let url = self.base_url.join(path)?;

        debug!("GET {}", url);
        let response = session.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("GET {} -> {} ({} bytes)", path, status, body.len());

        Ok(body)
    }

    /// Issue an authenticated POST and return the body text
    pub async fn execute_post(&self, path: &str, body: String, token: Option<&str>) -> Result<String> {
        let session = self.session.as_ref().ok_or(Error::NotStarted)?;
        let url = self.base_url.join(path)?;

        debug!("POST {} ({} bytes, token: {})", url, body.len(), token.is_some());
        let mut request = session
            .client
            .post(url)
            .header(CONTENT_TYPE, POST_CONTENT_TYPE)
            .body(body);
        if let Some(token) = token {
            request = request.header(VERIFICATION_TOKEN_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("POST {} -> {} ({} bytes)", path, status, text.len());

        Ok(text)
    }

    async fn bootstrap_session_id(&self) -> Result<String> {
        let client = self.network.bootstrap_client()?;

        for attempt in 1..=self.max_bootstrap_attempts {
            let response = client.get(self.base_url.clone()).send().await?;
            let observed = extract_session_id(response.headers());
            response.bytes().await?;

            match observed {
                Some(session_id) if session_id.len() >= self.min_id_length => {
                    debug!("Session identity obtained on attempt {}", attempt);
                    return Ok(session_id);
                }
                observed => {
                    warn!(
                        "Bootstrap attempt {}/{}: unusable session identity (length {:?})",
                        attempt,
                        self.max_bootstrap_attempts,
                        observed.map(|id| id.len())
                    );
                }
            }

            if attempt < self.max_bootstrap_attempts {
                tokio::time::sleep(self.bootstrap_retry_interval).await;
            }
        }

        Err(Error::SessionBootstrap {
            attempts: self.max_bootstrap_attempts,
        })
    }
}

#[async_trait::async_trait]
impl ModemTransport for SessionManager {
    async fn get(&self, path: &str) -> Result<String> {
        self.execute_get(path).await
    }

    async fn post(&self, path: &str, body: String, token: Option<&str>) -> Result<String> {
        self.execute_post(path, body, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_parses_base_url() {
        let manager = SessionManager::new(&Settings::default()).unwrap();
        assert_eq!(manager.base_url().as_str(), "http://192.168.8.1/");
        assert!(!manager.is_started());
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let result = SessionManager::new(&Settings::for_base_url("not a url"));
        assert!(matches!(result, Err(Error::Url(_))));
    }

    #[tokio::test]
    async fn test_requests_before_start_fail() {
        let manager = SessionManager::new(&Settings::default()).unwrap();
        assert!(matches!(
            manager.execute_get("/api/sms/sms-count").await,
            Err(Error::NotStarted)
        ));
        assert!(matches!(
            manager.execute_post("/api/sms/set-reads", String::new(), None).await,
            Err(Error::NotStarted)
        ));
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut manager = SessionManager::new(&Settings::default()).unwrap();
        manager.finish();
        manager.finish();
        assert!(!manager.is_started());
    }
}
