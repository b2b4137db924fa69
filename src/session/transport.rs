//! Request execution seam
//!
//! The command client and the token provider only need "GET this path" and
//! "POST this body". [`ModemTransport`] captures that so they can run against
//! the live [`SessionManager`](crate::session::SessionManager) or a scripted
//! transport in tests.

use crate::Result;

/// Header carrying the primary CSRF token on state-mutating requests
pub const VERIFICATION_TOKEN_HEADER: &str = "__RequestVerificationToken";

/// Raw request execution against the device
#[async_trait::async_trait]
pub trait ModemTransport: Send + Sync {
    /// GET `path` relative to the device base address, returning the body text
    async fn get(&self, path: &str) -> Result<String>;

    /// POST `body` to `path`, attaching the verification token when given
    async fn post(&self, path: &str, body: String, token: Option<&str>) -> Result<String>;
}
