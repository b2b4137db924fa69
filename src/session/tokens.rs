//! CSRF token pairs
//!
//! State-mutating commands must carry a verification token scraped from the
//! page that authorizes them. Tokens are fetched fresh for every command.

use crate::session::transport::ModemTransport;
use crate::{Error, Result};
use scraper::{Html, Selector};
use tracing::debug;

/// `name` attribute of the meta elements carrying the tokens
pub const CSRF_META_NAME: &str = "csrf_token";

/// Pages that hand out tokens, one per command family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPage {
    /// Authorizes SMS commands
    SmsInbox,
    /// Authorizes USSD commands
    Ussd,
}

impl TokenPage {
    pub fn path(&self) -> &'static str {
        match self {
            TokenPage::SmsInbox => "/html/smsinbox.html",
            TokenPage::Ussd => "/html/ussd.html",
        }
    }
}

/// Two tokens in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Sent as the request verification header
    pub primary: String,
    /// Kept alongside; the device does not require it on requests
    pub secondary: String,
}

/// Extract the token pair from page markup.
///
/// Anything other than exactly two `csrf_token` meta elements means the page
/// layout changed, and fails with [`Error::TokenParse`].
pub fn parse_tokens(html: &str, page: &str) -> Result<TokenPair> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!(r#"meta[name="{}"]"#, CSRF_META_NAME))
        .map_err(|e| Error::internal(format!("Invalid token selector: {:?}", e)))?;

    let tokens = document
        .select(&selector)
        .map(|element| {
            element
                .value()
                .attr("content")
                .map(str::to_string)
                .ok_or_else(|| Error::missing_field("content", "csrf_token meta"))
        })
        .collect::<Result<Vec<String>>>()?;

    match <[String; 2]>::try_from(tokens) {
        Ok([primary, secondary]) => Ok(TokenPair { primary, secondary }),
        Err(tokens) => Err(Error::token_parse(page, tokens.len())),
    }
}

/// Fetch the token pair for `page` through `transport`
pub async fn fetch_tokens<T>(transport: &T, page: TokenPage) -> Result<TokenPair>
where
    T: ModemTransport + ?Sized,
{
    let html = transport.get(page.path()).await?;
    let tokens = parse_tokens(&html, page.path())?;
    debug!("Fetched csrf tokens from {}", page.path());
    Ok(tokens)
}
