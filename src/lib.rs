//! HiLink modem client - Rust Implementation
//!
//! An authenticated command client for the web-management API of HiLink
//! family LTE modems (default address `http://192.168.8.1`).
//!
//! # Features
//!
//! - **Session Bootstrap**: Obtains the `SessionID` identity and echoes it verbatim on every request
//! - **CSRF Tokens**: Scrapes the verification token pair before every state-changing call
//! - **Typed Errors**: Device error envelopes become [`Error::SessionInvalid`], [`Error::TransientBusy`] or [`Error::Device`]
//! - **Traffic and SMS**: Statistics, notification flags, inbox listing, mark-read and batch delete
//! - **USSD**: Submit a code and poll for the carrier reply within a deadline
//!
//! # Architecture
//!
//! - [`session`]: session bootstrap, HTTP transport and token scraping
//! - [`envelope`]: XML request encoding, response decoding and error classification
//! - [`client`]: the command surface and the USSD poll engine
//! - [`types`]: typed command results
//!
//! # Examples
//!
//! ```rust,no_run
//! use hilink_client::{ModemClient, Settings};
//!
//! # async fn example() -> hilink_client::Result<()> {
//! let mut modem = ModemClient::new(Settings::default())?;
//! modem.start().await?;
//! let traffic = modem.get_traffic_stat().await?;
//! println!("downloaded {} bytes", traffic.total_download);
//! modem.finish();
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod session;
pub mod types;
pub mod utils;

pub use client::{ModemClient, ModemClientGeneric, PollOutcome, Poller};
pub use config::{ConfigLoader, EnvOverrides, Settings};
pub use error::{Error, Result};
pub use session::{ModemTransport, SessionManager};
pub use types::{
    MonthTrafficStat, Notifications, SmsCount, SmsIndices, SmsList, SmsMessage, TrafficStat,
    UssdResult,
};
