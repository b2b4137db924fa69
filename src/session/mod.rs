//! Session handling for the device web API
//!
//! This module owns everything between the command client and the wire:
//! bootstrapping the session identity, building HTTP clients, executing
//! requests and fetching per-page CSRF tokens.

pub mod manager;
pub mod network;
pub mod tokens;
pub mod transport;

pub use manager::{Session, SessionManager};
pub use network::NetworkOptions;
pub use tokens::{TokenPage, TokenPair, fetch_tokens, parse_tokens};
pub use transport::{ModemTransport, VERIFICATION_TOKEN_HEADER};
