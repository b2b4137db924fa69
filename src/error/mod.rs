//! Error handling for the modem client
//!
//! This module defines error types and handling patterns used throughout the library.

pub mod types;

pub use types::{ERROR_SESSION_INVALID, ERROR_TRY_AGAIN, Error, Result};
