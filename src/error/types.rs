//! Error taxonomy for the modem client
//!
//! Device-reported failures are classified centrally by the envelope codec and
//! surface here as dedicated variants; everything else (transport, parsing,
//! configuration) keeps its own kind so callers can tell them apart.

use thiserror::Error;

/// Device error code: the held session identity is no longer accepted
pub const ERROR_SESSION_INVALID: i64 = 125002;

/// Device error code: the command is not ready yet, try again
pub const ERROR_TRY_AGAIN: i64 = 111019;

/// Main error type for the library
#[derive(Debug, Error)]
pub enum Error {
    /// The device no longer accepts the session identity.
    ///
    /// Recovery belongs to the caller: run `start()` again and retry once.
    #[error("Session identity rejected by device (code 125002)")]
    SessionInvalid,

    /// The device is busy with a previous command
    #[error("Device busy, try again (code 111019)")]
    TransientBusy,

    /// Any other error code reported in an `<error>` envelope
    #[error("Device error {code}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Device {
        /// Raw code from the `<code>` node
        code: i64,
        /// Optional `<message>` text
        message: Option<String>,
    },

    /// The CSRF page did not yield exactly two tokens
    #[error("Expected 2 csrf tokens on {page}, found {found}")]
    TokenParse {
        /// Page that was scraped
        page: String,
        /// Number of matching meta elements
        found: usize,
    },

    /// Network-layer failure (connection refused, timeouts, proxy errors)
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Malformed XML in a device response
    #[error("XML error: {message}")]
    Xml {
        /// Parser message
        message: String,
    },

    /// A field required by a typed accessor is absent
    #[error("Missing field '{field}' in {context}")]
    MissingField {
        /// Field name
        field: String,
        /// Envelope section the field was looked up in
        context: String,
    },

    /// A field is present but cannot be converted
    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidField {
        /// Field name
        field: String,
        /// Raw value
        value: String,
    },

    /// A command was issued before `start()` or after `finish()`
    #[error("Session not started")]
    NotStarted,

    /// The device never handed out a usable session identity
    #[error("Failed to obtain a session identity after {attempts} attempts")]
    SessionBootstrap {
        /// Bootstrap requests performed
        attempts: u32,
    },

    /// The caller aborted a long-running operation
    #[error("Operation cancelled: {operation}")]
    Cancelled {
        /// Operation that was running
        operation: String,
    },

    /// Configuration errors
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal issue
        message: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a device error from a raw code
    pub fn device(code: i64, message: Option<String>) -> Self {
        Self::Device { code, message }
    }

    /// Create a token parse error
    pub fn token_parse<S: Into<String>>(page: S, found: usize) -> Self {
        Self::TokenParse {
            page: page.into(),
            found,
        }
    }

    /// Create an XML error
    pub fn xml<S: Into<String>>(message: S) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field<S: Into<String>>(field: S, context: S) -> Self {
        Self::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }

    /// Create an invalid field error
    pub fn invalid_field<S: Into<String>>(field: S, value: S) -> Self {
        Self::InvalidField {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(field: S, message: S) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Device code carried by this error, if it came from an `<error>` envelope
    pub fn device_code(&self) -> Option<i64> {
        match self {
            Error::SessionInvalid => Some(ERROR_SESSION_INVALID),
            Error::TransientBusy => Some(ERROR_TRY_AGAIN),
            Error::Device { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::TransientBusy => true,
            Error::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::SessionInvalid => "session_invalid",
            Error::TransientBusy => "transient_busy",
            Error::Device { .. } => "device",
            Error::TokenParse { .. } => "token_parse",
            Error::Transport(..) => "transport",
            Error::Xml { .. } => "xml",
            Error::MissingField { .. } | Error::InvalidField { .. } => "envelope",
            Error::NotStarted | Error::SessionBootstrap { .. } => "session",
            Error::Cancelled { .. } => "cancelled",
            Error::Config { .. } | Error::Toml(..) => "config",
            Error::Url(..) => "url",
            Error::Json(..) => "json",
            Error::Io(..) => "io",
            Error::Internal { .. } => "internal",
        }
    }
}
