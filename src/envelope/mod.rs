//! XML envelope handling
//!
//! Every request and response exchanged with the device is an XML document
//! rooted at `request`, `response` or `error`. This module builds outbound
//! bodies, decodes inbound ones into a generic ordered field map and maps
//! device error codes onto typed errors.

pub mod codec;
pub mod value;

pub use codec::{
    DeviceErrorKind, Envelope, RequestKind, check, classify_error, decode, decode_checked, encode,
};
pub use value::{XmlMap, XmlValue, coerce_to_sequence};
