//! Command client and USSD poll engine
//!
//! [`ModemClient`] is the surface consumed by front ends; [`Poller`] is the
//! bounded retry loop it uses to wait for asynchronous USSD replies.

pub mod modem;
pub mod poll;

pub use modem::{ModemClient, ModemClientGeneric, endpoints};
pub use poll::{DEFAULT_POLL_INTERVAL, PollOutcome, Poller};
