//! Typed command results
//!
//! Each result is built from the generic field map of a decoded response.

pub mod monitoring;
pub mod sms;
pub mod ussd;

pub use monitoring::{MonthTrafficStat, Notifications, TrafficStat};
pub use sms::{SmsCount, SmsIndices, SmsList, SmsMessage};
pub use ussd::UssdResult;
