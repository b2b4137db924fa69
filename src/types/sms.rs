//! SMS responses and request arguments

use crate::envelope::{XmlMap, XmlValue, coerce_to_sequence};
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout used in message `<Date>` fields
pub const SMS_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Per-folder counts from `/api/sms/sms-count`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsCount {
    pub local_unread: u32,
    pub local_inbox: u32,
    pub local_outbox: u32,
    pub local_draft: u32,
    pub local_deleted: u32,
    pub local_max: u32,
    pub sim_unread: u32,
    pub sim_inbox: u32,
    pub sim_outbox: u32,
    pub sim_draft: u32,
    pub sim_max: u32,
    pub new_msg: u32,
}

impl TryFrom<&XmlMap> for SmsCount {
    type Error = Error;

    fn try_from(fields: &XmlMap) -> Result<Self> {
        Ok(Self {
            local_unread: fields.parse("LocalUnread")?,
            local_inbox: fields.parse("LocalInbox")?,
            local_outbox: fields.parse_or_default("LocalOutbox")?,
            local_draft: fields.parse_or_default("LocalDraft")?,
            local_deleted: fields.parse_or_default("LocalDeleted")?,
            local_max: fields.parse_or_default("LocalMax")?,
            sim_unread: fields.parse_or_default("SimUnread")?,
            sim_inbox: fields.parse_or_default("SimInbox")?,
            sim_outbox: fields.parse_or_default("SimOutbox")?,
            sim_draft: fields.parse_or_default("SimDraft")?,
            sim_max: fields.parse_or_default("SimMax")?,
            new_msg: fields.parse_or_default("NewMsg")?,
        })
    }
}

/// One inbox message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    /// Device-assigned index, used by `set_read` and `delete_sms`
    pub index: u32,
    /// Receive time as reported (`YYYY-MM-DD HH:MM:SS`, device local time)
    pub date: String,
    /// Sender
    pub phone: String,
    /// Message text
    pub content: String,
    /// Whether the message has been read (`Smstat` = 1)
    pub read: bool,
}

impl SmsMessage {
    /// Receive time parsed from [`date`](Self::date)
    pub fn received_at(&self) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, SMS_DATE_FORMAT)
            .map_err(|_| Error::invalid_field("Date", &self.date))
    }
}

impl TryFrom<&XmlMap> for SmsMessage {
    type Error = Error;

    fn try_from(fields: &XmlMap) -> Result<Self> {
        Ok(Self {
            index: fields.parse("Index")?,
            date: fields.text("Date")?.to_string(),
            phone: fields.text("Phone")?.to_string(),
            content: fields.text("Content")?.to_string(),
            read: fields.parse_or_default::<u8>("Smstat")? == 1,
        })
    }
}

/// A page of messages from `/api/sms/sms-list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsList {
    /// Total messages in the box, as reported
    pub count: u32,
    /// Messages on this page, in device order
    pub messages: Vec<SmsMessage>,
}

impl TryFrom<&XmlMap> for SmsList {
    type Error = Error;

    fn try_from(fields: &XmlMap) -> Result<Self> {
        let items = coerce_to_sequence(fields.get("Messages").and_then(|m| m.get("Message")));

        let messages = items
            .into_iter()
            .map(|item| match item {
                XmlValue::Map(message) => SmsMessage::try_from(message),
                other => Err(Error::invalid_field("Message", &format!("{:?}", other))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            count: fields.parse_or_default("Count")?,
            messages,
        })
    }
}

/// Message indices for `delete_sms`: a single index or a sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmsIndices(Vec<u32>);

impl SmsIndices {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }
}

impl From<u32> for SmsIndices {
    fn from(index: u32) -> Self {
        Self(vec![index])
    }
}

impl From<Vec<u32>> for SmsIndices {
    fn from(indices: Vec<u32>) -> Self {
        Self(indices)
    }
}

impl From<&[u32]> for SmsIndices {
    fn from(indices: &[u32]) -> Self {
        Self(indices.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for SmsIndices {
    fn from(indices: [u32; N]) -> Self {
        Self(indices.to_vec())
    }
}
