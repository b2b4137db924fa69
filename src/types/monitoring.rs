//! Monitoring responses: traffic counters and notification flags

use crate::envelope::XmlMap;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Counters from `/api/monitoring/traffic-statistics`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficStat {
    /// Seconds since the current connection was established
    pub current_connect_time: u64,
    /// Bytes sent on the current connection
    pub current_upload: u64,
    /// Bytes received on the current connection
    pub current_download: u64,
    /// Current download rate in bytes per second
    pub current_download_rate: u64,
    /// Current upload rate in bytes per second
    pub current_upload_rate: u64,
    /// Bytes sent since the counters were last cleared
    pub total_upload: u64,
    /// Bytes received since the counters were last cleared
    pub total_download: u64,
    /// Connected seconds since the counters were last cleared
    pub total_connect_time: u64,
}

impl TryFrom<&XmlMap> for TrafficStat {
    type Error = Error;

    fn try_from(fields: &XmlMap) -> Result<Self> {
        Ok(Self {
            current_connect_time: fields.parse("CurrentConnectTime")?,
            current_upload: fields.parse("CurrentUpload")?,
            current_download: fields.parse("CurrentDownload")?,
            current_download_rate: fields.parse("CurrentDownloadRate")?,
            current_upload_rate: fields.parse("CurrentUploadRate")?,
            total_upload: fields.parse("TotalUpload")?,
            total_download: fields.parse("TotalDownload")?,
            total_connect_time: fields.parse("TotalConnectTime")?,
        })
    }
}

/// Counters from `/api/monitoring/month_statistics`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTrafficStat {
    pub current_month_download: u64,
    pub current_month_upload: u64,
    /// Connected seconds this month
    pub month_duration: u64,
    /// Date the monthly counters were last reset, as reported
    pub month_last_clear_time: Option<String>,
}

impl TryFrom<&XmlMap> for MonthTrafficStat {
    type Error = Error;

    fn try_from(fields: &XmlMap) -> Result<Self> {
        Ok(Self {
            current_month_download: fields.parse("CurrentMonthDownload")?,
            current_month_upload: fields.parse("CurrentMonthUpload")?,
            month_duration: fields.parse("MonthDuration")?,
            month_last_clear_time: fields
                .text_opt("MonthLastClearTime")
                .filter(|value| !value.is_empty())
                .map(str::to_string),
        })
    }
}

/// Flags from `/api/monitoring/check-notifications`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notifications {
    /// Number of unread messages
    pub unread_message: u32,
    pub sms_storage_full: bool,
    /// Firmware update state code, device specific
    pub online_update_status: u32,
}

impl Notifications {
    pub fn has_unread(&self) -> bool {
        self.unread_message > 0
    }
}

impl TryFrom<&XmlMap> for Notifications {
    type Error = Error;

    fn try_from(fields: &XmlMap) -> Result<Self> {
        Ok(Self {
            unread_message: fields.parse("UnreadMessage")?,
            sms_storage_full: fields.parse_or_default::<u32>("SmsStorageFull")? != 0,
            online_update_status: fields.parse_or_default("OnlineUpdateStatus")?,
        })
    }
}
