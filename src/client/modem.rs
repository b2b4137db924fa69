//! # Command Client
//!
//! Public surface for the device: traffic and notification queries, SMS
//! management and USSD requests. Each operation is composed from the session
//! transport, the token provider and the envelope codec; device errors are
//! raised as typed [`Error`] values instead of being returned as data.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use hilink_client::{ModemClient, Settings};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let mut modem = ModemClient::new(Settings::default())?;
//! modem.start().await?;
//!
//! if modem.check_notifications().await?.has_unread() {
//!     for message in modem.get_sms_list(1, 20).await?.messages {
//!         println!("{}: {}", message.phone, message.content);
//!     }
//! }
//!
//! match modem.ussd_request("*100#", Duration::from_secs(30)).await? {
//!     Some(reply) => println!("{}", reply.content),
//!     None => println!("no answer yet"),
//! }
//!
//! modem.finish();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

use crate::client::poll::{PollOutcome, Poller};
use crate::envelope::{self, Envelope, RequestKind};
use crate::session::{ModemTransport, SessionManager, TokenPage, fetch_tokens};
use crate::types::{
    MonthTrafficStat, Notifications, SmsCount, SmsIndices, SmsList, TrafficStat, UssdResult,
};
use crate::{Error, Result, config::Settings};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Device API endpoints
pub mod endpoints {
    pub const TRAFFIC_STATISTICS: &str = "/api/monitoring/traffic-statistics";
    pub const MONTH_STATISTICS: &str = "/api/monitoring/month_statistics";
    pub const CHECK_NOTIFICATIONS: &str = "/api/monitoring/check-notifications";
    pub const SMS_COUNT: &str = "/api/sms/sms-count";
    pub const SMS_LIST: &str = "/api/sms/sms-list";
    pub const SMS_SET_READ: &str = "/api/sms/set-reads";
    pub const SMS_DELETE: &str = "/api/sms/delete-sms";
    pub const USSD_SEND: &str = "/api/ussd/send";
    pub const USSD_GET: &str = "/api/ussd/get";
}

/// Command client bound to the live session manager
pub type ModemClient = ModemClientGeneric<SessionManager>;

/// Command client over any [`ModemTransport`]
#[derive(Debug)]
pub struct ModemClientGeneric<T: ModemTransport = SessionManager> {
    transport: T,
    poll_interval: Duration,
}

impl ModemClientGeneric<SessionManager> {
    /// Creates a client for the device configured in `settings`.
    ///
    /// Call [`start`](Self::start) before issuing commands.
    pub fn new(settings: Settings) -> Result<Self> {
        let transport = SessionManager::new(&settings)?;
        Ok(Self::with_transport(transport, settings.ussd.poll_interval()))
    }

    /// Establish (or re-establish) the device session
    pub async fn start(&mut self) -> Result<()> {
        self.transport.start().await
    }

    /// Release the session. Safe to call when no session is open.
    pub fn finish(&mut self) {
        self.transport.finish();
    }

    pub fn is_started(&self) -> bool {
        self.transport.is_started()
    }
}

impl<T> ModemClientGeneric<T>
where
    T: ModemTransport,
{
    /// Wrap an arbitrary transport
    pub fn with_transport(transport: T, poll_interval: Duration) -> Self {
        Self {
            transport,
            poll_interval,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current traffic counters
    pub async fn get_traffic_stat(&self) -> Result<TrafficStat> {
        let envelope = self.query(endpoints::TRAFFIC_STATISTICS).await?;
        TrafficStat::try_from(envelope.fields()?)
    }

    /// Monthly duration/upload/download counters
    pub async fn get_month_traffic_stat(&self) -> Result<MonthTrafficStat> {
        let envelope = self.query(endpoints::MONTH_STATISTICS).await?;
        MonthTrafficStat::try_from(envelope.fields()?)
    }

    /// Unread-message indicator and other flags
    pub async fn check_notifications(&self) -> Result<Notifications> {
        let envelope = self.query(endpoints::CHECK_NOTIFICATIONS).await?;
        Notifications::try_from(envelope.fields()?)
    }

    /// Per-folder message counts
    pub async fn get_sms_count(&self) -> Result<SmsCount> {
        let envelope = self.query(endpoints::SMS_COUNT).await?;
        SmsCount::try_from(envelope.fields()?)
    }

    /// One page of the inbox, newest first
    pub async fn get_sms_list(&self, page: u32, count: u32) -> Result<SmsList> {
        let envelope = self
            .command(
                TokenPage::SmsInbox,
                endpoints::SMS_LIST,
                &RequestKind::SmsList { page, count },
            )
            .await?;
        SmsList::try_from(envelope.fields()?)
    }

    /// Mark a message as read
    pub async fn set_read(&self, index: u32) -> Result<()> {
        self.command(
            TokenPage::SmsInbox,
            endpoints::SMS_SET_READ,
            &RequestKind::SetRead { index },
        )
        .await?;
        Ok(())
    }

    /// Delete a single message or a batch, in the given order
    pub async fn delete_sms(&self, indices: impl Into<SmsIndices>) -> Result<()> {
        let indices = indices.into();
        if indices.is_empty() {
            debug!("delete_sms called without indices, nothing to do");
            return Ok(());
        }

        self.command(
            TokenPage::SmsInbox,
            endpoints::SMS_DELETE,
            &RequestKind::DeleteSms {
                indices: indices.into_vec(),
            },
        )
        .await?;
        Ok(())
    }

    /// Submit a USSD code and wait for the reply.
    ///
    /// Returns `Ok(None)` when the device has not answered within `timeout`;
    /// the carrier may still complete the request out of band.
    pub async fn ussd_request(&self, command: &str, timeout: Duration) -> Result<Option<UssdResult>> {
        self.ussd_request_cancellable(command, timeout, &CancellationToken::new())
            .await
    }

    /// [`ussd_request`](Self::ussd_request) that stops early when `cancel` fires
    pub async fn ussd_request_cancellable(
        &self,
        command: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<UssdResult>> {
        let submitted_at = Instant::now();
        let deadline = submitted_at + timeout;

        let request = RequestKind::UssdSend {
            content: command.to_string(),
        };
        let submitted = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::cancelled("ussd submit")),
            result = self.command(TokenPage::Ussd, endpoints::USSD_SEND, &request) => result,
        };
        match submitted {
            Ok(_) => debug!("USSD {} submitted", command),
            Err(Error::TransientBusy) => {
                debug!("USSD {} submitted while device busy, polling anyway", command)
            }
            Err(e) => return Err(e),
        }

        let poller = Poller::new(timeout, self.poll_interval);
        let outcome = poller
            .run_until(deadline, cancel, || async move {
                let envelope = self.query(endpoints::USSD_GET).await?;
                UssdResult::try_from(envelope.fields()?)
            })
            .await?;

        match &outcome {
            PollOutcome::Succeeded { attempts, .. } => info!(
                "USSD {} answered after {} poll(s) in {:?}",
                command,
                attempts,
                submitted_at.elapsed()
            ),
            PollOutcome::TimedOut { attempts } => warn!(
                "USSD {} not answered within {:?} ({} polls)",
                command, timeout, attempts
            ),
        }

        Ok(outcome.into_option())
    }

    /// GET an endpoint and classify the response
    async fn query(&self, path: &str) -> Result<Envelope> {
        let text = self.transport.get(path).await?;
        envelope::decode_checked(&text)
    }

    /// POST a token-gated command and classify the response
    async fn command(&self, page: TokenPage, path: &str, request: &RequestKind) -> Result<Envelope> {
        let tokens = fetch_tokens(&self.transport, page).await?;
        let body = envelope::encode(request);

        debug!("Sending {} to {}", request.name(), path);
        let text = self
            .transport
            .post(path, body, Some(tokens.primary.as_str()))
            .await?;
        envelope::decode_checked(&text)
    }
}
