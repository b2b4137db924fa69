//! Command execution for the `hilink` binary
//!
//! Loads configuration, opens a session, runs one command and prints its
//! result as JSON on stdout.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{Error, ModemClient, Settings, config::ConfigLoader, utils::version};

/// Options shared by every subcommand
#[derive(Debug, Default, Clone)]
pub struct GlobalArgs {
    pub config: Option<String>,
    pub base_url: Option<String>,
    pub proxy: Option<String>,
    pub verbose: bool,
}

/// One device operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModemCommand {
    Traffic,
    MonthTraffic,
    Notifications,
    SmsCount,
    SmsList { page: u32, count: u32 },
    SmsRead { index: u32 },
    SmsDelete { indices: Vec<u32> },
    Ussd { code: String, timeout: Option<u64> },
}

impl ModemCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ModemCommand::Traffic => "traffic",
            ModemCommand::MonthTraffic => "month-traffic",
            ModemCommand::Notifications => "notifications",
            ModemCommand::SmsCount => "sms-count",
            ModemCommand::SmsList { .. } => "sms list",
            ModemCommand::SmsRead { .. } => "sms read",
            ModemCommand::SmsDelete { .. } => "sms delete",
            ModemCommand::Ussd { .. } => "ussd",
        }
    }
}

/// Resolve settings with CLI flags applied on top of env, file and defaults
pub fn load_settings(args: &GlobalArgs) -> Result<Settings> {
    let loader = match &args.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let mut settings = loader.load().context("Failed to load configuration")?;

    if let Some(base_url) = &args.base_url {
        settings.modem.base_url = base_url.clone();
    }
    if let Some(proxy) = &args.proxy {
        settings.modem.proxy = Some(proxy.clone());
    }
    settings.logging.verbose |= args.verbose;

    settings
        .validate()
        .context("Invalid command-line overrides")?;
    Ok(settings)
}

/// Install the stderr subscriber.
///
/// `--verbose` wins over `RUST_LOG`, which wins over `logging.level`.
pub fn init_logging(settings: &Settings) {
    let env_filter = if settings.logging.verbose {
        EnvFilter::new("debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(&settings.logging.level)
    };

    // A second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Entry point used by `main`
pub async fn run(args: GlobalArgs, command: ModemCommand) -> Result<()> {
    let settings = load_settings(&args)?;
    init_logging(&settings);

    debug!(
        "{} running {} against {}",
        version::version_banner(),
        command.name(),
        settings.modem.base_url
    );

    let default_ussd_timeout = settings.ussd.timeout();
    let mut modem = ModemClient::new(settings)?;
    modem
        .start()
        .await
        .context("Failed to establish a session with the device")?;

    let cancel = CancellationToken::new();
    let ctrl_c_guard = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            ctrl_c_guard.cancel();
        }
    });

    let result = execute_with_recovery(&mut modem, &command, default_ussd_timeout, &cancel).await;

    ctrl_c.abort();
    modem.finish();

    let output = result.with_context(|| format!("{} failed", command.name()))?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Run `command`, restarting the session and retrying once if the device
/// reports it invalid
async fn execute_with_recovery(
    modem: &mut ModemClient,
    command: &ModemCommand,
    default_ussd_timeout: Duration,
    cancel: &CancellationToken,
) -> crate::Result<Value> {
    match execute(modem, command, default_ussd_timeout, cancel).await {
        Err(Error::SessionInvalid) => {
            warn!("Session rejected by the device, starting a new one");
            modem.start().await?;
            execute(modem, command, default_ussd_timeout, cancel).await
        }
        other => other,
    }
}

async fn execute(
    modem: &ModemClient,
    command: &ModemCommand,
    default_ussd_timeout: Duration,
    cancel: &CancellationToken,
) -> crate::Result<Value> {
    let value = match command {
        ModemCommand::Traffic => serde_json::to_value(modem.get_traffic_stat().await?)?,
        ModemCommand::MonthTraffic => {
            serde_json::to_value(modem.get_month_traffic_stat().await?)?
        }
        ModemCommand::Notifications => serde_json::to_value(modem.check_notifications().await?)?,
        ModemCommand::SmsCount => serde_json::to_value(modem.get_sms_count().await?)?,
        ModemCommand::SmsList { page, count } => {
            serde_json::to_value(modem.get_sms_list(*page, *count).await?)?
        }
        ModemCommand::SmsRead { index } => {
            modem.set_read(*index).await?;
            json!({ "read": index })
        }
        ModemCommand::SmsDelete { indices } => {
            modem.delete_sms(indices.clone()).await?;
            json!({ "deleted": indices })
        }
        ModemCommand::Ussd { code, timeout } => {
            let timeout = timeout
                .map(Duration::from_secs)
                .unwrap_or(default_ussd_timeout);
            match modem.ussd_request_cancellable(code, timeout, cancel).await? {
                Some(reply) => serde_json::to_value(reply)?,
                None => {
                    eprintln!("No USSD reply within {:?}", timeout);
                    Value::Null
                }
            }
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_overrides_win_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[modem]
base_url = "http://192.168.1.1"
proxy = "http://file-proxy:3128"
"#
        )
        .unwrap();

        let args = GlobalArgs {
            config: Some(file.path().to_string_lossy().into_owned()),
            base_url: Some("http://10.0.0.1".to_string()),
            proxy: None,
            verbose: true,
        };

        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.modem.base_url, "http://10.0.0.1");
        assert_eq!(
            settings.modem.proxy.as_deref(),
            Some("http://file-proxy:3128")
        );
        assert!(settings.logging.verbose);
    }

    #[test]
    fn test_verbose_from_file_survives_absent_flag() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nverbose = true").unwrap();

        let args = GlobalArgs {
            config: Some(file.path().to_string_lossy().into_owned()),
            verbose: false,
            ..GlobalArgs::default()
        };

        assert!(load_settings(&args).unwrap().logging.verbose);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = GlobalArgs {
            config: Some("/nonexistent/hilink/config.toml".to_string()),
            ..GlobalArgs::default()
        };
        assert!(load_settings(&args).is_err());
    }

    #[test]
    fn test_invalid_base_url_override_is_rejected() {
        let args = GlobalArgs {
            base_url: Some("not a url".to_string()),
            ..GlobalArgs::default()
        };
        assert!(load_settings(&args).is_err());
    }

    #[test]
    fn test_command_names() {
        assert_eq!(ModemCommand::Traffic.name(), "traffic");
        assert_eq!(
            ModemCommand::SmsDelete {
                indices: vec![1, 2]
            }
            .name(),
            "sms delete"
        );
        assert_eq!(
            ModemCommand::Ussd {
                code: "*100#".to_string(),
                timeout: None
            }
            .name(),
            "ussd"
        );
    }
}
