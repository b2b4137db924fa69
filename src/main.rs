//! Command-line client for HiLink LTE modems
//!
//! Runs a single device operation and prints the result as JSON.
//!
//! # Usage
//!
//! ```bash
//! hilink traffic
//! hilink sms list --page 1 --count 20
//! hilink sms delete 40001 40002
//! hilink ussd "*100#" --timeout 30
//! hilink --base-url http://192.168.1.1 notifications
//! ```

use clap::{Parser, Subcommand};

use hilink_client::cli::{self, GlobalArgs, ModemCommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "hilink")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<String>,

    /// Device base URL (default http://192.168.8.1)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Proxy server URL (http://host:port, socks5://host:port, etc.)
    #[arg(short, long, global = true, value_name = "PROXY")]
    proxy: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current traffic statistics
    Traffic,
    /// Show monthly traffic statistics
    MonthTraffic,
    /// Show notification flags
    Notifications,
    /// Show SMS counts per folder
    SmsCount,
    /// Manage text messages
    Sms {
        #[command(subcommand)]
        action: SmsAction,
    },
    /// Send a USSD code and wait for the reply
    Ussd {
        /// USSD code, e.g. *100#
        #[arg(allow_hyphen_values = true)]
        code: String,

        /// Seconds to wait for the reply
        #[arg(short, long)]
        timeout: Option<u64>,
    },
}

#[derive(Subcommand)]
enum SmsAction {
    /// List inbox messages, newest first
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Messages per page
        #[arg(long, default_value_t = 20)]
        count: u32,
    },
    /// Mark a message as read
    Read { index: u32 },
    /// Delete one or more messages
    Delete {
        #[arg(required = true, num_args = 1..)]
        indices: Vec<u32>,
    },
}

impl From<Commands> for ModemCommand {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Traffic => ModemCommand::Traffic,
            Commands::MonthTraffic => ModemCommand::MonthTraffic,
            Commands::Notifications => ModemCommand::Notifications,
            Commands::SmsCount => ModemCommand::SmsCount,
            Commands::Sms { action } => match action {
                SmsAction::List { page, count } => ModemCommand::SmsList { page, count },
                SmsAction::Read { index } => ModemCommand::SmsRead { index },
                SmsAction::Delete { indices } => ModemCommand::SmsDelete { indices },
            },
            Commands::Ussd { code, timeout } => ModemCommand::Ussd { code, timeout },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let args = GlobalArgs {
        config: cli.config,
        base_url: cli.base_url,
        proxy: cli.proxy,
        verbose: cli.verbose,
    };
    cli::run(args, cli.command.into()).await
}
