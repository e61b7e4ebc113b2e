//! CLI argument definitions and parsing structures

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// easylpac - manage eSIM profiles through the lpac driver
#[derive(Parser, Debug)]
#[command(name = "easylpac")]
#[command(about = "Manage eSIM profiles on an eUICC through the lpac driver")]
#[command(long_about = r#"
easylpac drives the lpac executable to inspect and manage the eSIM profiles on
an eUICC in a PC/SC card reader.

EXAMPLES:
  # Show the card's EID and capabilities
  easylpac chip info

  # List installed profiles as JSON
  easylpac profile list --json

  # Download a profile and send its install notification
  easylpac profile download --activation-code 'LPA:1$rsp.example.com$MATCHING-ID'

  # Send every pending notification and remove it from the card
  easylpac notification process --all --remove

  # Pick a card reader
  easylpac driver list
  easylpac --interface 1 profile list

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  The config file is --config, else $EASYLPAC_HOME/config.toml, else the nearest
  .easylpac/config.toml above the current directory, else the platform config dir
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory containing the lpac executable
    #[arg(long, global = true, value_name = "DIR")]
    pub lpac_dir: Option<PathBuf>,

    /// File name of the lpac executable inside the lpac directory
    #[arg(long, global = true, value_name = "NAME")]
    pub executable: Option<String>,

    /// Card reader to use (DRIVER_IFID; see `easylpac driver list`)
    #[arg(long, global = true, value_name = "ENV")]
    pub interface: Option<String>,

    /// Ask lpac to log HTTP traffic
    #[arg(long, global = true)]
    pub debug_http: bool,

    /// Ask lpac to log APDU traffic
    #[arg(long, global = true)]
    pub debug_apdu: bool,

    /// Seconds before a running lpac is killed (default: 600, min: 5, max: 3600)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Directory for lpac transcript logs
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// eUICC information and settings
    #[command(subcommand)]
    Chip(ChipCommands),

    /// Installed profiles
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Pending notifications
    #[command(subcommand)]
    Notification(NotificationCommands),

    /// Card reader drivers
    #[command(subcommand)]
    Driver(DriverCommands),

    /// Show the lpac version
    Version,

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Subcommand, Debug)]
pub enum ChipCommands {
    /// Show EID, configured addresses and EUICCInfo2
    Info,

    /// Set the default SM-DP+ address (empty clears it)
    DefaultSmdp {
        /// SM-DP+ address
        address: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List installed profiles
    List,

    /// Enable a profile
    Enable {
        /// ICCID of the profile
        iccid: String,
    },

    /// Disable a profile
    Disable {
        /// ICCID of the profile
        iccid: String,
    },

    /// Delete a profile from the card
    Delete {
        /// ICCID of the profile
        iccid: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Set a profile's nickname
    Nickname {
        /// ICCID of the profile
        iccid: String,

        /// New nickname
        nickname: String,
    },

    /// Download and install a profile
    Download(DownloadArgs),
}

#[derive(Args, Debug, Default)]
pub struct DownloadArgs {
    /// Activation code (LPA:1$<SM-DP+>$<matching id>)
    #[arg(long, value_name = "CODE")]
    pub activation_code: Option<String>,

    /// SM-DP+ address (overrides the activation code)
    #[arg(long, value_name = "ADDRESS")]
    pub smdp: Option<String>,

    /// Matching ID (overrides the activation code)
    #[arg(long, value_name = "ID")]
    pub match_id: Option<String>,

    /// Confirmation code
    #[arg(long, value_name = "CODE")]
    pub confirm_code: Option<String>,

    /// IMEI reported to the SM-DP+
    #[arg(long)]
    pub imei: Option<String>,

    /// Ask before sending the install notification
    #[arg(long)]
    pub manual: bool,
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommands {
    /// List pending notifications
    List,

    /// Send notifications to their SM-DP+
    Process {
        /// Sequence number
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        seq: Option<u32>,

        /// Process every pending notification
        #[arg(long)]
        all: bool,

        /// Remove each notification after sending it
        #[arg(short, long)]
        remove: bool,
    },

    /// Remove notifications without sending them
    Remove {
        /// Sequence number
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        seq: Option<u32>,

        /// Remove every pending notification
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DriverCommands {
    /// List the APDU drivers (card readers) lpac can use
    List,
}
