//! Command implementations
//!
//! Every command prints its result to stdout, either as pretty JSON (`--json`)
//! or as a short human-readable table. Errors bubble up to `run` which owns
//! error reporting.

use anyhow::{Result, bail};
use easylpac_config::Config;
use easylpac_lpa::{
    ApduDriver, ConfirmPrompt, EuiccInfo, InstallNotification, Lpac, Notification,
    NotificationMode, Profile, PullInfo,
};
use serde::Serialize;
use serde_json::json;
use std::io::{self, BufRead, Write};

use super::args::{
    ChipCommands, Commands, DownloadArgs, DriverCommands, NotificationCommands, ProfileCommands,
};

/// Output mode shared by all commands.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Output {
    pub json: bool,
}

impl Output {
    fn emit<T: Serialize>(self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        let rendered = if self.json {
            serde_json::to_string_pretty(value)?
        } else {
            text()
        };
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{rendered}")?;
        Ok(())
    }
}

/// Yes/no question on stderr, answered on stdin. Anything but `y`/`yes` is no,
/// including end of input.
pub(crate) struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, title: &str, message: &str) -> bool {
        eprint!("{title}\n{message} [y/N] ");
        let _ = io::stderr().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

pub(crate) fn execute(command: Commands, lpac: &Lpac, config: &Config, out: Output) -> Result<()> {
    match command {
        Commands::Chip(ChipCommands::Info) => {
            let info = lpac.chip_info()?;
            out.emit(&info, || format_chip_info(&info))
        }
        Commands::Chip(ChipCommands::DefaultSmdp { address }) => {
            lpac.chip_default_smdp(&address)?;
            out.emit(&json!({ "default_smdp": address }), || {
                if address.is_empty() {
                    "Default SM-DP+ address cleared".to_string()
                } else {
                    format!("Default SM-DP+ address set to {address}")
                }
            })
        }
        Commands::Profile(cmd) => execute_profile(cmd, lpac, config, out),
        Commands::Notification(cmd) => execute_notification(cmd, lpac, out),
        Commands::Driver(DriverCommands::List) => {
            let drivers = lpac.driver_apdu_list()?;
            out.emit(&drivers, || format_drivers(&drivers))
        }
        Commands::Version => {
            let version = lpac.version()?;
            out.emit(&json!({ "lpac": version }), || version.clone())
        }
        Commands::Config => execute_config(config, out),
    }
}

fn execute_profile(cmd: ProfileCommands, lpac: &Lpac, config: &Config, out: Output) -> Result<()> {
    match cmd {
        ProfileCommands::List => {
            let profiles = lpac.profile_list()?;
            out.emit(&profiles, || format_profiles(&profiles))
        }
        ProfileCommands::Enable { iccid } => {
            lpac.profile_enable(&iccid)?;
            out.emit(&json!({ "iccid": iccid, "state": "enabled" }), || {
                format!("Profile {iccid} enabled")
            })
        }
        ProfileCommands::Disable { iccid } => {
            lpac.profile_disable(&iccid)?;
            out.emit(&json!({ "iccid": iccid, "state": "disabled" }), || {
                format!("Profile {iccid} disabled")
            })
        }
        ProfileCommands::Delete { iccid, yes } => {
            if !yes
                && !StdinPrompt.confirm(
                    "Delete Profile",
                    &format!("Profile {iccid} will be removed from the card permanently. Continue?"),
                )
            {
                bail!("Deletion of profile {iccid} cancelled");
            }
            lpac.profile_delete(&iccid)?;
            out.emit(&json!({ "iccid": iccid, "deleted": true }), || {
                format!("Profile {iccid} deleted")
            })
        }
        ProfileCommands::Nickname { iccid, nickname } => {
            lpac.profile_nickname(&iccid, &nickname)?;
            out.emit(&json!({ "iccid": iccid, "nickname": nickname }), || {
                format!("Profile {iccid} renamed to {nickname}")
            })
        }
        ProfileCommands::Download(args) => execute_download(&args, lpac, config, out),
    }
}

/// Merge an activation code with the explicit flags; flags win.
pub(crate) fn pull_info(args: &DownloadArgs) -> Result<PullInfo> {
    let mut pull = match &args.activation_code {
        Some(code) => match PullInfo::from_activation_code(code) {
            Some(pull) => pull,
            None => bail!("Invalid activation code: expected LPA:1$<SM-DP+ address>$<matching id>"),
        },
        None => PullInfo::default(),
    };

    if args.smdp.is_some() {
        pull.smdp.clone_from(&args.smdp);
    }
    if args.match_id.is_some() {
        pull.match_id.clone_from(&args.match_id);
    }
    pull.confirm_code.clone_from(&args.confirm_code);
    pull.imei.clone_from(&args.imei);
    Ok(pull)
}

fn execute_download(args: &DownloadArgs, lpac: &Lpac, config: &Config, out: Output) -> Result<()> {
    let pull = pull_info(args)?;
    let mode = if args.manual || !config.auto_process_notifications() {
        NotificationMode::Manual
    } else {
        NotificationMode::Auto
    };

    let outcome = lpac.download_profile(&pull, mode, &StdinPrompt)?;

    let (status, seq, detail) = match &outcome {
        InstallNotification::Sent(n) => ("sent", Some(n.seq_number), None),
        InstallNotification::SendFailed {
            notification,
            error,
        } => ("send_failed", Some(notification.seq_number), Some(error.to_string())),
        InstallNotification::Declined(n) => ("kept", Some(n.seq_number), None),
        InstallNotification::Missing => ("not_found", None, None),
        InstallNotification::RefreshFailed(error) => ("unknown", None, Some(error.to_string())),
    };

    out.emit(
        &json!({
            "downloaded": true,
            "install_notification": { "status": status, "seq": seq, "error": detail },
        }),
        || format_download_outcome(&outcome),
    )
}

fn format_download_outcome(outcome: &InstallNotification) -> String {
    match outcome {
        InstallNotification::Sent(_) => "Download successful\n\
             Send install notification successful\n\
             Remove install notification successful"
            .to_string(),
        InstallNotification::SendFailed { error, .. } => {
            format!("Download successful\nSend install notification failed\n{error}")
        }
        InstallNotification::Declined(n) => format!(
            "Download successful\nInstall notification {} kept on the card; \
             send it later with `easylpac notification process {} --remove`",
            n.seq_number, n.seq_number
        ),
        InstallNotification::Missing => {
            "Download successful\nInstall notification not found".to_string()
        }
        InstallNotification::RefreshFailed(error) => format!(
            "Download successful\nCould not read notifications after the download\n{error}"
        ),
    }
}

fn execute_notification(cmd: NotificationCommands, lpac: &Lpac, out: Output) -> Result<()> {
    match cmd {
        NotificationCommands::List => {
            let notifications = lpac.notification_list()?;
            out.emit(&notifications, || format_notifications(&notifications))
        }
        NotificationCommands::Process { seq, all, remove } => {
            let processed = match seq {
                Some(seq) if !all => {
                    lpac.notification_process(seq, remove)?;
                    vec![seq]
                }
                _ => lpac.notification_process_all(remove)?,
            };
            out.emit(&json!({ "processed": processed, "removed": remove }), || {
                summarize("Processed", &processed)
            })
        }
        NotificationCommands::Remove { seq, all } => {
            let removed = match seq {
                Some(seq) if !all => {
                    lpac.notification_remove(seq)?;
                    vec![seq]
                }
                _ => lpac.notification_remove_all()?,
            };
            out.emit(&json!({ "removed": removed }), || summarize("Removed", &removed))
        }
    }
}

pub(crate) fn execute_config(config: &Config, out: Output) -> Result<()> {
    let effective = config.effective_config();
    let as_json: serde_json::Map<String, serde_json::Value> = effective
        .iter()
        .map(|(key, (value, source))| {
            (
                key.clone(),
                json!({ "value": value, "source": source.label() }),
            )
        })
        .collect();

    out.emit(&as_json, || {
        let mut text = match &config.config_path {
            Some(path) if path.is_file() => format!("Config file: {}\n", path.display()),
            _ => "Config file: (none)\n".to_string(),
        };
        let width = effective.keys().map(String::len).max().unwrap_or(0);
        for (key, (value, source)) in &effective {
            text.push_str(&format!("{key:<width$}  {value}  [{source}]\n"));
        }
        text.trim_end().to_string()
    })
}

fn summarize(verb: &str, seqs: &[u32]) -> String {
    if seqs.is_empty() {
        return "No pending notifications".to_string();
    }
    let list: Vec<String> = seqs.iter().map(u32::to_string).collect();
    format!("{verb} notification(s): {}", list.join(", "))
}

/// Left-aligned columns separated by two spaces.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(headers.to_vec())];
    lines.extend(rows.iter().map(|row| render(row.iter().map(String::as_str).collect())));
    lines.join("\n")
}

fn format_profiles(profiles: &[Profile]) -> String {
    if profiles.is_empty() {
        return "No profiles installed".to_string();
    }
    let rows: Vec<Vec<String>> = profiles
        .iter()
        .map(|p| {
            vec![
                p.iccid.clone(),
                p.profile_state.clone().unwrap_or_default(),
                p.display_name().to_string(),
                p.service_provider_name.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(&["ICCID", "STATE", "NAME", "PROVIDER"], &rows)
}

fn format_notifications(notifications: &[Notification]) -> String {
    if notifications.is_empty() {
        return "No pending notifications".to_string();
    }
    let rows: Vec<Vec<String>> = notifications
        .iter()
        .map(|n| {
            vec![
                n.seq_number.to_string(),
                n.profile_management_operation.clone(),
                n.notification_address.clone(),
                n.iccid.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(&["SEQ", "OPERATION", "ADDRESS", "ICCID"], &rows)
}

fn format_drivers(drivers: &[ApduDriver]) -> String {
    if drivers.is_empty() {
        return "No card readers found".to_string();
    }
    let rows: Vec<Vec<String>> = drivers
        .iter()
        .map(|d| vec![d.env.clone(), d.name.clone()])
        .collect();
    table(&["ENV", "NAME"], &rows)
}

fn format_chip_info(info: &EuiccInfo) -> String {
    let or_dash = |value: Option<&str>| value.filter(|v| !v.is_empty()).unwrap_or("-").to_string();
    let mut rows = vec![
        vec!["EID".to_string(), info.eid.clone()],
        vec![
            "Default SM-DP+".to_string(),
            or_dash(info.configured_addresses.default_dp_address.as_deref()),
        ],
        vec![
            "Root SM-DS".to_string(),
            or_dash(info.configured_addresses.root_ds_address.as_deref()),
        ],
    ];

    if let Some(info2) = &info.info2 {
        let resources = &info2.ext_card_resource;
        let bytes = |value: Option<u64>| value.map_or_else(|| "-".to_string(), |v| format!("{v} bytes"));
        rows.extend([
            vec!["Profile version".to_string(), or_dash(info2.profile_version.as_deref())],
            vec!["SGP.22 version".to_string(), or_dash(info2.svn.as_deref())],
            vec!["Firmware".to_string(), or_dash(info2.euicc_firmware_ver.as_deref())],
            vec![
                "Installed apps".to_string(),
                resources
                    .installed_application
                    .map_or_else(|| "-".to_string(), |v| v.to_string()),
            ],
            vec!["Free NVM".to_string(), bytes(resources.free_non_volatile_memory)],
            vec!["Free RAM".to_string(), bytes(resources.free_volatile_memory)],
            vec![
                "Platform label".to_string(),
                or_dash(info2.certification_data_object.platform_label.as_deref()),
            ],
            vec![
                "Discovery URL".to_string(),
                or_dash(info2.certification_data_object.discovery_base_url.as_deref()),
            ],
        ]);
    }

    rows.iter()
        .map(|row| format!("{:<16}{}", format!("{}:", row[0]), row[1]))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_info_from_activation_code_and_flags() {
        let args = DownloadArgs {
            activation_code: Some("LPA:1$rsp.example.com$CODE-1".to_string()),
            match_id: Some("OVERRIDE".to_string()),
            imei: Some("356938035643809".to_string()),
            ..DownloadArgs::default()
        };
        let pull = pull_info(&args).unwrap();
        assert_eq!(pull.smdp.as_deref(), Some("rsp.example.com"));
        assert_eq!(pull.match_id.as_deref(), Some("OVERRIDE"));
        assert_eq!(pull.imei.as_deref(), Some("356938035643809"));
        assert!(pull.confirm_code.is_none());
    }

    #[test]
    fn test_pull_info_without_smdp_leaves_address_to_lpac() {
        // lpac falls back to the card's default SM-DP+ address.
        let pull = pull_info(&DownloadArgs::default()).unwrap();
        assert_eq!(pull.to_args(), ["profile", "download"]);

        let match_only = DownloadArgs {
            match_id: Some("ABC".to_string()),
            ..DownloadArgs::default()
        };
        let pull = pull_info(&match_only).unwrap();
        assert_eq!(pull.smdp, None);
        assert_eq!(pull.to_args(), ["profile", "download", "-m", "ABC"]);
    }

    #[test]
    fn test_pull_info_rejects_bad_activation_code() {
        let bad_code = DownloadArgs {
            activation_code: Some("not-an-activation-code".to_string()),
            ..DownloadArgs::default()
        };
        assert!(pull_info(&bad_code).is_err());
    }

    #[test]
    fn test_profile_table() {
        let profiles = vec![
            Profile {
                iccid: "8944000000000000001".to_string(),
                profile_state: Some("enabled".to_string()),
                profile_name: Some("Example".to_string()),
                service_provider_name: Some("Example Mobile".to_string()),
                ..Profile::default()
            },
            Profile {
                iccid: "8944000000000000002".to_string(),
                profile_state: Some("disabled".to_string()),
                profile_nickname: Some("Travel".to_string()),
                ..Profile::default()
            },
        ];
        let text = format_profiles(&profiles);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ICCID"));
        assert!(lines[1].contains("enabled") && lines[1].contains("Example Mobile"));
        assert!(lines[2].contains("Travel"));
        assert!(lines.iter().all(|line| line == &line.trim_end()));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(format_profiles(&[]), "No profiles installed");
        assert_eq!(format_notifications(&[]), "No pending notifications");
        assert_eq!(format_drivers(&[]), "No card readers found");
        assert_eq!(summarize("Processed", &[]), "No pending notifications");
        assert_eq!(summarize("Removed", &[3, 4]), "Removed notification(s): 3, 4");
    }

    #[test]
    fn test_chip_info_text() {
        let info = EuiccInfo {
            eid: "89049032000000000000000000000001".to_string(),
            ..EuiccInfo::default()
        };
        let text = format_chip_info(&info);
        assert!(text.starts_with("EID:            89049032000000000000000000000001"));
        assert!(text.contains("Default SM-DP+: -"));
    }
}
