//! Profile download and its install notification
//!
//! A successful download leaves an `install` notification on the card that
//! should be sent to the SM-DP+. The notification list is captured before the
//! download and compared with a fresh list afterwards; the first new entry is
//! the install notification. If the first list cannot be read, every entry of
//! the second counts as new.

use tracing::{info, warn};

use crate::error::LpacError;
use crate::invoker::Lpac;
use crate::model::{Notification, PullInfo};

/// What to do with the install notification of a fresh download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationMode {
    /// Send and remove it immediately.
    #[default]
    Auto,
    /// Ask through a [`ConfirmPrompt`] first.
    Manual,
}

/// Yes/no question towards the user.
pub trait ConfirmPrompt {
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Outcome of the install notification step. The download itself succeeded in
/// every case.
#[derive(Debug)]
pub enum InstallNotification {
    /// No new notification appeared after the download.
    Missing,
    /// Sent and removed from the card.
    Sent(Notification),
    SendFailed {
        notification: Notification,
        error: LpacError,
    },
    /// Manual mode and the user chose not to send it.
    Declined(Notification),
    /// The notification list could not be read after the download.
    RefreshFailed(LpacError),
}

/// First entry of `after` whose sequence number is not in `before`.
#[must_use]
pub fn find_new_notification<'a>(
    before: &[Notification],
    after: &'a [Notification],
) -> Option<&'a Notification> {
    after
        .iter()
        .find(|candidate| !before.iter().any(|old| old.seq_number == candidate.seq_number))
}

impl Lpac {
    /// Download a profile, then deal with its install notification per `mode`.
    ///
    /// Only a failed download is returned as an error. A notification list that
    /// cannot be read beforehand is logged and treated as empty; everything
    /// after a successful download is reported through [`InstallNotification`].
    pub fn download_profile(
        &self,
        pull: &PullInfo,
        mode: NotificationMode,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<InstallNotification, LpacError> {
        let before = match self.notification_list() {
            Ok(before) => before,
            Err(error) => {
                warn!(error = %error, "Could not list notifications before download");
                Vec::new()
            }
        };
        self.run(&pull.to_args())?;
        info!(smdp = ?pull.smdp, "Profile downloaded");

        let after = match self.notification_list() {
            Ok(after) => after,
            Err(error) => {
                warn!(error = %error, "Could not list notifications after download");
                return Ok(InstallNotification::RefreshFailed(error));
            }
        };
        let Some(notification) = find_new_notification(&before, &after).cloned() else {
            warn!("No install notification found after download");
            return Ok(InstallNotification::Missing);
        };

        if mode == NotificationMode::Manual
            && !prompt.confirm(
                "Send Install Notification",
                "Download successful\nSend the install notification now?",
            )
        {
            return Ok(InstallNotification::Declined(notification));
        }

        Ok(match self.notification_process(notification.seq_number, true) {
            Ok(()) => InstallNotification::Sent(notification),
            Err(error) => {
                warn!(
                    seq = notification.seq_number,
                    error = %error,
                    "Failed to send install notification"
                );
                InstallNotification::SendFailed {
                    notification,
                    error,
                }
            }
        })
    }
}
