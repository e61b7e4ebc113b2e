//! Command adapter around the `lpac` eUICC driver
//!
//! The driver is an opaque executable. This crate:
//!
//! - builds its argument vectors and fully replaced environment ([`DriverSettings`]),
//! - runs it through a [`ProcessRunner`](easylpac_runner::ProcessRunner) while
//!   announcing busy/locked state to a [`StatusNotifier`] ([`Lpac::run`]),
//! - scans the newline-delimited JSON it prints for the terminal `lpa` record
//!   ([`stream::parse_result`]),
//! - renders structured failures into width-wrapped text ([`render`]),
//! - and decodes successful payloads into typed records ([`model`]).

pub mod download;
pub mod error;
pub mod invoker;
pub mod model;
pub mod notifier;
mod ops;
pub mod render;
pub mod stream;

#[cfg(test)]
mod test_support;

pub use download::{ConfirmPrompt, InstallNotification, NotificationMode, find_new_notification};
pub use error::{ErrorCategory, ErrorKind, LpaFailure, LpacError, UserFriendlyError};
pub use invoker::{DEFAULT_EXECUTABLE, DEFAULT_TIMEOUT, DriverSettings, Lpac, SMARTCARD_MARKER};
pub use model::{ApduDriver, EuiccInfo, Notification, Profile, PullInfo};
pub use notifier::{BusyGuard, ChannelNotifier, NoopNotifier, StatusNotifier, TracingNotifier, UiSignal};
