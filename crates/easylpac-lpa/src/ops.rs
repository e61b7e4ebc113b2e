//! Typed operations on [`Lpac`]
//!
//! Each operation fixes the driver's argument template and decodes the result
//! payload into a record from [`crate::model`].

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::error::LpacError;
use crate::invoker::Lpac;
use crate::model::{ApduDriver, EuiccInfo, Notification, Profile};

fn decode_payload<T: DeserializeOwned>(
    operation: &'static str,
    payload: Option<Value>,
) -> Result<T, LpacError> {
    let value = payload.ok_or(LpacError::NoResult { operation })?;
    serde_json::from_value(value).map_err(|source| LpacError::Decode { operation, source })
}

impl Lpac {
    fn query<T: DeserializeOwned>(&self, operation: &'static str, args: &[&str]) -> Result<T, LpacError> {
        decode_payload(operation, self.run(args)?)
    }

    /// Run an operation whose payload carries nothing of interest.
    fn execute(&self, args: &[&str]) -> Result<(), LpacError> {
        self.run(args).map(drop)
    }

    pub fn chip_info(&self) -> Result<EuiccInfo, LpacError> {
        self.query("chip info", &["chip", "info"])
    }

    pub fn profile_list(&self) -> Result<Vec<Profile>, LpacError> {
        self.query("profile list", &["profile", "list"])
    }

    pub fn profile_enable(&self, iccid: &str) -> Result<(), LpacError> {
        self.execute(&["profile", "enable", iccid])?;
        info!(iccid, "Profile enabled");
        Ok(())
    }

    pub fn profile_disable(&self, iccid: &str) -> Result<(), LpacError> {
        self.execute(&["profile", "disable", iccid])?;
        info!(iccid, "Profile disabled");
        Ok(())
    }

    pub fn profile_delete(&self, iccid: &str) -> Result<(), LpacError> {
        self.execute(&["profile", "delete", iccid])?;
        info!(iccid, "Profile deleted");
        Ok(())
    }

    pub fn profile_nickname(&self, iccid: &str, nickname: &str) -> Result<(), LpacError> {
        self.execute(&["profile", "nickname", iccid, nickname])
    }

    pub fn notification_list(&self) -> Result<Vec<Notification>, LpacError> {
        self.query("notification list", &["notification", "list"])
    }

    /// Send notification `seq` to its SM-DP+; with `remove` it is deleted from
    /// the card afterwards.
    pub fn notification_process(&self, seq: u32, remove: bool) -> Result<(), LpacError> {
        let seq = seq.to_string();
        let mut args = vec!["notification", "process", seq.as_str()];
        if remove {
            args.push("-r");
        }
        self.execute(&args)?;
        info!(seq = %seq, remove, "Notification processed");
        Ok(())
    }

    pub fn notification_remove(&self, seq: u32) -> Result<(), LpacError> {
        let seq = seq.to_string();
        self.execute(&["notification", "remove", seq.as_str()])
    }

    /// Process every pending notification, stopping at the first failure.
    ///
    /// Returns the sequence numbers that were processed.
    pub fn notification_process_all(&self, remove: bool) -> Result<Vec<u32>, LpacError> {
        let mut done = Vec::new();
        for notification in self.notification_list()? {
            self.notification_process(notification.seq_number, remove)?;
            done.push(notification.seq_number);
        }
        Ok(done)
    }

    /// Remove every pending notification without sending it, stopping at the
    /// first failure.
    pub fn notification_remove_all(&self) -> Result<Vec<u32>, LpacError> {
        let mut done = Vec::new();
        for notification in self.notification_list()? {
            self.notification_remove(notification.seq_number)?;
            done.push(notification.seq_number);
        }
        Ok(done)
    }

    pub fn driver_apdu_list(&self) -> Result<Vec<ApduDriver>, LpacError> {
        self.query("driver apdu list", &["driver", "apdu", "list"])
    }

    /// Set the default SM-DP+ address. An empty `address` clears it.
    pub fn chip_default_smdp(&self, address: &str) -> Result<(), LpacError> {
        self.execute(&["chip", "defaultsmdp", address])
    }

    /// Driver version string.
    pub fn version(&self) -> Result<String, LpacError> {
        self.query("version", &["version"])
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ErrorKind, LpacError};
    use crate::test_support::{ScriptedRunner, client, lpa_err, lpa_ok, raw};

    #[test]
    fn test_argument_templates() {
        let runner = ScriptedRunner::new((0..11).map(|_| lpa_ok("null")));
        let lpac = client(&runner);

        lpac.profile_enable("8944").unwrap();
        lpac.profile_disable("8944").unwrap();
        lpac.profile_delete("8944").unwrap();
        lpac.profile_nickname("8944", "Work phone").unwrap();
        lpac.notification_process(3, false).unwrap();
        lpac.notification_process(4, true).unwrap();
        lpac.notification_remove(5).unwrap();
        lpac.chip_default_smdp("rsp.example.com").unwrap();
        lpac.chip_default_smdp("").unwrap();
        lpac.run(&["profile", "list"]).unwrap();
        lpac.run(&["driver", "apdu", "list"]).unwrap();

        assert_eq!(
            runner.argv(),
            vec![
                vec!["profile", "enable", "8944"],
                vec!["profile", "disable", "8944"],
                vec!["profile", "delete", "8944"],
                vec!["profile", "nickname", "8944", "Work phone"],
                vec!["notification", "process", "3"],
                vec!["notification", "process", "4", "-r"],
                vec!["notification", "remove", "5"],
                vec!["chip", "defaultsmdp", "rsp.example.com"],
                vec!["chip", "defaultsmdp", ""],
                vec!["profile", "list"],
                vec!["driver", "apdu", "list"],
            ]
        );
    }

    #[test]
    fn test_profile_list_decodes() {
        let runner = ScriptedRunner::new([lpa_ok(
            r#"[{"iccid":"8944","profileState":"enabled","profileName":"A"},{"iccid":"8945"}]"#,
        )]);
        let profiles = client(&runner).profile_list().unwrap();
        assert_eq!(profiles.len(), 2);
        assert!(profiles[0].is_enabled());
        assert_eq!(profiles[1].iccid, "8945");
    }

    #[test]
    fn test_empty_profile_list() {
        let runner = ScriptedRunner::new([lpa_ok("[]")]);
        assert!(client(&runner).profile_list().unwrap().is_empty());
    }

    #[test]
    fn test_missing_payload_is_no_result() {
        let runner = ScriptedRunner::new([raw("", "", 0)]);
        let err = client(&runner).chip_info().unwrap_err();
        assert!(matches!(err, LpacError::NoResult { operation: "chip info" }));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_missing_payload_is_fine_for_unit_operations() {
        let runner = ScriptedRunner::new([raw("", "", 0)]);
        client(&runner).profile_enable("8944").unwrap();
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let runner = ScriptedRunner::new([lpa_ok(r#"{"not":"a list"}"#)]);
        let err = client(&runner).notification_list().unwrap_err();
        assert!(matches!(err, LpacError::Decode { operation: "notification list", .. }));
    }

    #[test]
    fn test_null_members_in_results_decode() {
        let runner = ScriptedRunner::new([
            lpa_ok(r#"{"eidValue":"89049","EUICCInfo2":{"forbiddenProfilePolicyRules":null}}"#),
            lpa_ok(
                r#"[{"seqNumber":2,"profileManagementOperation":"delete","notificationAddress":null}]"#,
            ),
        ]);
        let lpac = client(&runner);

        let info = lpac.chip_info().unwrap();
        assert_eq!(info.eid, "89049");
        assert!(info.info2.unwrap().forbidden_profile_policy_rules.is_empty());

        let notifications = lpac.notification_list().unwrap();
        assert_eq!(notifications[0].seq_number, 2);
        assert!(notifications[0].notification_address.is_empty());
    }

    #[test]
    fn test_version_and_drivers() {
        let runner = ScriptedRunner::new([
            lpa_ok(r#""v2.1.0""#),
            lpa_ok(r#"[{"env":"0","name":"Generic USB Reader"}]"#),
        ]);
        let lpac = client(&runner);
        assert_eq!(lpac.version().unwrap(), "v2.1.0");
        let drivers = lpac.driver_apdu_list().unwrap();
        assert_eq!(drivers[0].env, "0");
        assert_eq!(drivers[0].name, "Generic USB Reader");
    }

    #[test]
    fn test_process_all_stops_at_first_failure() {
        let runner = ScriptedRunner::new([
            lpa_ok(r#"[{"seqNumber":1},{"seqNumber":2},{"seqNumber":3}]"#),
            lpa_ok("null"),
            lpa_err(-1, "es9p_handle_notification", r#""\"timeout\"""#),
        ]);
        let err = client(&runner).notification_process_all(true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Application);
        assert_eq!(
            runner.argv(),
            vec![
                vec!["notification", "list"],
                vec!["notification", "process", "1", "-r"],
                vec!["notification", "process", "2", "-r"],
            ]
        );
    }

    #[test]
    fn test_remove_all() {
        let runner = ScriptedRunner::new([
            lpa_ok(r#"[{"seqNumber":7},{"seqNumber":9}]"#),
            lpa_ok("null"),
            lpa_ok("null"),
        ]);
        assert_eq!(client(&runner).notification_remove_all().unwrap(), vec![7, 9]);
    }
}
