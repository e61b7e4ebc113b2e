//! Typed records decoded from successful driver results
//!
//! Field names follow the driver's JSON output. Every field is defaulted so
//! that sparse records from older or newer driver builds still decode, and
//! non-optional fields read an explicit `null` as their default.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Result of `chip info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EuiccInfo {
    #[serde(rename = "eidValue", deserialize_with = "null_as_default")]
    pub eid: String,
    #[serde(rename = "EuiccConfiguredAddresses", deserialize_with = "null_as_default")]
    pub configured_addresses: ConfiguredAddresses,
    #[serde(rename = "EUICCInfo2")]
    pub info2: Option<EuiccInfo2>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfiguredAddresses {
    pub default_dp_address: Option<String>,
    pub root_ds_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EuiccInfo2 {
    pub profile_version: Option<String>,
    pub svn: Option<String>,
    pub euicc_firmware_ver: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub ext_card_resource: ExtCardResource,
    #[serde(deserialize_with = "null_as_default")]
    pub uicc_capability: Vec<String>,
    pub javacard_version: Option<String>,
    pub globalplatform_version: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub rsp_capability: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub euicc_ci_pk_id_list_for_verification: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub euicc_ci_pk_id_list_for_signing: Vec<String>,
    pub euicc_category: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub forbidden_profile_policy_rules: Vec<String>,
    pub pp_version: Option<String>,
    pub sas_acreditation_number: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub certification_data_object: CertificationDataObject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtCardResource {
    pub installed_application: Option<u64>,
    pub free_non_volatile_memory: Option<u64>,
    pub free_volatile_memory: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationDataObject {
    #[serde(rename = "platformLabel")]
    pub platform_label: Option<String>,
    #[serde(rename = "discoveryBaseURL")]
    pub discovery_base_url: Option<String>,
}

/// One entry of `profile list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    #[serde(deserialize_with = "null_as_default")]
    pub iccid: String,
    pub isdp_aid: Option<String>,
    pub profile_state: Option<String>,
    pub profile_nickname: Option<String>,
    pub service_provider_name: Option<String>,
    pub profile_name: Option<String>,
    pub icon_type: Option<String>,
    pub icon: Option<String>,
    pub profile_class: Option<String>,
}

impl Profile {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.profile_state.as_deref() == Some("enabled")
    }

    /// Nickname if set, otherwise the operator-assigned profile name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.profile_nickname
            .as_deref()
            .filter(|nickname| !nickname.is_empty())
            .or(self.profile_name.as_deref())
            .unwrap_or_default()
    }
}

/// One entry of `notification list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Notification {
    #[serde(deserialize_with = "null_as_default")]
    pub seq_number: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub profile_management_operation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub notification_address: String,
    pub iccid: Option<String>,
}

/// One entry of `driver apdu list`. `env` is the value for `DRIVER_IFID`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApduDriver {
    #[serde(deserialize_with = "null_as_default")]
    pub env: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// Profile download parameters.
///
/// Fields left `None` or empty are not passed to the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullInfo {
    pub smdp: Option<String>,
    pub match_id: Option<String>,
    pub confirm_code: Option<String>,
    pub imei: Option<String>,
}

impl PullInfo {
    /// Parse an LPA activation code: `LPA:1$<smdp>$<matching id>[$<oid>[$<cc flag>]]`.
    ///
    /// Returns `None` when the prefix or the SM-DP+ address is missing. The
    /// confirmation code itself never appears in an activation code.
    #[must_use]
    pub fn from_activation_code(code: &str) -> Option<Self> {
        let rest = code.trim().strip_prefix("LPA:")?;
        let mut parts = rest.split('$');
        if parts.next()? != "1" {
            return None;
        }
        let smdp = parts.next().filter(|s| !s.is_empty())?;
        let match_id = parts.next().filter(|s| !s.is_empty());
        Some(Self {
            smdp: Some(smdp.to_string()),
            match_id: match_id.map(str::to_string),
            ..Self::default()
        })
    }

    /// `profile download` followed by `-s`, `-m`, `-c`, `-i` for each present field.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["profile".to_string(), "download".to_string()];
        let flags = [
            ("-s", &self.smdp),
            ("-m", &self.match_id),
            ("-c", &self.confirm_code),
            ("-i", &self.imei),
        ];
        for (flag, value) in flags {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                args.push(flag.to_string());
                args.push(value.to_string());
            }
        }
        args
    }
}
