//! Fake lpac driver shared by the integration tests
//!
//! The driver runs with a cleared environment, so the script only uses shell
//! builtins. Its behaviour is picked by `DRIVER_IFID`, which the CLI passes
//! through from `--interface`.

#![cfg(unix)]
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

pub(crate) const ICCID: &str = "8944476500001234567";

const SCRIPT: &str = r#"#!/bin/sh
progress='{"type":"progress","payload":{"code":0,"message":"es10c_get_profiles_info","data":null}}'

case "$DRIVER_IFID" in
smartcard)
    echo 'SCardListReaders() failed: 8010002E' >&2
    exit 1
    ;;
refused)
    printf '%s\n' "$progress"
    printf '%s\n' '{"type":"lpa","payload":{"code":-1,"message":"es10c_enable_profile","data":"{\"reason\":\"profile not in disabled state\"}"}}'
    exit 255
    ;;
silent)
    echo 'nothing to see here'
    exit 0
    ;;
hang)
    while :; do :; done
    ;;
esac

case "$1 $2" in
"profile list")
    printf '%s\n' "$progress"
    echo 'not json'
    printf '%s\n' '{"type":"lpa","payload":{"code":0,"message":"success","data":[{"iccid":"8944476500001234567","isdpAid":"A0000005591010FFFFFFFF8900001000","profileState":"enabled","profileNickname":"Travel","serviceProviderName":"Example Mobile","profileName":"Example Data","iconType":null,"icon":null,"profileClass":"operational"}]}}'
    ;;
"notification list")
    printf '%s\n' '{"type":"lpa","payload":{"code":0,"message":"success","data":[{"seqNumber":7,"profileManagementOperation":"install","notificationAddress":"rsp.example.com","iccid":"8944476500001234567"}]}}'
    ;;
"driver apdu")
    printf '%s\n' '{"type":"lpa","payload":{"code":0,"message":"success","data":[{"env":"0","name":"Example Reader 00 00"}]}}'
    ;;
"version ")
    printf '%s\n' "{\"type\":\"lpa\",\"payload\":{\"code\":0,\"message\":\"success\",\"data\":\"fake $LPAC_APDU $LPAC_HTTP ${LIBEUICC_DEBUG_HTTP:-0}\"}}"
    ;;
*)
    printf '%s\n' '{"type":"lpa","payload":{"code":0,"message":"success","data":null}}'
    ;;
esac
"#;

/// Directory holding an executable `lpac` script. Created once per test binary.
pub(crate) fn fake_lpac_dir() -> &'static Path {
    static DIR: OnceLock<TempDir> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = tempfile::Builder::new()
            .prefix("fake-lpac")
            .tempdir()
            .expect("create fake lpac dir");
        let script = dir.path().join("lpac");
        fs::write(&script, SCRIPT).expect("write fake lpac");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("make fake lpac executable");
        dir
    })
    .path()
}

/// Config path that does not exist, so discovery falls back to defaults
/// without looking at the user's real configuration.
pub(crate) fn no_config(scratch: &TempDir) -> PathBuf {
    scratch.path().join("absent.toml")
}
