//! Scripted runner shared by the unit tests of this crate.

use easylpac_runner::{CommandSpec, LogSink, ProcessOutput, ProcessRunner, RunnerError};
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::invoker::{DriverSettings, Lpac};
use crate::notifier::NoopNotifier;

/// What the scripted runner returns for one call.
pub enum Step {
    Output(ProcessOutput),
    Fail(RunnerError),
}

/// A successful run whose stdout carries one `lpa` result with `data`.
pub fn lpa_ok(data: &str) -> Step {
    let line = format!(r#"{{"type":"lpa","payload":{{"code":0,"message":"success","data":{data}}}}}"#);
    Step::Output(ProcessOutput::new(line.into_bytes(), Vec::new(), Some(0), false))
}

/// A run whose `lpa` result reports `code` from `function`.
pub fn lpa_err(code: i64, function: &str, data: &str) -> Step {
    let line = format!(
        r#"{{"type":"lpa","payload":{{"code":{code},"message":"{function}","data":{data}}}}}"#
    );
    Step::Output(ProcessOutput::new(line.into_bytes(), Vec::new(), Some(255), false))
}

pub fn raw(stdout: &str, stderr: &str, exit_code: i32) -> Step {
    Step::Output(ProcessOutput::new(
        stdout.as_bytes().to_vec(),
        stderr.as_bytes().to_vec(),
        Some(exit_code),
        false,
    ))
}

#[derive(Clone, Default)]
pub struct ScriptedRunner {
    steps: Arc<Mutex<VecDeque<Step>>>,
    calls: Arc<Mutex<Vec<CommandSpec>>>,
}

impl ScriptedRunner {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into_iter().collect())),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Argument vectors of every call, as plain strings.
    pub fn argv(&self) -> Vec<Vec<String>> {
        self.calls()
            .iter()
            .map(|cmd| cmd.args.iter().map(|a| a.to_string_lossy().into_owned()).collect())
            .collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, cmd: &CommandSpec, _timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        self.calls.lock().unwrap().push(cmd.clone());
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Output(output)) => Ok(output),
            Some(Step::Fail(err)) => Err(err),
            None => panic!("unexpected driver call: {}", cmd.display_line()),
        }
    }
}

pub fn settings() -> DriverSettings {
    DriverSettings::new(PathBuf::from("/opt/lpac"))
}

pub fn client(runner: &ScriptedRunner) -> Lpac {
    Lpac::with_runner(
        settings(),
        Box::new(runner.clone()),
        LogSink::discard(),
        Arc::new(NoopNotifier),
    )
}

pub fn os(s: &str) -> OsString {
    OsString::from(s)
}
