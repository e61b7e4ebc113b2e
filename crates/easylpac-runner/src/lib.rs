//! Process execution for the lpac driver
//!
//! Everything that launches an external program goes through [`CommandSpec`], so
//! arguments always cross the process boundary as discrete argv elements and are
//! never evaluated by a shell.
//!
//! [`NativeRunner`] spawns the program, copies stdout and stderr into memory while
//! teeing both streams into a [`LogSink`], and kills the child if it outlives the
//! caller's timeout.

mod command_spec;
mod error;
mod log_sink;
mod native;
mod process;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use log_sink::LogSink;
pub use native::NativeRunner;
pub use process::{ProcessOutput, ProcessRunner};
