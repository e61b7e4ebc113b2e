//! Append-only transcript of every driver invocation
//!
//! The sink receives the command line before each invocation and the raw
//! stdout/stderr bytes while the child runs. It is shared between the invoker
//! and the runner's pump threads, so every write goes through one mutex.

use chrono::Local;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Cloneable handle to a serialized byte sink.
#[derive(Clone)]
pub struct LogSink {
    writer: SharedWriter,
    path: Option<PathBuf>,
}

impl LogSink {
    /// A sink that drops everything.
    #[must_use]
    pub fn discard() -> Self {
        Self::from_writer(io::sink())
    }

    /// Wrap an arbitrary writer.
    #[must_use]
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
            path: None,
        }
    }

    /// Create `dir` if needed and open a fresh timestamped log file inside it.
    ///
    /// Files are named `lpac-YYYYmmdd-HHMMSS.txt`; a second sink opened within
    /// the same second appends to the same file.
    pub fn open_in(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let name = format!("lpac-{}.txt", Local::now().format("%Y%m%d-%H%M%S"));
        let path = dir.join(name);
        let file: File = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: Arc::new(Mutex::new(Box::new(file))),
            path: Some(path),
        })
    }

    /// Path of the backing file, if the sink was opened with [`open_in`](Self::open_in).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append `line` followed by a newline.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.lock()?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")
    }

    /// Append raw bytes.
    pub fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        self.lock()?.write_all(bytes)
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock()?.flush()
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, Box<dyn Write + Send>>> {
        self.writer
            .lock()
            .map_err(|_| io::Error::other("log sink mutex poisoned"))
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink").field("path", &self.path).finish()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::discard()
    }
}
