use crate::error::{Error, Result};
use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};
use tracing::Level;

/// Where diagnostics go once logging is installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// Standard error
    Stderr,

    /// Appended to a file
    File(PathBuf),
}

static SINK: OnceLock<LogSink> = OnceLock::new();

/// Sink chosen by the first successful install
pub fn sink() -> Option<&'static LogSink> {
    SINK.get()
}

/// Route diagnostics to `path`
///
/// Must be called before a session is initialized. The sink can be chosen
/// once per process; later calls fail.
pub fn set_log_file(path: impl AsRef<Path>) -> Result<()> {
    install(Level::INFO, Some(path.as_ref()))
}

/// Install the global subscriber, writing to `log_file` or stderr
///
/// Records emitted through the `log` facade are captured as well.
pub fn install(level: Level, log_file: Option<&Path>) -> Result<()> {
    if let Some(existing) = SINK.get() {
        return Err(Error::Logging(format!(
            "logging already configured ({:?})",
            existing
        )));
    }

    let builder = tracing_subscriber::fmt().with_max_level(level);
    let (installed, sink) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| Error::LogFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            let installed = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
            (installed, LogSink::File(path.to_path_buf()))
        }
        None => (
            builder.with_writer(std::io::stderr).try_init(),
            LogSink::Stderr,
        ),
    };

    installed.map_err(|e| Error::Logging(e.to_string()))?;
    // A concurrent install would have failed in try_init above.
    let _ = SINK.set(sink);
    Ok(())
}

/// Install stderr logging unless a sink was already chosen
pub fn ensure_default(level: Level) {
    if SINK.get().is_none() {
        let _ = install(level, None);
    }
}
