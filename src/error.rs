use crate::camera::CameraId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for RMCS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for RMCS
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    IO(#[from] io::Error),

    /// A session is already running
    #[error("Session already running")]
    AlreadyRunning,

    /// The operation needs a running session
    #[error("Session not running")]
    NotRunning,

    /// Engine failed to start, stop or serve a request
    #[error("Engine error: {0}")]
    Engine(String),

    /// Camera selector not present in the catalog
    #[error("Unknown camera: {0}")]
    UnknownCamera(CameraId),

    /// Camera source directory holds no clips
    #[error("No H.264 clips found in {}", .0.display())]
    NoClips(PathBuf),

    /// Text could not be parsed as a camera selector
    #[error("Invalid camera selector: {0:?}")]
    InvalidCamera(String),

    /// Log file could not be used as the log sink
    #[error("Log file error ({}): {reason}", .path.display())]
    LogFile { path: PathBuf, reason: String },

    /// Logging already configured or could not be installed
    #[error("Logging error: {0}")]
    Logging(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Integer result code reported through the C ABI.
    ///
    /// `0` is reserved for success, so every error maps to a nonzero value:
    /// `1` for a session that is already running, `-1` for caller-side
    /// problems (no session, bad input, logging/config) and `-2` for anything
    /// the engine rejected.
    pub fn code(&self) -> i32 {
        match self {
            Self::AlreadyRunning => 1,
            Self::NotRunning
            | Self::InvalidCamera(_)
            | Self::LogFile { .. }
            | Self::Logging(_)
            | Self::Config(_) => -1,
            Self::IO(_)
            | Self::Engine(_)
            | Self::UnknownCamera(_)
            | Self::NoClips(_) => -2,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
