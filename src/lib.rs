//! RMCS Session Controller
//!
//! This library provides the lifecycle and control surface of a Remote Media
//! Control Session (RMCS): start a session, poll its status, switch the active
//! camera and stop it again. The media and signaling work happens in an
//! [`Engine`]; two built-in engines are provided, and hosts can plug their own.
//!
//! C and C++ hosts use the same operations through the [`ffi`] module.

pub mod camera;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod logging;
pub mod runner;
pub mod session;
pub mod shutdown;

pub use camera::{CameraCatalog, CameraId};
pub use engine::{builtin, Engine, EngineFactory, EngineKind};
pub use error::{Error, Result};
pub use runner::{run, RunOutcome};
pub use session::{Session, SessionBuilder, SessionConfig, SessionStatus};
pub use shutdown::{spawn_signal_listener, Shutdown, ShutdownStage};

/// Default status poll interval of the run loop in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default upper bound for a graceful stop in seconds
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 5;

/// Default delay between scheduled camera switches in seconds
pub const DEFAULT_SWITCH_DELAY_SECS: u64 = 5;

/// A simple example of driving a session:
///
/// ```rust,no_run
/// use rmcs::{CameraId, EngineKind, Session, Shutdown};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Start the session
/// let session = Session::builder()
///     .engine_kind(EngineKind::Playback)
///     .init()
///     .await?;
///
/// println!("RMCS Status: {}", session.status());
///
/// // Switch to camera 2; failures carry a nonzero code
/// if let Err(e) = session.switch_camera(CameraId::new(2)).await {
///     eprintln!("Failed to switch camera. Error code: {}", e.code());
/// }
///
/// // Run until Ctrl+C, then stop
/// let shutdown = Shutdown::new();
/// rmcs::spawn_signal_listener(shutdown.clone());
/// rmcs::run(&session, &shutdown).await;
/// # Ok(())
/// # }
/// ```
#[doc(hidden)]
pub struct Examples;
