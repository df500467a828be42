//! C ABI for hosts written in C or C++.
//!
//! The functions mirror the session operations and report plain integers:
//! `0` for success and [`Error::code`] otherwise. One session may be active
//! per process; its handle lives in a process-wide slot owned by this module.
//! See `include/librmcs.h` for the matching declarations.

#![allow(non_snake_case)]

use crate::{
    error::{Error, Result},
    logging,
    session::{Session, SessionBuilder, SessionStatus},
    CameraId,
};
use log::{error, info, warn};
use std::{
    ffi::{c_char, c_int, CStr},
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};
use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceLock<std::result::Result<Runtime, String>> = OnceLock::new();
static INSTANCE: SessionSlot = SessionSlot::new();

fn runtime() -> Result<&'static Runtime> {
    RUNTIME
        .get_or_init(|| {
            Builder::new_multi_thread()
                .enable_all()
                .thread_name("rmcs-engine")
                .build()
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| Error::Config(format!("Failed to build runtime: {}", e)))
}

/// Mutex-guarded home of the one session a C host may hold
///
/// Every operation keeps the lock until it is done, so an init never
/// overlaps a stop that is still tearing the previous session down.
struct SessionSlot(Mutex<Option<Session>>);

impl SessionSlot {
    const fn new() -> Self {
        Self(Mutex::new(None))
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn init(&self, builder: SessionBuilder) -> c_int {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(Session::is_running) {
            warn!("RMCS already initialized");
            return Error::AlreadyRunning.code();
        }

        logging::ensure_default(tracing::Level::INFO);
        info!("Initializing RMCS...");

        let result = runtime().and_then(|rt| rt.block_on(builder.init()));
        match result {
            Ok(session) => {
                *slot = Some(session);
                info!("RMCS initialized successfully");
                0
            }
            Err(e) => {
                error!("Failed to initialize RMCS: {}", e);
                e.code()
            }
        }
    }

    fn status(&self) -> c_int {
        self.lock()
            .as_ref()
            .map_or(SessionStatus::NotRunning, Session::status)
            .code()
    }

    fn switch_camera(&self, camera: CameraId) -> c_int {
        let slot = self.lock();
        let Some(session) = slot.as_ref().filter(|s| s.is_running()) else {
            warn!("RMCS not initialized");
            return Error::NotRunning.code();
        };

        info!("Switching to camera {} from host", camera);

        let result = runtime().and_then(|rt| rt.block_on(session.switch_camera(camera)));
        match result {
            Ok(()) => 0,
            Err(e) => {
                error!("Failed to switch camera: {}", e);
                e.code()
            }
        }
    }

    fn stop(&self) -> c_int {
        let mut slot = self.lock();
        let Some(session) = slot.take() else {
            return 0;
        };

        info!("Stopping RMCS...");
        match runtime() {
            Ok(rt) => rt.block_on(session.stop()),
            Err(e) => error!("Cannot stop RMCS cleanly: {}", e),
        }
        info!("RMCS stopped");
        drop(slot);
        0
    }
}

/// Route diagnostics to a file. Call before `RMCSInit`.
///
/// Returns `0` on success and `-1` when the path is null, not UTF-8, cannot be
/// opened for appending, or logging was already configured.
///
/// # Safety
///
/// `filename` must be null or point to a NUL-terminated string that stays
/// valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn RMCSSetLogFile(filename: *const c_char) -> c_int {
    if filename.is_null() {
        return -1;
    }

    // SAFETY: non-null and NUL-terminated per the contract above.
    let filename = unsafe { CStr::from_ptr(filename) };
    let Ok(path) = filename.to_str() else {
        return -1;
    };

    match logging::set_log_file(path) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("RMCS: {}", e);
            e.code()
        }
    }
}

/// Start the session with the default configuration.
///
/// Returns `0` on success, `1` when a session is already running, `-1` when
/// the runtime cannot be created and `-2` when the engine fails to start.
/// Waits for an `RMCSStop` in progress on another thread to finish first.
#[no_mangle]
pub extern "C" fn RMCSInit() -> c_int {
    INSTANCE.init(Session::builder())
}

/// Report `1` while a session is running and `0` otherwise.
#[no_mangle]
pub extern "C" fn RMCSGetStatus() -> c_int {
    INSTANCE.status()
}

/// Switch the active camera.
///
/// Returns `0` on success, `-1` without a running session and `-2` when the
/// engine rejects the camera.
#[no_mangle]
pub extern "C" fn RMCSSwitchCamera(camera_number: c_int) -> c_int {
    INSTANCE.switch_camera(CameraId::new(camera_number))
}

/// Stop the session. Always returns `0`; without a session this is a no-op.
#[no_mangle]
pub extern "C" fn RMCSStop() -> c_int {
    INSTANCE.stop()
}
