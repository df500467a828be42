use crate::{
    camera::{CameraCatalog, CameraId},
    engine::{Engine, EngineFactory, EngineKind},
    error::{Error, Result},
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_STOP_TIMEOUT_SECS,
};
use log::{debug, error, info, warn};
use std::{
    fmt,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session name used in logs
    pub name: String,

    /// Engine to create when none is supplied
    pub engine_kind: EngineKind,

    /// Camera catalog handed to built-in engines
    pub catalog: CameraCatalog,

    /// Camera to select right after the engine starts
    pub initial_camera: Option<CameraId>,

    /// Status poll interval of the run loop (ms)
    pub poll_interval_ms: u64,

    /// Upper bound for a graceful stop (seconds)
    pub stop_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "RMCS".to_string(),
            engine_kind: EngineKind::Playback,
            catalog: CameraCatalog::default(),
            initial_camera: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT_SECS,
        }
    }
}

impl SessionConfig {
    /// Status poll interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Graceful stop bound
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }
}

/// Builder for starting an RMCS session
#[derive(Default)]
pub struct SessionBuilder {
    /// Session configuration
    config: SessionConfig,

    /// Engine overriding `config.engine_kind`
    engine: Option<Box<dyn Engine>>,
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("config", &self.config)
            .field("engine", &self.engine.as_ref().map(|e| e.name().to_string()))
            .finish()
    }
}

impl SessionBuilder {
    /// Create a new session builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the session name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Select a built-in engine
    pub fn engine_kind(mut self, kind: EngineKind) -> Self {
        self.config.engine_kind = kind;
        self
    }

    /// Use a caller-provided engine
    pub fn engine(mut self, engine: Box<dyn Engine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Set the camera catalog
    pub fn catalog(mut self, catalog: CameraCatalog) -> Self {
        self.config.catalog = catalog;
        self
    }

    /// Select a camera right after start
    pub fn initial_camera(mut self, camera: CameraId) -> Self {
        self.config.initial_camera = Some(camera);
        self
    }

    /// Set the status poll interval
    pub fn poll_interval(mut self, millis: u64) -> Self {
        self.config.poll_interval_ms = millis;
        self
    }

    /// Set the graceful stop bound
    pub fn stop_timeout(mut self, seconds: u64) -> Self {
        self.config.stop_timeout_secs = seconds;
        self
    }

    /// Start the engine and return the running session
    pub async fn init(self) -> Result<Session> {
        let engine = match self.engine {
            Some(engine) => engine,
            None => EngineFactory::create(self.config.engine_kind, self.config.catalog.clone()),
        };
        Session::init(self.config, engine).await
    }
}

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionStatus {
    /// No engine running
    NotRunning = 0,

    /// Engine started and accepting control requests
    Running = 1,
}

impl SessionStatus {
    /// Integer status reported through the C ABI
    pub fn code(self) -> i32 {
        self as i32
    }

    fn from_u8(raw: u8) -> Self {
        if raw == Self::Running as u8 {
            Self::Running
        } else {
            Self::NotRunning
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning => write!(f, "Not Running"),
            Self::Running => write!(f, "Running"),
        }
    }
}

/// Handle to a running RMCS session
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct Session {
    /// Session ID
    id: Uuid,

    /// Configuration the session was started with
    config: Arc<SessionConfig>,

    /// Session status
    status: Arc<AtomicU8>,

    /// Engine, taken on stop
    engine: Arc<Mutex<Option<Box<dyn Engine>>>>,

    /// Last camera the engine accepted
    active_camera: Arc<RwLock<Option<CameraId>>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("status", &self.status())
            .finish()
    }
}

impl Session {
    /// Create a new session builder
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Start `engine` and return the running session
    ///
    /// On failure no session exists and nothing needs stopping.
    pub async fn init(config: SessionConfig, mut engine: Box<dyn Engine>) -> Result<Self> {
        let id = Uuid::new_v4();
        info!(
            "Initializing session {} ({}) with {} engine",
            config.name,
            id,
            engine.name()
        );

        if let Err(e) = engine.start().await {
            error!("Failed to start {} engine: {}", engine.name(), e);
            return Err(match e {
                Error::Engine(_) => e,
                other => Error::Engine(other.to_string()),
            });
        }

        let session = Self {
            id,
            config: Arc::new(config),
            status: Arc::new(AtomicU8::new(SessionStatus::Running as u8)),
            engine: Arc::new(Mutex::new(Some(engine))),
            active_camera: Arc::new(RwLock::new(None)),
        };

        if let Some(camera) = session.config.initial_camera {
            if let Err(e) = session.switch_camera(camera).await {
                warn!("Initial camera {} not selected: {}", camera, e);
            }
        }

        info!("Session {} initialized", session.id);
        Ok(session)
    }

    /// Session ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Configuration the session was started with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current status; never blocks
    pub fn status(&self) -> SessionStatus {
        SessionStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Check if the session is running
    pub fn is_running(&self) -> bool {
        self.status() == SessionStatus::Running
    }

    /// Last camera the engine accepted
    pub async fn active_camera(&self) -> Option<CameraId> {
        *self.active_camera.read().await
    }

    /// Ask the engine to make `camera` the active video source
    pub async fn switch_camera(&self, camera: CameraId) -> Result<()> {
        if !self.is_running() {
            return Err(Error::NotRunning);
        }

        debug!("Session {} switching to camera {}", self.id, camera);

        let mut engine_guard = self.engine.lock().await;
        let engine = engine_guard.as_mut().ok_or(Error::NotRunning)?;
        engine.switch_camera(camera).await?;

        *self.active_camera.write().await = Some(camera);
        info!("Session {} switched to camera {}", self.id, camera);
        Ok(())
    }

    /// Tear the engine down
    ///
    /// Only the first call does any work; engine errors are logged.
    pub async fn stop(&self) {
        let was_running = self
            .status
            .compare_exchange(
                SessionStatus::Running as u8,
                SessionStatus::NotRunning as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if !was_running {
            debug!("Session {} already stopped", self.id);
            return;
        }

        info!("Stopping session {}", self.id);

        let engine = self.engine.lock().await.take();
        if let Some(mut engine) = engine {
            if let Err(e) = engine.stop().await {
                warn!("Error stopping {} engine: {}", engine.name(), e);
            }
        }

        *self.active_camera.write().await = None;
        info!("Session {} stopped", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::builtin::LoopbackEngine;

    #[test]
    fn test_status_codes() {
        assert_eq!(SessionStatus::Running.code(), 1);
        assert_eq!(SessionStatus::NotRunning.code(), 0);
        assert_eq!(SessionStatus::from_u8(7), SessionStatus::NotRunning);
        assert_eq!(SessionStatus::Running.to_string(), "Running");
    }

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.engine_kind, EngineKind::Playback);
        assert_eq!(config.poll_interval(), Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
        assert_eq!(config.stop_timeout(), Duration::from_secs(DEFAULT_STOP_TIMEOUT_SECS));
        assert!(config.initial_camera.is_none());
    }

    #[tokio::test]
    async fn test_stop_clears_active_camera() {
        let session = Session::builder()
            .engine(Box::new(LoopbackEngine::default()))
            .initial_camera(CameraId::new(3))
            .init()
            .await
            .unwrap();

        assert_eq!(session.active_camera().await, Some(CameraId::new(3)));
        session.stop().await;
        assert_eq!(session.active_camera().await, None);
    }
}
