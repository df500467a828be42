use crate::camera::{list_clips, CameraCatalog, CameraId};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Engine type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// In-memory engine without media
    Loopback,

    /// Engine serving pre-encoded clips per camera
    Playback,
}

impl EngineKind {
    /// Get the string representation of an engine type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loopback => "loopback",
            Self::Playback => "playback",
        }
    }
}

impl FromStr for EngineKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "loopback" => Ok(Self::Loopback),
            "playback" => Ok(Self::Playback),
            other => Err(Error::Config(format!("Unknown engine: {}", other))),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Media/control engine driven by a session
///
/// The session guarantees `start` is called once before any other method and
/// that `stop` is called at most once, after which the engine is dropped.
#[async_trait::async_trait]
pub trait Engine: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Start the engine
    async fn start(&mut self) -> Result<()>;

    /// Stop the engine
    async fn stop(&mut self) -> Result<()>;

    /// Make `camera` the active video source
    async fn switch_camera(&mut self, camera: CameraId) -> Result<()>;
}

/// Factory for creating engine instances
pub struct EngineFactory;

impl EngineFactory {
    /// Create a new engine instance
    pub fn create(kind: EngineKind, catalog: CameraCatalog) -> Box<dyn Engine> {
        match kind {
            EngineKind::Loopback => Box::new(builtin::LoopbackEngine::new(catalog)),
            EngineKind::Playback => Box::new(builtin::PlaybackEngine::new(catalog)),
        }
    }
}

/// Built-in engine implementations
pub mod builtin {
    use super::*;
    use log::{debug, error, info, warn};
    use std::path::PathBuf;

    /// Engine that only tracks the selected camera
    #[derive(Debug)]
    pub struct LoopbackEngine {
        catalog: CameraCatalog,
        running: bool,
        active: Option<CameraId>,
    }

    impl Default for LoopbackEngine {
        fn default() -> Self {
            Self::new(CameraCatalog::default())
        }
    }

    impl LoopbackEngine {
        /// Create a new loopback engine
        pub fn new(catalog: CameraCatalog) -> Self {
            Self {
                catalog,
                running: false,
                active: None,
            }
        }

        /// Currently selected camera
        pub fn active_camera(&self) -> Option<CameraId> {
            self.active
        }
    }

    #[async_trait::async_trait]
    impl Engine for LoopbackEngine {
        fn name(&self) -> &str {
            EngineKind::Loopback.as_str()
        }

        async fn start(&mut self) -> Result<()> {
            debug!("Starting loopback engine");
            self.running = true;
            self.active = Some(self.catalog.default_camera);
            Ok(())
        }

        async fn stop(&mut self) -> Result<()> {
            debug!("Stopping loopback engine");
            self.running = false;
            self.active = None;
            Ok(())
        }

        async fn switch_camera(&mut self, camera: CameraId) -> Result<()> {
            if !self.running {
                return Err(Error::NotRunning);
            }
            if !self.catalog.contains(camera) {
                return Err(Error::UnknownCamera(camera));
            }
            self.active = Some(camera);
            Ok(())
        }
    }

    /// Clips loaded for the active camera
    #[derive(Debug)]
    struct LoadedCamera {
        camera: CameraId,
        clips: Vec<PathBuf>,
    }

    /// Engine that serves the pre-encoded clips of the selected camera
    #[derive(Debug)]
    pub struct PlaybackEngine {
        catalog: CameraCatalog,
        running: bool,
        loaded: Option<LoadedCamera>,
    }

    impl Default for PlaybackEngine {
        fn default() -> Self {
            Self::new(CameraCatalog::default())
        }
    }

    impl PlaybackEngine {
        /// Create a new playback engine
        pub fn new(catalog: CameraCatalog) -> Self {
            Self {
                catalog,
                running: false,
                loaded: None,
            }
        }

        /// Camera whose clips are loaded
        pub fn active_camera(&self) -> Option<CameraId> {
            self.loaded.as_ref().map(|l| l.camera)
        }

        /// Clips of the active camera, in playback order
        pub fn clips(&self) -> &[PathBuf] {
            self.loaded
                .as_ref()
                .map(|l| l.clips.as_slice())
                .unwrap_or_default()
        }

        fn load(&mut self, camera: CameraId) -> Result<()> {
            let directory = self.catalog.source(camera)?;
            let clips = list_clips(directory)?;
            info!(
                "Loaded {} clips for camera {} from {}",
                clips.len(),
                camera,
                directory.display()
            );
            self.loaded = Some(LoadedCamera { camera, clips });
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl Engine for PlaybackEngine {
        fn name(&self) -> &str {
            EngineKind::Playback.as_str()
        }

        async fn start(&mut self) -> Result<()> {
            debug!("Starting playback engine");
            self.running = true;

            // A missing default source leaves the engine up without clips.
            let camera = self.catalog.default_camera;
            if let Err(e) = self.load(camera) {
                error!("Failed to load default camera {}: {}", camera, e);
            }
            Ok(())
        }

        async fn stop(&mut self) -> Result<()> {
            debug!("Stopping playback engine");
            self.running = false;
            self.loaded = None;
            Ok(())
        }

        async fn switch_camera(&mut self, camera: CameraId) -> Result<()> {
            if !self.running {
                return Err(Error::NotRunning);
            }

            info!("Switching to camera {}", camera);
            self.load(camera).inspect_err(|e| {
                warn!("Failed to switch to camera {}: {}", camera, e);
            })
        }
    }
}
